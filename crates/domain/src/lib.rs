//! # livefeed-domain
//!
//! Pure domain model for bounded live feeds.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Feed paths** (named, append-only ordered collections)
//! - Define **Records** (timestamped, attributed payloads appended to a feed)
//! - Define the **Mirror** (bounded local copy of a feed's tail)
//! - Define typed **feed views** (chat messages, coinflip results)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod author;
pub mod feed;
pub mod mirror;
pub mod path;
pub mod payload;
pub mod record;
