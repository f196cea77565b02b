//! # livefeed-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `LogStore` — append to a feed, query its tail, listen for arrivals
//!   - `IdentityProvider` — yield the caller's author id, if any
//! - Define the **driving/inbound** use-case:
//!   - `LiveFeedSync` — keep a bounded mirror of one feed current and forward writes
//! - Provide **in-process infrastructure** (arrival hub, identity providers)
//!   that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `livefeed-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod arrival_hub;
pub mod identity;
pub mod ports;
pub mod services;
