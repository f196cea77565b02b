//! # livefeed-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** to read the tail of a feed and append to it
//!   (`/api/feeds/{feed}/records`)
//! - Serve typed projections for the chat room and the coinflip scoreboard
//! - Serve one **SSE live view** per connection: each connection owns a
//!   `LiveFeedSync` and streams its arrivals; disconnecting tears it down
//! - Map application errors into HTTP responses
//!
//! ## Identity
//! The writer identity (wallet public key or session id) travels in the
//! `x-author-id` header. A request without it cannot append.
//!
//! ## Dependency rule
//! Depends on `livefeed-app` (for port traits and services) and `livefeed-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
