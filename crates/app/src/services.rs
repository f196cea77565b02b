//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod live_feed;

pub use live_feed::{LiveFeedSync, SubscriptionHandle};
