//! Identity port — who is writing.

use std::sync::Arc;

use livefeed_domain::author::AuthorId;

/// Yields the identity of the caller, or `None` when nobody is signed in
/// (e.g. no wallet connected).
pub trait IdentityProvider {
    fn current(&self) -> Option<AuthorId>;
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for &T {
    fn current(&self) -> Option<AuthorId> {
        (**self).current()
    }
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for Arc<T> {
    fn current(&self) -> Option<AuthorId> {
        (**self).current()
    }
}
