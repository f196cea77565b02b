//! Identity providers that need no IO.

use livefeed_domain::author::AuthorId;

use crate::ports::IdentityProvider;

/// A fixed identity: a connected wallet, a request header, or nobody.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<AuthorId>);

impl StaticIdentity {
    #[must_use]
    pub fn connected(author: AuthorId) -> Self {
        Self(Some(author))
    }

    /// No identity: every append fails with `NotAuthorized`.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl From<Option<AuthorId>> for StaticIdentity {
    fn from(value: Option<AuthorId>) -> Self {
        Self(value)
    }
}

impl IdentityProvider for StaticIdentity {
    fn current(&self) -> Option<AuthorId> {
        self.0.clone()
    }
}

/// A random `user_…` identity generated once per session.
#[derive(Debug, Clone)]
pub struct SessionIdentity(AuthorId);

impl Default for SessionIdentity {
    fn default() -> Self {
        Self(AuthorId::session())
    }
}

impl SessionIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityProvider for SessionIdentity {
    fn current(&self) -> Option<AuthorId> {
        Some(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_yield_nothing_when_anonymous() {
        assert!(StaticIdentity::anonymous().current().is_none());
    }

    #[test]
    fn should_yield_connected_wallet() {
        let author = AuthorId::new("wallet123").unwrap();
        assert_eq!(StaticIdentity::connected(author.clone()).current(), Some(author));
    }

    #[test]
    fn should_keep_same_session_id_across_calls() {
        let session = SessionIdentity::new();
        assert_eq!(session.current(), session.current());
        assert!(session.current().unwrap().as_str().starts_with("user_"));
    }
}
