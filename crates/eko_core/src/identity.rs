//! Identity provider seam.
//!
//! Authentication happens outside this crate. Callers hand in whatever
//! resolves the signed-in user's profile id.

/// Resolves the signed-in user, if any.
pub trait IdentityProvider {
    fn current_user_id(&self) -> Option<String>;
}

/// Identity fixed at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity {
    user_id: Option<String>,
}

impl StaticIdentity {
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

impl<I: IdentityProvider + ?Sized> IdentityProvider for &I {
    fn current_user_id(&self) -> Option<String> {
        (**self).current_user_id()
    }
}

#[cfg(test)]
mod tests {
    use super::{IdentityProvider, StaticIdentity};

    #[test]
    fn blank_user_id_counts_as_anonymous() {
        assert_eq!(StaticIdentity::signed_in("  ").current_user_id(), None);
        assert_eq!(StaticIdentity::anonymous().current_user_id(), None);
        assert_eq!(
            StaticIdentity::signed_in("user-1").current_user_id().as_deref(),
            Some("user-1")
        );
    }
}
