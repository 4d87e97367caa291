//! SessionContext: holder of the current user once onboarding finishes.
//!
//! Post-onboarding views receive a handle to this explicitly; there is no
//! global. It starts out holding the empty profile.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::ChannelError;

use super::model::UserProfile;

/// Receives the finalized profile when onboarding completes.
#[async_trait]
pub trait IdentityHolder: Send + Sync {
    async fn publish_profile(&self, profile: UserProfile) -> Result<(), ChannelError>;
}

/// Shared handle to the current user profile.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    user: Arc<RwLock<UserProfile>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current profile (empty until onboarding completes).
    pub async fn current(&self) -> UserProfile {
        self.user.read().await.clone()
    }

    /// Whether a finalized profile has been published.
    pub async fn is_onboarded(&self) -> bool {
        self.user.read().await.is_complete()
    }
}

#[async_trait]
impl IdentityHolder for SessionContext {
    async fn publish_profile(&self, profile: UserProfile) -> Result<(), ChannelError> {
        if !profile.is_complete() {
            return Err(ChannelError::PublishFailed(
                "profile has no completion time".into(),
            ));
        }
        info!(email = %profile.email, full_name = %profile.full_name, "Current user set");
        *self.user.write().await = profile;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[tokio::test]
    async fn starts_with_empty_profile() {
        let ctx = SessionContext::new();
        assert_eq!(ctx.current().await, UserProfile::default());
        assert!(!ctx.is_onboarded().await);
    }

    #[tokio::test]
    async fn publish_replaces_profile_for_all_handles() {
        let ctx = SessionContext::new();
        let view = ctx.clone();
        let profile = UserProfile {
            email: "jane@example.com".into(),
            full_name: "Jane Doe".into(),
            image_ref: "blob:onboarding/x".into(),
            completed_at: Some(Utc::now()),
        };

        ctx.publish_profile(profile.clone()).await.unwrap();

        assert_eq!(view.current().await, profile);
        assert!(view.is_onboarded().await);
    }

    #[tokio::test]
    async fn unfinished_profile_is_refused() {
        let ctx = SessionContext::new();
        let err = ctx.publish_profile(UserProfile::default()).await.unwrap_err();
        assert!(matches!(err, ChannelError::PublishFailed(_)));
        assert!(!ctx.is_onboarded().await);
    }
}
