//! Registration and password changes.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use bookpath_core::error::AppError;
use bookpath_core::events::{self, DomainEvent, UserEvent};
use bookpath_core::result::AppResult;
use bookpath_entity::user::{CreateUser, SubscriptionTier, User, UserRole};

use super::AuthService;
use crate::context::AuthContext;
use crate::password::{AuthEffect, plan_password_change};

/// Input for [`AuthService::register`].
#[derive(Debug, Clone)]
pub struct RegisterUser {
    /// Email address.
    pub email: String,
    /// Desired username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Role to assign. Self-registration always passes `User`.
    pub role: UserRole,
    /// Tier to assign.
    pub subscription_tier: SubscriptionTier,
}

impl AuthService {
    /// Creates a principal after checking the password policy.
    pub async fn register(&self, input: RegisterUser) -> AppResult<User> {
        self.policy
            .validate_complexity(&input.password, &[&input.email, &input.username])?;

        let password_hash = Arc::clone(&self.hasher)
            .hash_blocking(input.password)
            .await?;

        let user = self
            .store
            .create(&CreateUser {
                email: input.email,
                username: input.username,
                password_hash,
                role: input.role,
                subscription_tier: input.subscription_tier,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        events::record(&DomainEvent::new(
            Some(user.id),
            UserEvent::Registered {
                user_id: user.id,
                username: user.username.clone(),
            },
        ));
        Ok(user)
    }

    /// Replaces the caller's password.
    ///
    /// Requires the current password. The new one must pass the complexity
    /// policy and must not match the current or any retained previous
    /// password. On success every previously issued token becomes stale.
    pub async fn change_password(
        &self,
        ctx: &AuthContext,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<User> {
        let user = &ctx.user;

        let current_ok = Arc::clone(&self.hasher)
            .verify_blocking(current_password.to_string(), user.password_hash.clone())
            .await?;
        if !current_ok {
            return Err(AppError::invalid_credentials());
        }

        self.policy
            .validate_complexity(new_password, &[&user.email, &user.username])?;

        let (hasher, policy, snapshot, candidate) = (
            Arc::clone(&self.hasher),
            self.policy.clone(),
            user.clone(),
            new_password.to_string(),
        );
        let new_hash = tokio::task::spawn_blocking(move || {
            policy.ensure_not_reused(&hasher, &candidate, &snapshot)?;
            hasher.hash_password(&candidate)
        })
        .await
        .map_err(|e| AppError::internal(format!("Password task failed: {e}")))??;

        let plan = plan_password_change(user, new_hash, Utc::now(), self.policy.history_depth());
        let mut updated = plan.user;
        for effect in plan.effects {
            match effect {
                AuthEffect::CredentialWrite(update) => {
                    updated = self.store.update_credentials(&update).await?;
                }
                AuthEffect::Audit(event) => {
                    events::record(&DomainEvent::new(Some(user.id), event));
                }
            }
        }

        info!(
            user_id = %updated.id,
            token_version = updated.token_version,
            "Password changed"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use bookpath_core::error::ErrorKind;
    use bookpath_database::CredentialStore;
    use bookpath_entity::user::{SubscriptionTier, UserRole};

    use super::RegisterUser;
    use crate::testing::Harness;

    const EMAIL: &str = "reader@bookpath.test";
    const PASSWORD: &str = "Reading-List-42";

    fn nth_password(n: usize) -> String {
        format!("Reading-List-{n:02}!")
    }

    #[tokio::test]
    async fn test_register_enforces_policy() {
        let h = Harness::new().await;
        let err = h
            .service
            .register(RegisterUser {
                email: EMAIL.to_string(),
                username: "reader".to_string(),
                password: "weak".to_string(),
                role: UserRole::User,
                subscription_tier: SubscriptionTier::Free,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PolicyViolation);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let h = Harness::new().await;
        h.create_user(EMAIL, PASSWORD).await;
        let err = h
            .service
            .register(RegisterUser {
                email: EMAIL.to_uppercase(),
                username: "someone-else".to_string(),
                password: PASSWORD.to_string(),
                role: UserRole::User,
                subscription_tier: SubscriptionTier::Free,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_change_password_makes_old_tokens_stale() {
        let h = Harness::new().await;
        let mut user = h.create_user(EMAIL, PASSWORD).await;
        user.token_version = 3;
        h.store.put(user.clone()).await;

        let token_a = h.service.login(EMAIL, PASSWORD).await.unwrap().tokens;
        let ctx = h
            .service
            .authenticate_request(&token_a.access_token)
            .await
            .unwrap();
        assert_eq!(ctx.claims.ver, 3);

        let updated = h
            .service
            .change_password(&ctx, PASSWORD, &nth_password(1))
            .await
            .unwrap();
        assert_eq!(updated.token_version, 4);

        let err = h
            .service
            .authenticate_request(&token_a.access_token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenStale);

        let token_b = h.service.login(EMAIL, &nth_password(1)).await.unwrap().tokens;
        let ctx_b = h
            .service
            .authenticate_request(&token_b.access_token)
            .await
            .unwrap();
        assert_eq!(ctx_b.claims.ver, 4);
    }

    #[tokio::test]
    async fn test_wrong_current_password() {
        let h = Harness::new().await;
        h.create_user(EMAIL, PASSWORD).await;
        let tokens = h.service.login(EMAIL, PASSWORD).await.unwrap().tokens;
        let ctx = h
            .service
            .authenticate_request(&tokens.access_token)
            .await
            .unwrap();

        let err = h
            .service
            .change_password(&ctx, "Not-My-Password-1", &nth_password(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_reuse_window_is_five_previous_passwords() {
        let h = Harness::new().await;
        let user = h.create_user(EMAIL, &nth_password(0)).await;

        // Passwords 1..=5 retire 0..=4 into history.
        for n in 1..=5 {
            let ctx = h.context_for(user.id).await;
            h.service
                .change_password(&ctx, &nth_password(n - 1), &nth_password(n))
                .await
                .unwrap();
        }

        let ctx = h.context_for(user.id).await;
        for reused in 0..=5 {
            let err = h
                .service
                .change_password(&ctx, &nth_password(5), &nth_password(reused))
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::PolicyViolation, "password {reused}");
        }

        // One more change evicts password 0, which becomes acceptable again.
        h.service
            .change_password(&ctx, &nth_password(5), &nth_password(6))
            .await
            .unwrap();
        let ctx = h.context_for(user.id).await;
        h.service
            .change_password(&ctx, &nth_password(6), &nth_password(0))
            .await
            .unwrap();

        let stored = h.store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.token_version, 7);
        assert_eq!(stored.password_history.len(), 5);
    }

    #[tokio::test]
    async fn test_concurrent_change_conflicts() {
        let h = Harness::new().await;
        let user = h.create_user(EMAIL, PASSWORD).await;
        let stale_ctx = h.context_for(user.id).await;

        h.store.bump_token_version(user.id).await.unwrap();

        let err = h
            .service
            .change_password(&stale_ctx, PASSWORD, &nth_password(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
