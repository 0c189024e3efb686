//! The authenticated principal attached to a request.

use uuid::Uuid;

use bookpath_entity::user::{SubscriptionTier, User, UserRole};

use crate::jwt::Claims;

/// A validated token together with the principal record it was checked against.
///
/// Guards read role and tier from `user`, the freshly loaded record, rather
/// than from the token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The principal as loaded during validation.
    pub user: User,
    /// Claims of the presented token.
    pub claims: Claims,
}

impl AuthContext {
    /// The authenticated principal's id.
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Current role.
    pub fn role(&self) -> UserRole {
        self.user.role
    }

    /// Current subscription tier.
    pub fn tier(&self) -> SubscriptionTier {
        self.user.subscription_tier
    }
}
