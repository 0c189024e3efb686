//! Ordered guard chains.

use std::sync::Arc;

use bookpath_core::result::AppResult;
use bookpath_entity::user::{SubscriptionTier, UserRole};

use super::guard::{Guard, RequireAuthenticated, RequireRole, RequireTier};
use crate::context::AuthContext;

/// An ordered list of guards that stops at the first refusal.
///
/// [`GuardPipeline::authenticated`] always places [`RequireAuthenticated`]
/// first, so an anonymous request is refused as unauthenticated before any
/// role or tier guard can run.
#[derive(Debug, Clone, Default)]
pub struct GuardPipeline {
    guards: Vec<Arc<dyn Guard>>,
}

impl GuardPipeline {
    /// A pipeline that admits everyone.
    pub fn public() -> Self {
        Self::default()
    }

    /// A pipeline that starts by requiring authentication.
    pub fn authenticated() -> Self {
        Self::public().with(RequireAuthenticated)
    }

    /// Appends a guard.
    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    /// Appends a role guard.
    pub fn require_role(self, roles: impl IntoIterator<Item = UserRole>) -> Self {
        self.with(RequireRole::new(roles))
    }

    /// Appends a tier guard.
    pub fn require_tier(self, tiers: impl IntoIterator<Item = SubscriptionTier>) -> Self {
        self.with(RequireTier::new(tiers))
    }

    /// Whether any guard is configured.
    pub fn is_public(&self) -> bool {
        self.guards.is_empty()
    }

    /// Runs every guard in order.
    pub fn check(&self, ctx: Option<&AuthContext>) -> AppResult<()> {
        self.guards.iter().try_for_each(|guard| guard.check(ctx))
    }
}
