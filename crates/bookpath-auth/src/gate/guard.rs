//! Individual access guards.

use std::collections::HashSet;
use std::fmt;

use bookpath_core::error::AppError;
use bookpath_core::result::AppResult;
use bookpath_entity::user::{SubscriptionTier, UserRole};

use crate::context::AuthContext;

/// A single access decision over the (possibly absent) request principal.
pub trait Guard: Send + Sync + fmt::Debug {
    /// Allows the request or returns the reason it is refused.
    fn check(&self, ctx: Option<&AuthContext>) -> AppResult<()>;
}

fn require(ctx: Option<&AuthContext>) -> AppResult<&AuthContext> {
    ctx.ok_or_else(|| AppError::unauthenticated("Authentication required"))
}

/// Refuses requests without a validated principal.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireAuthenticated;

impl Guard for RequireAuthenticated {
    fn check(&self, ctx: Option<&AuthContext>) -> AppResult<()> {
        require(ctx).map(|_| ())
    }
}

/// Admits only the listed roles.
#[derive(Debug, Clone)]
pub struct RequireRole {
    allowed: HashSet<UserRole>,
}

impl RequireRole {
    /// Admit any of `roles`.
    pub fn new(roles: impl IntoIterator<Item = UserRole>) -> Self {
        Self {
            allowed: roles.into_iter().collect(),
        }
    }
}

impl Guard for RequireRole {
    fn check(&self, ctx: Option<&AuthContext>) -> AppResult<()> {
        let role = require(ctx)?.role();
        if self.allowed.contains(&role) {
            return Ok(());
        }
        Err(AppError::insufficient_role(format!(
            "Role '{role}' may not perform this operation"
        )))
    }
}

/// Admits only the listed subscription tiers.
#[derive(Debug, Clone)]
pub struct RequireTier {
    allowed: HashSet<SubscriptionTier>,
}

impl RequireTier {
    /// Admit any of `tiers`.
    pub fn new(tiers: impl IntoIterator<Item = SubscriptionTier>) -> Self {
        Self {
            allowed: tiers.into_iter().collect(),
        }
    }
}

impl Guard for RequireTier {
    fn check(&self, ctx: Option<&AuthContext>) -> AppResult<()> {
        let tier = require(ctx)?.tier();
        if self.allowed.contains(&tier) {
            return Ok(());
        }
        let mut names: Vec<&str> = self.allowed.iter().map(SubscriptionTier::as_str).collect();
        names.sort_unstable();
        Err(AppError::subscription_required(format!(
            "This feature requires a {} subscription",
            names.join(" or ")
        )))
    }
}
