//! Authorization gate: composable per-route guards.

pub mod guard;
pub mod pipeline;

pub use guard::{Guard, RequireAuthenticated, RequireRole, RequireTier};
pub use pipeline::GuardPipeline;
