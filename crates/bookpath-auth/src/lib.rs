//! # bookpath-auth
//!
//! Authentication and session-validity core for BookPath.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing, complexity policy, reuse detection, change planning
//! - `attempts`: failed-login counting and temporary lockout
//! - `jwt`: token issuance, verification, and revocation
//! - `gate`: role and subscription-tier guards
//! - `service`: [`AuthService`], the entry point used by the HTTP layer and CLI

pub mod attempts;
pub mod context;
pub mod gate;
pub mod jwt;
pub mod password;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use attempts::{LockState, LoginAttemptGovernor};
pub use context::AuthContext;
pub use gate::{Guard, GuardPipeline, RequireAuthenticated, RequireRole, RequireTier};
pub use jwt::{Claims, JwtDecoder, JwtEncoder, RevocationList, TokenPair, TokenType, TokenValidator};
pub use password::{PasswordHasher, PasswordValidator};
pub use service::AuthService;
