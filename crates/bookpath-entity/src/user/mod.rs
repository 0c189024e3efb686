//! Principal (user credential record) entities.

pub mod history;
pub mod model;
pub mod role;
pub mod tier;

pub use history::{PasswordHistory, PasswordHistoryEntry};
pub use model::{CreateUser, CredentialUpdate, User};
pub use role::UserRole;
pub use tier::SubscriptionTier;
