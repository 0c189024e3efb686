//! Password hashing, policy enforcement, and change planning.

pub mod change;
pub mod hasher;
pub mod validator;

pub use change::{AuthEffect, PasswordChange, plan_password_change};
pub use hasher::PasswordHasher;
pub use validator::PasswordValidator;
