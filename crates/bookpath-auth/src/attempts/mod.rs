//! Failed-login counting and temporary account lockout.

pub mod governor;

pub use governor::{FailureOutcome, LockState, LoginAttemptGovernor};
