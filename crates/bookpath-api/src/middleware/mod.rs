//! Axum middleware stack.

pub mod cors;
pub mod gate;
