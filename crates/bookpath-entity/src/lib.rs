//! # bookpath-entity
//!
//! Domain entity models for BookPath. Database entities derive
//! `sqlx::FromRow`; secrets are excluded from serialization so that no
//! response can carry them.

pub mod user;
