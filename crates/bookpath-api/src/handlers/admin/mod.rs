//! Household administrator handlers.

pub mod users;
