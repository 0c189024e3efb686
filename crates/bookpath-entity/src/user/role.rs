//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available to route guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular reader account.
    User,
    /// Household administrator ("chefe da casa"); manages other accounts.
    Chefaodacasa,
}

impl UserRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Chefaodacasa => "chefaodacasa",
        }
    }

    /// Check if this role administers other accounts.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Chefaodacasa)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = bookpath_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "chefaodacasa" => Ok(Self::Chefaodacasa),
            _ => Err(bookpath_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: user, chefaodacasa"
            ))),
        }
    }
}
