//! Actor identity and role as resolved by the identity collaborator.

use super::{ParseUserRoleError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role attached to an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full administrative access.
    Admin,
    /// Manages projects and reviews work.
    Manager,
    /// Regular team member.
    User,
}

impl UserRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::User => "user",
        }
    }

    /// Returns `true` for roles allowed to complete, create, edit, and
    /// delete tasks.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UserRole {
    type Error = ParseUserRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "user" => Ok(Self::User),
            _ => Err(ParseUserRoleError(value.to_owned())),
        }
    }
}

/// The authenticated identity performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    user_id: UserId,
    role: UserRole,
}

impl Actor {
    /// Creates an actor from a resolved user identifier and role.
    #[must_use]
    pub const fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Returns the acting user's identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the acting user's role.
    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.role
    }

    /// Returns `true` when the actor holds a manager or admin role.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}
