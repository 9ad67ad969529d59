//! Caller identity model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a user account (clients and restaurant owners alike).
pub type UserId = i64;

/// Role carried by the verified identity claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Cliente,
    Restaurante,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Cliente, Role::Restaurante, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Cliente => "CLIENTE",
            Role::Restaurante => "RESTAURANTE",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Accepts the bare role name or the legacy `ROLE_` prefixed form,
    /// ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = match trimmed.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("ROLE_") => &trimmed[5..],
            _ => trimmed,
        };

        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("Unknown role: {}", s))
    }
}

/// Verified identity of the caller for a single request.
///
/// Built once at the transport boundary and passed explicitly into every
/// core operation. There is no setter; a new request gets a new context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    subject_id: UserId,
    email: String,
    role: Role,
}

impl IdentityContext {
    pub fn new(subject_id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            subject_id,
            email: email.into(),
            role,
        }
    }

    pub fn subject_id(&self) -> UserId {
        self.subject_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
