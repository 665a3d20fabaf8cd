use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Suspended,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Suspended => "suspended",
            UserStatus::Inactive => "inactive",
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = crate::error::AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "suspended" => Ok(UserStatus::Suspended),
            "inactive" => Ok(UserStatus::Inactive),
            _ => Err(crate::error::AuthError::invalid_value("status")),
        }
    }
}

/// A role grant with its own timestamp, distinct from a bare role-id list so
/// PermissionResolver's aggregation join can answer "when" as well as "which".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleAssignment {
    pub role_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: UserStatus,
    pub roles: Vec<UserRoleAssignment>,
    pub additional_permissions: HashSet<String>,
    pub revoked_permissions: HashSet<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role_ids(&self) -> Vec<Uuid> {
        self.roles.iter().map(|r| r.role_id).collect()
    }

    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let identifier = identifier.to_lowercase();
        self.email == identifier || self.username == identifier
    }
}

/// Fields a caller may never change on `Update` (spec §3, I-username immutability).
pub const USER_IMMUTABLE_FIELDS: &[&str] = &["username", "created_at", "tenant_id"];
