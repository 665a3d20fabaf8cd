use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    System,
    Custom,
}

impl RoleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::System => "system",
            RoleType::Custom => "custom",
        }
    }
}

impl std::str::FromStr for RoleType {
    type Err = crate::error::AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(RoleType::System),
            "custom" => Ok(RoleType::Custom),
            _ => Err(crate::error::AuthError::invalid_value("type")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub r#type: RoleType,
    pub permissions: Vec<String>,
    pub status: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn is_system_role(&self) -> bool {
        matches!(self.r#type, RoleType::System)
    }
}

pub const ROLE_IMMUTABLE_FIELDS: &[&str] = &["created_at", "tenant_id"];
