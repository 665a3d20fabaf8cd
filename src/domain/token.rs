use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cache-resident companion to a signed access token (spec §3, §4.5).
/// Single-token-per-user: keyed by `(tenant_id, user_id)`, overwritten on
/// every new issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenMetadata {
    pub jti: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by: Option<Uuid>,
}

impl AccessTokenMetadata {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }
}

/// Refresh-token record. Only the SHA-256 hash of the opaque token is stored;
/// the token itself is never persisted (spec §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_by: Option<Uuid>,
}

impl RefreshTokenRecord {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }

    /// Reuse-detection heuristic (spec §4.5, §9): a second successful use
    /// inside this window is treated as token theft.
    pub fn used_within(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        now.signed_duration_since(self.last_used_at) < window
    }
}
