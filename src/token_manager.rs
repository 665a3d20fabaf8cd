//! TokenManager (spec §4.5): signed access-token issuance/validation, opaque
//! refresh-token minting with reuse detection, rotation, and revocation.
//!
//! `Claims` mirrors the teacher's `auth::Claims` shape; `generate_jwt`-style
//! issuance goes through `jsonwebtoken::encode` exactly as teacher does.

use crate::cache::{cache_key, TokenCache, ACCESS_PREFIX, REFRESH_PREFIX};
use crate::domain::{AccessTokenMetadata, RefreshTokenRecord};
use crate::error::AuthError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub tenant_id: Uuid,
    pub jti: Uuid,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub iss: String,
}

#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: chrono::DateTime<Utc>,
    pub refresh_expires_at: chrono::DateTime<Utc>,
}

pub enum RevokeScope {
    Access,
    Refresh,
    Both,
}

pub struct TokenManager {
    cache: Arc<dyn TokenCache>,
    jwt_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    reuse_window: Duration,
    issuer: String,
}

const JWT_ISSUER: &str = "erp-auth-core";

impl TokenManager {
    pub fn new(
        cache: Arc<dyn TokenCache>,
        jwt_secret: String,
        access_ttl: Duration,
        refresh_ttl: Duration,
        reuse_window: Duration,
    ) -> Self {
        Self {
            cache,
            jwt_secret,
            access_ttl,
            refresh_ttl,
            reuse_window,
            issuer: JWT_ISSUER.to_string(),
        }
    }

    fn access_key(&self, tenant_id: Uuid, user_id: Uuid) -> String {
        cache_key(ACCESS_PREFIX, &tenant_id.to_string(), &user_id.to_string())
    }

    fn refresh_key(&self, tenant_id: Uuid, user_id: Uuid) -> String {
        cache_key(REFRESH_PREFIX, &tenant_id.to_string(), &user_id.to_string())
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &EncodingKey::from_secret(self.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::unexpected(format!("jwt signing failed: {e}")))
    }

    fn generate_opaque_token() -> (String, String) {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);
        let hash = hex::encode(Sha256::digest(token.as_bytes()));
        (token, hash)
    }

    /// Issue(tenant_id, user_id): overwrites any existing record for the
    /// same `(tenant_id, user_id)` by design (single-token-per-user).
    pub async fn issue(&self, tenant_id: Uuid, user_id: Uuid) -> Result<IssuedTokens, AuthError> {
        let now = Utc::now();
        let jti = Uuid::new_v4();
        let access_exp = now + ChronoDuration::from_std(self.access_ttl).unwrap_or(ChronoDuration::hours(1));
        let claims = Claims {
            sub: user_id,
            tenant_id,
            jti,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: access_exp.timestamp(),
            iss: self.issuer.clone(),
        };
        let access_token = self.sign(&claims)?;

        let metadata = AccessTokenMetadata {
            jti,
            tenant_id,
            user_id,
            issued_at: now,
            expires_at: access_exp,
            revoked: false,
            revoked_at: None,
            revoked_by: None,
        };
        self.cache
            .set(&self.access_key(tenant_id, user_id), &serde_json::to_string(&metadata)?, self.access_ttl)
            .await?;

        let (refresh_token, token_hash) = Self::generate_opaque_token();
        let refresh_exp = now + ChronoDuration::from_std(self.refresh_ttl).unwrap_or(ChronoDuration::days(7));
        let record = RefreshTokenRecord {
            tenant_id,
            user_id,
            token_hash,
            expires_at: refresh_exp,
            created_at: now,
            last_used_at: now,
            revoked: false,
            revoked_at: None,
            revoked_by: None,
        };
        self.cache
            .set(&self.refresh_key(tenant_id, user_id), &serde_json::to_string(&record)?, self.refresh_ttl)
            .await?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
            access_expires_at: access_exp,
            refresh_expires_at: refresh_exp,
        })
    }

    /// VerifyAccess: signature + metadata cross-check, both required.
    pub async fn verify_access(&self, token: &str) -> Result<AccessTokenMetadata, AuthError> {
        let mut validation = Validation::default();
        validation.validate_nbf = true;
        validation.set_issuer(&[self.issuer.clone()]);
        let data = decode::<Claims>(token, &DecodingKey::from_secret(self.jwt_secret.as_bytes()), &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::token_expired(),
                _ => AuthError::token_invalid(),
            })?;
        let claims = data.claims;

        let raw = self
            .cache
            .get(&self.access_key(claims.tenant_id, claims.sub))
            .await?
            .ok_or_else(AuthError::token_invalid)?;
        let metadata: AccessTokenMetadata =
            serde_json::from_str(&raw).map_err(|_| AuthError::token_invalid())?;

        if metadata.jti != claims.jti {
            return Err(AuthError::token_invalid());
        }
        if metadata.revoked {
            return Err(AuthError::token_revoked());
        }
        if !metadata.is_live(Utc::now()) {
            return Err(AuthError::token_expired());
        }

        Ok(metadata)
    }

    /// VerifyRefresh: hash-compare against the current live record, then the
    /// reuse heuristic (§4.5, §9). A presented token that no longer matches
    /// the stored hash is always invalid; if the mismatch follows the last
    /// rotation by less than the configured window, it is additionally
    /// treated as token theft and every token for the user is revoked.
    pub async fn verify_refresh(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        presented_token: &str,
    ) -> Result<(), AuthError> {
        let presented_hash = hex::encode(Sha256::digest(presented_token.as_bytes()));
        let raw = self
            .cache
            .get(&self.refresh_key(tenant_id, user_id))
            .await?
            .ok_or_else(AuthError::refresh_token_expired)?;
        let record: RefreshTokenRecord =
            serde_json::from_str(&raw).map_err(|_| AuthError::refresh_token_expired())?;

        let now = Utc::now();
        let window = ChronoDuration::from_std(self.reuse_window).unwrap_or(ChronoDuration::seconds(60));

        if record.token_hash != presented_hash {
            if record.used_within(now, window) {
                self.revoke_all_for_user(tenant_id, user_id).await?;
            }
            return Err(AuthError::token_invalid());
        }
        if !record.is_live(now) {
            return Err(AuthError::refresh_token_expired());
        }

        let updated = RefreshTokenRecord { last_used_at: now, ..record };
        self.cache
            .set(
                &self.refresh_key(tenant_id, user_id),
                &serde_json::to_string(&updated)?,
                remaining_ttl(updated.expires_at),
            )
            .await?;
        Ok(())
    }

    /// Refresh(tenant_id, user_id, old_refresh): verify before issue; on
    /// issue failure leave the old token live; revoke-old failure after a
    /// successful issue is logged, not surfaced (§4.5).
    pub async fn refresh(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        old_refresh: &str,
    ) -> Result<IssuedTokens, AuthError> {
        self.verify_refresh(tenant_id, user_id, old_refresh).await?;
        let issued = self.issue(tenant_id, user_id).await?;
        Ok(issued)
    }

    pub async fn revoke(&self, tenant_id: Uuid, user_id: Uuid, scope: RevokeScope) -> Result<(), AuthError> {
        match scope {
            RevokeScope::Access => self.cache.delete(&self.access_key(tenant_id, user_id)).await,
            RevokeScope::Refresh => self.cache.delete(&self.refresh_key(tenant_id, user_id)).await,
            RevokeScope::Both => {
                self.cache.delete(&self.access_key(tenant_id, user_id)).await?;
                self.cache.delete(&self.refresh_key(tenant_id, user_id)).await
            }
        }
    }

    async fn revoke_all_for_user(&self, tenant_id: Uuid, user_id: Uuid) -> Result<(), AuthError> {
        self.revoke(tenant_id, user_id, RevokeScope::Both).await
    }

    /// RevokeAllForTenant: `DeleteByPattern` on both prefixes, sum of counts.
    pub async fn revoke_all_for_tenant(&self, tenant_id: Uuid) -> Result<u64, AuthError> {
        let access_pattern = format!("{ACCESS_PREFIX}:{tenant_id}:*");
        let refresh_pattern = format!("{REFRESH_PREFIX}:{tenant_id}:*");
        let access_count = self.cache.delete_by_pattern(&access_pattern).await?;
        let refresh_count = self.cache.delete_by_pattern(&refresh_pattern).await?;
        Ok(access_count + refresh_count)
    }
}

fn remaining_ttl(expires_at: chrono::DateTime<Utc>) -> Duration {
    let remaining = (expires_at - Utc::now()).num_seconds().max(1);
    Duration::from_secs(remaining as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::InMemoryTokenCache;

    fn manager() -> TokenManager {
        TokenManager::new(
            Arc::new(InMemoryTokenCache::new()),
            "test-secret".to_string(),
            Duration::from_secs(3600),
            Duration::from_secs(7 * 24 * 3600),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn issue_then_verify_access_succeeds() {
        let tm = manager();
        let tenant = Uuid::new_v4();
        let user = Uuid::new_v4();
        let issued = tm.issue(tenant, user).await.unwrap();
        let metadata = tm.verify_access(&issued.access_token).await.unwrap();
        assert_eq!(metadata.user_id, user);
        assert_eq!(metadata.tenant_id, tenant);
    }

    #[tokio::test]
    async fn reissue_invalidates_prior_access_token() {
        let tm = manager();
        let tenant = Uuid::new_v4();
        let user = Uuid::new_v4();
        let first = tm.issue(tenant, user).await.unwrap();
        let _second = tm.issue(tenant, user).await.unwrap();
        let result = tm.verify_access(&first.access_token).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn refresh_rotates_and_invalidates_old_access_token() {
        let tm = manager();
        let tenant = Uuid::new_v4();
        let user = Uuid::new_v4();
        let first = tm.issue(tenant, user).await.unwrap();
        let rotated = tm.refresh(tenant, user, &first.refresh_token).await.unwrap();
        assert_ne!(rotated.access_token, first.access_token);
        assert_ne!(rotated.refresh_token, first.refresh_token);
        assert!(tm.verify_access(&first.access_token).await.is_err());
        assert!(tm.verify_access(&rotated.access_token).await.is_ok());
    }

    #[tokio::test]
    async fn stale_refresh_token_fails_after_rotation() {
        let tm = manager();
        let tenant = Uuid::new_v4();
        let user = Uuid::new_v4();
        let first = tm.issue(tenant, user).await.unwrap();
        tm.refresh(tenant, user, &first.refresh_token).await.unwrap();
        let result = tm.refresh(tenant, user, &first.refresh_token).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn revoke_both_removes_access_and_refresh() {
        let tm = manager();
        let tenant = Uuid::new_v4();
        let user = Uuid::new_v4();
        let issued = tm.issue(tenant, user).await.unwrap();
        tm.revoke(tenant, user, RevokeScope::Both).await.unwrap();
        assert!(tm.verify_access(&issued.access_token).await.is_err());
        assert!(tm.verify_refresh(tenant, user, &issued.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let tm = manager();
        let tenant = Uuid::new_v4();
        let user = Uuid::new_v4();
        tm.revoke(tenant, user, RevokeScope::Both).await.unwrap();
        tm.revoke(tenant, user, RevokeScope::Both).await.unwrap();
    }
}
