//! AuthAPI (spec §4.8): the external surface of the token subsystem. Wrong
//! password, missing user, and inactive tenant are all collapsed into
//! `InvalidCredentials` — clients never learn which sub-check failed.

use crate::domain::{AccessTokenMetadata, TenantStatus};
use crate::error::AuthError;
use crate::kdf::PasswordHasher;
use crate::store::{CredentialStore, TenantFilter, UserFilter};
use crate::token_manager::{IssuedTokens, RevokeScope, TokenManager};
use std::sync::Arc;
use uuid::Uuid;

pub struct LogoutOutcome {
    pub message: &'static str,
}

pub struct AuthAPI {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenManager>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AuthAPI {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: Arc<TokenManager>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, tokens, hasher }
    }

    pub async fn authenticate(
        &self,
        tenant_id: Uuid,
        identifier: &str,
        password: &str,
    ) -> Result<IssuedTokens, AuthError> {
        let tenant = self
            .store
            .find_tenant(TenantFilter { id: Some(tenant_id), slug: None })
            .await
            .map_err(|_| AuthError::invalid_credentials())?;
        if tenant.status == TenantStatus::Inactive {
            return Err(AuthError::invalid_credentials());
        }

        let user = self
            .store
            .find_user(UserFilter::by_identifier(tenant_id, identifier))
            .await
            .map_err(|_| AuthError::invalid_credentials())?;

        if !self.hasher.verify(password, &user.password_hash) {
            return Err(AuthError::invalid_credentials());
        }

        self.tokens.issue(tenant_id, user.id).await
    }

    pub async fn refresh(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        refresh_token: &str,
    ) -> Result<IssuedTokens, AuthError> {
        self.tokens.refresh(tenant_id, user_id, refresh_token).await
    }

    /// Best-effort: success if at least one of {access, refresh} deletes.
    pub async fn logout(&self, tenant_id: Uuid, user_id: Uuid) -> Result<LogoutOutcome, AuthError> {
        let access_result = self.tokens.revoke(tenant_id, user_id, RevokeScope::Access).await;
        let refresh_result = self.tokens.revoke(tenant_id, user_id, RevokeScope::Refresh).await;

        match (&access_result, &refresh_result) {
            (Err(e), Err(_)) => {
                tracing::warn!("logout failed to revoke both access and refresh tokens: {e}");
                Err(AuthError::service_unavailable("logout failed"))
            }
            _ => {
                if let Err(e) = &access_result {
                    tracing::warn!("logout: access token revoke failed, refresh succeeded: {e}");
                }
                if let Err(e) = &refresh_result {
                    tracing::warn!("logout: refresh token revoke failed, access succeeded: {e}");
                }
                Ok(LogoutOutcome { message: "logout successful" })
            }
        }
    }

    pub async fn verify(&self, access_token: &str) -> Result<AccessTokenMetadata, AuthError> {
        self.tokens.verify_access(access_token).await
    }
}
