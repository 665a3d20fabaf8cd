//! Tenant bootstrap (spec §9 Open Question 3): on first startup, ensures the
//! well-known system tenant (`slug = "system"`) exists and returns its ID,
//! persisting it exactly once. `VerificationAPI::is_system_tenant` compares
//! against the ID this returns, cached once in `AppState` and read-only
//! thereafter — not a mutable global.

use crate::domain::{Tenant, TenantStatus};
use crate::error::AuthError;
use crate::store::{CredentialStore, TenantFilter};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct TenantService {
    store: Arc<dyn CredentialStore>,
}

impl TenantService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn bootstrap_system_tenant(&self) -> Result<Uuid, AuthError> {
        match self.store.find_tenant(TenantFilter { id: None, slug: Some(Tenant::SYSTEM_SLUG.to_string()) }).await {
            Ok(tenant) => Ok(tenant.id),
            Err(AuthError::NotFound { .. }) => {
                let now = Utc::now();
                let tenant = Tenant {
                    id: Uuid::new_v4(),
                    name: "System".to_string(),
                    slug: Tenant::SYSTEM_SLUG.to_string(),
                    status: TenantStatus::Active,
                    created_by: None,
                    created_at: now,
                    updated_at: now,
                };
                let created = self.store.create_tenant(tenant).await?;
                Ok(created.id)
            }
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryCredentialStore;

    #[tokio::test]
    async fn bootstrap_creates_system_tenant_once() {
        let store: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new());
        let service = TenantService::new(store);
        let first = service.bootstrap_system_tenant().await.unwrap();
        let second = service.bootstrap_system_tenant().await.unwrap();
        assert_eq!(first, second);
    }
}
