//! Shared, `Arc`-wrapped process state (spec §5): connection pools, the
//! immutable system-tenant ID, and the component graph built once at
//! startup. Mirrors `Alexander423-ERP_SYSTEM::AuthState { jwt_service, db,
//! redis }`, which this crate's `AppState` generalizes to the fuller
//! component set spec.md §2 names.

use crate::auth_api::AuthAPI;
use crate::kdf::PasswordHasher;
use crate::permission_resolver::PermissionResolver;
use crate::rbac_manager::RBACManager;
use crate::store::CredentialStore;
use crate::token_manager::TokenManager;
use crate::verification_api::VerificationAPI;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub resolver: Arc<PermissionResolver>,
    pub tokens: Arc<TokenManager>,
    pub rbac: Arc<RBACManager>,
    pub verification: Arc<VerificationAPI>,
    pub auth: Arc<AuthAPI>,
    pub system_tenant_id: Uuid,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<TokenManager>,
        hasher: Arc<dyn PasswordHasher>,
        system_tenant_id: Uuid,
    ) -> Self {
        let resolver = Arc::new(PermissionResolver::new(store.clone()));
        let rbac = Arc::new(RBACManager::new(store.clone(), resolver.clone()));
        let verification = Arc::new(VerificationAPI::new(store.clone(), resolver.clone(), system_tenant_id));
        let auth = Arc::new(AuthAPI::new(store.clone(), tokens.clone(), hasher));
        Self { store, resolver, tokens, rbac, verification, auth, system_tenant_id }
    }
}
