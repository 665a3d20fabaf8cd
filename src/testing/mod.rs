//! Fixture builders for unit and integration tests: an in-memory
//! `AppState` plus helpers to seed a tenant, a role, and a user in one call,
//! so `tests/*.rs` don't hand-roll the object graph per scenario.

use crate::cache::memory::InMemoryTokenCache;
use crate::domain::{Role, RoleType, Tenant, TenantStatus, User, UserRoleAssignment, UserStatus};
use crate::kdf::{Argon2Hasher, PasswordHasher};
use crate::state::AppState;
use crate::store::memory::InMemoryCredentialStore;
use crate::store::CredentialStore;
use crate::token_manager::TokenManager;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const TEST_ACCESS_TTL: Duration = Duration::from_secs(3600);
pub const TEST_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 3600);
pub const TEST_REUSE_WINDOW: Duration = Duration::from_secs(60);

/// Builds an `AppState` backed entirely by in-memory stores, matching the
/// production component graph (`AppState::new`) but with no external
/// processes required (spec §9: CredentialStore/TokenCache are swappable
/// behind their trait boundaries).
pub fn test_state() -> AppState {
    test_state_with_system_tenant(Uuid::new_v4())
}

pub fn test_state_with_system_tenant(system_tenant_id: Uuid) -> AppState {
    let store: Arc<dyn CredentialStore> = Arc::new(InMemoryCredentialStore::new());
    let tokens = Arc::new(TokenManager::new(
        Arc::new(InMemoryTokenCache::new()),
        "test-jwt-secret".to_string(),
        TEST_ACCESS_TTL,
        TEST_REFRESH_TTL,
        TEST_REUSE_WINDOW,
    ));
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher);
    AppState::new(store, tokens, hasher, system_tenant_id)
}

pub async fn seed_tenant(state: &AppState, slug: &str) -> Tenant {
    let now = Utc::now();
    let tenant = Tenant {
        id: Uuid::new_v4(),
        name: slug.to_string(),
        slug: slug.to_lowercase(),
        status: TenantStatus::Active,
        created_by: None,
        created_at: now,
        updated_at: now,
    };
    state.store.create_tenant(tenant).await.unwrap()
}

pub async fn seed_role(state: &AppState, tenant_id: Uuid, name: &str, permissions: &[&str]) -> Role {
    let now = Utc::now();
    let role = Role {
        id: Uuid::new_v4(),
        tenant_id,
        name: name.to_string(),
        slug: name.to_lowercase(),
        description: None,
        r#type: RoleType::Custom,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        status: "active".to_string(),
        created_by: None,
        created_at: now,
        updated_at: now,
    };
    state.store.create_role(role).await.unwrap()
}

/// Seeds a user with `password` hashed through the same KDF used in
/// production, so `AuthAPI::authenticate` fixtures exercise the real
/// verify path rather than a stand-in hash.
pub async fn seed_user(
    state: &AppState,
    tenant_id: Uuid,
    email: &str,
    username: &str,
    password: &str,
    role_ids: &[Uuid],
) -> User {
    let now = Utc::now();
    let hasher = Argon2Hasher;
    let user = User {
        id: Uuid::new_v4(),
        tenant_id,
        email: email.to_lowercase(),
        username: username.to_lowercase(),
        password_hash: hasher.hash(password).unwrap(),
        status: UserStatus::Active,
        roles: role_ids
            .iter()
            .map(|&role_id| UserRoleAssignment { role_id, assigned_at: now })
            .collect(),
        additional_permissions: HashSet::new(),
        revoked_permissions: HashSet::new(),
        created_by: None,
        created_at: now,
        updated_at: now,
    };
    state.store.create_user(user).await.unwrap()
}
