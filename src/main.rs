//! Process entry point: wires connection pools (document store, key-value
//! store) into the component graph (`AppState`) and serves the RPC surface
//! over HTTP, following the teacher's `main.rs` shape (router assembly +
//! `tokio::main`) generalized to the auth/RBAC core's component set.

use erp_auth_core::cache::redis::RedisTokenCache;
use erp_auth_core::cache::TokenCache;
use erp_auth_core::config::config;
use erp_auth_core::kdf::Argon2Hasher;
use erp_auth_core::router;
use erp_auth_core::services::tenant_service::TenantService;
use erp_auth_core::state::AppState;
use erp_auth_core::store::postgres::PostgresCredentialStore;
use erp_auth_core::store::CredentialStore;
use erp_auth_core::token_manager::TokenManager;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cfg = config();

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.url)
        .await?;
    let store: Arc<dyn CredentialStore> = Arc::new(PostgresCredentialStore::new(pool));

    let cache: Arc<dyn TokenCache> = Arc::new(RedisTokenCache::connect(&cfg.cache.url).await?);
    let tokens = Arc::new(TokenManager::new(
        cache,
        cfg.security.jwt_secret.clone(),
        cfg.access_token_ttl(),
        cfg.refresh_token_ttl(),
        cfg.reuse_detection_window(),
    ));

    let system_tenant_id = TenantService::new(store.clone()).bootstrap_system_tenant().await?;
    tracing::info!(%system_tenant_id, "system tenant bootstrapped");

    let hasher = Arc::new(Argon2Hasher);
    let state = AppState::new(store, tokens, hasher, system_tenant_id);
    let app = router::build(state);

    let listener = tokio::net::TcpListener::bind(&cfg.api.bind_addr).await?;
    tracing::info!(addr = %cfg.api.bind_addr, "erp-auth-core listening");
    axum::serve(listener, app).await?;

    Ok(())
}
