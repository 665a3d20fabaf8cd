use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// `JWT_SECRET_KEY` — required in production; `"secret"` default is for tests only.
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    /// Reuse-detection window (spec §9): tunable, default 60s.
    pub reuse_detection_window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub enable_request_logging: bool,
    pub bind_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub api: ApiConfig,
}

fn parse_duration_string(raw: &str, default_secs: u64) -> u64 {
    // Accepts Go-style duration suffixes used by the configuration surface in
    // spec §6 (`1h`, `168h`, `30m`, `45s`); falls back to the default on any
    // unparseable input rather than failing startup over a malformed env var.
    let raw = raw.trim();
    if raw.is_empty() {
        return default_secs;
    }
    let (digits, unit) = raw.split_at(raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len()));
    let value: u64 = match digits.parse() {
        Ok(v) => v,
        Err(_) => return default_secs,
    };
    match unit {
        "h" => value * 3600,
        "m" => value * 60,
        "s" | "" => value,
        _ => default_secs,
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let access_ttl = env::var("ACCESS_TOKEN_DURATION")
            .map(|v| parse_duration_string(&v, 3600))
            .unwrap_or(3600);
        let refresh_ttl = env::var("REFRESH_TOKEN_DURATION")
            .map(|v| parse_duration_string(&v, 168 * 3600))
            .unwrap_or(168 * 3600);
        let reuse_window = env::var("REUSE_DETECTION_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let jwt_secret = env::var("JWT_SECRET_KEY").unwrap_or_else(|_| {
            if matches!(environment, Environment::Production) {
                tracing::warn!(
                    "JWT_SECRET_KEY not set in production environment; falling back to the insecure test default"
                );
            }
            "secret".to_string()
        });

        Self {
            environment,
            security: SecurityConfig {
                jwt_secret,
                access_token_ttl_secs: access_ttl,
                refresh_token_ttl_secs: refresh_ttl,
                reuse_detection_window_secs: reuse_window,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgres://localhost/auth_db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            },
            cache: CacheConfig {
                url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            },
            api: ApiConfig {
                enable_cors: !matches!(environment, Environment::Production),
                cors_origins: env::var("CORS_ORIGINS")
                    .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
                enable_request_logging: true,
                bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            },
        }
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::from_secs(self.security.access_token_ttl_secs)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::from_secs(self.security.refresh_token_ttl_secs)
    }

    pub fn reuse_detection_window(&self) -> Duration {
        Duration::from_secs(self.security.reuse_detection_window_secs)
    }
}

// Global singleton config — initialized once at startup, read thereafter.
// Immutable configuration per the concurrency model's shared-resource policy (spec §5).
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hour_suffix() {
        assert_eq!(parse_duration_string("1h", 0), 3600);
        assert_eq!(parse_duration_string("168h", 0), 168 * 3600);
    }

    #[test]
    fn parses_bare_seconds() {
        assert_eq!(parse_duration_string("45", 0), 45);
        assert_eq!(parse_duration_string("45s", 0), 45);
    }

    #[test]
    fn falls_back_to_default_on_garbage() {
        assert_eq!(parse_duration_string("not-a-duration", 99), 99);
    }
}
