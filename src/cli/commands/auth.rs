//! `authctl auth ...`: session management against a running `erp-auth-core`
//! server (spec §6 `AuthService`). Unlike role/permission/user/tenant
//! commands, these mutate the local session file instead of just calling
//! the API and printing the result.

use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::config::{self, Session};
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Log in and store the session locally")]
    Login {
        #[arg(long, help = "Base URL of the auth core server")]
        server: String,
        #[arg(long, help = "Tenant ID to authenticate against")]
        tenant_id: Uuid,
        #[arg(help = "Email or username")]
        identifier: String,
        #[arg(long, help = "Password (prompted if omitted)")]
        password: Option<String>,
    },

    #[command(about = "Revoke the current session's tokens and clear local state")]
    Logout,

    #[command(about = "Rotate the current session's tokens")]
    Refresh,

    #[command(about = "Verify the current access token and print the caller identity")]
    Whoami,
}

fn prompt_password() -> anyhow::Result<String> {
    print!("Password: ");
    use std::io::Write;
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Pulls `sub` (the user id) out of the access token's claims without
/// verifying its signature — the CLI trusts whatever the server just handed
/// it over TLS/localhost, it isn't re-validating the server's own token.
fn decode_user_id(access_token: &str) -> Option<Uuid> {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    let payload = access_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims["sub"].as_str().and_then(|s| Uuid::parse_str(s).ok())
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { server, tenant_id, identifier, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };
            let client = ApiClient::new(server.clone(), None);
            let data = client
                .post(
                    "/api/auth/login",
                    json!({ "tenant_id": tenant_id, "identifier": identifier, "password": password }),
                )
                .await?;
            let access = data["access"].as_str().unwrap_or_default().to_string();
            let refresh = data["refresh"].as_str().unwrap_or_default().to_string();
            let user_id = decode_user_id(&access);

            config::save_session(&Session {
                base_url: Some(server),
                tenant_id: Some(tenant_id),
                user_id,
                access_token: Some(access),
                refresh_token: Some(refresh),
            })?;
            output_success(&output_format, "login successful", None)
        }

        AuthCommands::Logout => {
            let session = config::load_session()?;
            let (Some(base_url), Some(access)) = (session.base_url.clone(), session.access_token.clone()) else {
                return output_error(&output_format, "not logged in", None);
            };
            let client = ApiClient::new(base_url, Some(access));
            client.post("/api/auth/logout", json!({})).await?;
            config::clear_session()?;
            output_success(&output_format, "logout successful", None)
        }

        AuthCommands::Refresh => {
            let session = config::load_session()?;
            let (Some(base_url), Some(tenant_id), Some(refresh)) =
                (session.base_url.clone(), session.tenant_id, session.refresh_token.clone())
            else {
                return output_error(&output_format, "not logged in", None);
            };
            let client = ApiClient::new(base_url.clone(), None);
            let data = client
                .post(
                    "/api/auth/refresh",
                    json!({ "tenant_id": tenant_id, "user_id": session.user_id, "refresh_token": refresh }),
                )
                .await?;
            config::save_session(&Session {
                base_url: Some(base_url),
                tenant_id: Some(tenant_id),
                user_id: session.user_id,
                access_token: data["access"].as_str().map(str::to_string),
                refresh_token: data["refresh"].as_str().map(str::to_string),
            })?;
            output_success(&output_format, "token refreshed", None)
        }

        AuthCommands::Whoami => {
            let session = config::load_session()?;
            let (Some(base_url), Some(access)) = (session.base_url.clone(), session.access_token.clone()) else {
                return output_error(&output_format, "not logged in", None);
            };
            let client = ApiClient::new(base_url, None);
            let data = client.post("/api/auth/verify", json!({ "access_token": access })).await?;
            output_success(&output_format, "token is valid", Some(data))
        }
    }
}
