//! `authctl user ...`: thin wrapper over `UserService` (spec §6). `username`
//! is immutable after create (I2); `update` still accepts `--username` so an
//! operator attempting the change gets the server's `RESTRICTED_FIELDS`
//! rejection instead of the flag silently not existing.

use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::config;
use crate::cli::utils::{output_empty_collection, output_success, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user (password_hash must already be Argon2-hashed)")]
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password_hash: String,
    },
    #[command(about = "Show a user by id")]
    Get { id: Uuid },
    #[command(about = "List users in the caller's tenant")]
    List,
    #[command(about = "Update a user's email or status (username is immutable after create)")]
    Update {
        id: Uuid,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    #[command(about = "Delete a user and revoke their tokens")]
    Delete { id: Uuid },
}

fn client() -> anyhow::Result<ApiClient> {
    let session = config::load_session()?;
    let base_url = session.base_url.ok_or_else(|| anyhow::anyhow!("not logged in; run `authctl auth login` first"))?;
    Ok(ApiClient::new(base_url, session.access_token))
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = client()?;
    match cmd {
        UserCommands::Create { email, username, password_hash } => {
            let data = client
                .post("/api/users", json!({ "email": email, "username": username, "password_hash": password_hash }))
                .await?;
            output_success(&output_format, "user created", Some(data))
        }
        UserCommands::Get { id } => {
            let data = client.get(&format!("/api/users/{id}")).await?;
            output_value(&output_format, &data)
        }
        UserCommands::List => {
            let data = client.get("/api/users").await?;
            match data.as_array() {
                Some(items) if items.is_empty() => output_empty_collection(&output_format, "users", "no users found"),
                _ => output_value(&output_format, &data),
            }
        }
        UserCommands::Update { id, email, username, status } => {
            let data = client
                .put(&format!("/api/users/{id}"), json!({ "email": email, "username": username, "status": status }))
                .await?;
            output_success(&output_format, "user updated", Some(data))
        }
        UserCommands::Delete { id } => {
            client.delete(&format!("/api/users/{id}")).await?;
            output_success(&output_format, "user deleted", None)
        }
    }
}
