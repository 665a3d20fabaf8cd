//! `authctl role ...`: thin wrapper over `RoleService` (spec §6), backed by
//! `RBACManager` server-side.

use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::config;
use crate::cli::utils::{output_empty_collection, output_success, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum RoleCommands {
    #[command(about = "Create a role")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        slug: String,
        #[arg(long, help = "Comma-separated permission strings, e.g. order:read,order:write")]
        permissions: String,
    },
    #[command(about = "Show a role by id")]
    Get { id: Uuid },
    #[command(about = "List roles in the caller's tenant")]
    List,
    #[command(about = "Replace a role's permission set")]
    Update {
        id: Uuid,
        #[arg(long)]
        permissions: String,
    },
    #[command(about = "Delete a role (fails if it is in use or is a system role)")]
    Delete { id: Uuid },
}

fn client() -> anyhow::Result<ApiClient> {
    let session = config::load_session()?;
    let base_url = session.base_url.ok_or_else(|| anyhow::anyhow!("not logged in; run `authctl auth login` first"))?;
    Ok(ApiClient::new(base_url, session.access_token))
}

fn split_permissions(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

pub async fn handle(cmd: RoleCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = client()?;
    match cmd {
        RoleCommands::Create { name, slug, permissions } => {
            let data = client
                .post(
                    "/api/roles",
                    json!({ "name": name, "slug": slug, "permissions": split_permissions(&permissions) }),
                )
                .await?;
            output_success(&output_format, "role created", Some(data))
        }
        RoleCommands::Get { id } => {
            let data = client.get(&format!("/api/roles/{id}")).await?;
            output_value(&output_format, &data)
        }
        RoleCommands::List => {
            let data = client.get("/api/roles").await?;
            match data.as_array() {
                Some(items) if items.is_empty() => output_empty_collection(&output_format, "roles", "no roles found"),
                _ => output_value(&output_format, &data),
            }
        }
        RoleCommands::Update { id, permissions } => {
            let data = client
                .put(&format!("/api/roles/{id}"), json!({ "permissions": split_permissions(&permissions) }))
                .await?;
            output_success(&output_format, "role updated", Some(data))
        }
        RoleCommands::Delete { id } => {
            client.delete(&format!("/api/roles/{id}")).await?;
            output_success(&output_format, "role deleted", None)
        }
    }
}
