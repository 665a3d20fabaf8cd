//! `authctl permission ...`: thin wrapper over `PermissionService` (spec
//! §6). Creation validates `resource:action[:scope]` server-side via
//! `PermissionTriple::parse`.

use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::config;
use crate::cli::utils::{output_empty_collection, output_success, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum PermissionCommands {
    #[command(about = "Register a permission string")]
    Create {
        #[arg(help = "e.g. invoice:approve or order:read:own")]
        permission_string: String,
        #[arg(long)]
        display_name: String,
        #[arg(long)]
        dangerous: bool,
        #[arg(long)]
        requires_approval: bool,
    },
    #[command(about = "Show a permission by id")]
    Get { id: Uuid },
    #[command(about = "List permissions in the caller's tenant")]
    List,
    #[command(about = "Delete a permission")]
    Delete { id: Uuid },
}

fn client() -> anyhow::Result<ApiClient> {
    let session = config::load_session()?;
    let base_url = session.base_url.ok_or_else(|| anyhow::anyhow!("not logged in; run `authctl auth login` first"))?;
    Ok(ApiClient::new(base_url, session.access_token))
}

pub async fn handle(cmd: PermissionCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = client()?;
    match cmd {
        PermissionCommands::Create { permission_string, display_name, dangerous, requires_approval } => {
            let data = client
                .post(
                    "/api/permissions",
                    json!({
                        "permission_string": permission_string,
                        "display_name": display_name,
                        "is_dangerous": dangerous,
                        "requires_approval": requires_approval,
                        "dependencies": [],
                    }),
                )
                .await?;
            output_success(&output_format, "permission created", Some(data))
        }
        PermissionCommands::Get { id } => {
            let data = client.get(&format!("/api/permissions/{id}")).await?;
            output_value(&output_format, &data)
        }
        PermissionCommands::List => {
            let data = client.get("/api/permissions").await?;
            match data.as_array() {
                Some(items) if items.is_empty() => {
                    output_empty_collection(&output_format, "permissions", "no permissions found")
                }
                _ => output_value(&output_format, &data),
            }
        }
        PermissionCommands::Delete { id } => {
            client.delete(&format!("/api/permissions/{id}")).await?;
            output_success(&output_format, "permission deleted", None)
        }
    }
}
