//! `authctl tenant ...`: thin wrapper over `TenantService` (spec §6), gated
//! server-side on the caller's `tenant:*` permissions.

use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::client::ApiClient;
use crate::cli::config;
use crate::cli::utils::{output_empty_collection, output_success, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "Create a tenant")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        slug: String,
    },
    #[command(about = "Show a tenant by id")]
    Get { id: Uuid },
    #[command(about = "List tenants")]
    List,
    #[command(about = "Update a tenant's name or status")]
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    #[command(about = "Delete a tenant and revoke all of its live tokens")]
    Delete { id: Uuid },
}

fn client() -> anyhow::Result<ApiClient> {
    let session = config::load_session()?;
    let base_url = session.base_url.ok_or_else(|| anyhow::anyhow!("not logged in; run `authctl auth login` first"))?;
    Ok(ApiClient::new(base_url, session.access_token))
}

pub async fn handle(cmd: TenantCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = client()?;
    match cmd {
        TenantCommands::Create { name, slug } => {
            let data = client.post("/api/tenants", json!({ "name": name, "slug": slug })).await?;
            output_success(&output_format, "tenant created", Some(data))
        }
        TenantCommands::Get { id } => {
            let data = client.get(&format!("/api/tenants/{id}")).await?;
            output_value(&output_format, &data)
        }
        TenantCommands::List => {
            let data = client.get("/api/tenants").await?;
            match data.as_array() {
                Some(items) if items.is_empty() => output_empty_collection(&output_format, "tenants", "no tenants found"),
                _ => output_value(&output_format, &data),
            }
        }
        TenantCommands::Update { id, name, status } => {
            let data = client.put(&format!("/api/tenants/{id}"), json!({ "name": name, "status": status })).await?;
            output_success(&output_format, "tenant updated", Some(data))
        }
        TenantCommands::Delete { id } => {
            client.delete(&format!("/api/tenants/{id}")).await?;
            output_success(&output_format, "tenant deleted", None)
        }
    }
}
