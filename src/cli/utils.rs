//! Output formatting helpers shared by every command handler, carried over
//! from the teacher's `output_success`/`output_error` pair. The teacher's
//! multi-server "current item" helpers (`switch_current_item`,
//! `resolve_target_item`, ...) don't apply here — this CLI has one session,
//! not a registry of named servers/tenants to switch between — so they were
//! dropped rather than generalized.

use crate::cli::OutputFormat;
use serde_json::{json, Value};

pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({ "success": true, "message": message });
            if let Some(data_value) = data {
                response["data"] = data_value;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {message}");
        }
    }
    Ok(())
}

pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({ "success": false, "error": message });
            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {message}");
        }
    }
    Ok(())
}

pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{message}");
        }
    }
    Ok(())
}

/// Renders a single fetched resource (role, permission, user, tenant) in
/// either format. JSON mode prints it verbatim; text mode prints it
/// pretty-printed too since these payloads don't have a stable column set
/// worth hand-formatting per resource type.
pub fn output_value(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
