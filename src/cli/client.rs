//! Thin reqwest wrapper over the RPC surface in `crate::router`, unwrapping
//! the `{"success": true, "data": ...}` / `{"error": true, "code", "message"}`
//! envelopes from `ApiResponse`/`AuthError` so command handlers deal in plain
//! `serde_json::Value`, the same shape the teacher's `ping_server` used for
//! its single `/health` call, generalized to the full CRUD surface.

use serde_json::Value;
use std::time::Duration;

pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build().expect("reqwest client");
        Self { base_url: base_url.trim_end_matches('/').to_string(), token, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        let mut req = self.http.get(self.url(path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Self::unwrap(req.send().await?).await
    }

    pub async fn post(&self, path: &str, body: Value) -> anyhow::Result<Value> {
        let mut req = self.http.post(self.url(path)).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Self::unwrap(req.send().await?).await
    }

    pub async fn put(&self, path: &str, body: Value) -> anyhow::Result<Value> {
        let mut req = self.http.put(self.url(path)).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Self::unwrap(req.send().await?).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<()> {
        let mut req = self.http.delete(self.url(path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let response = req.send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        let body: Value = response.json().await.unwrap_or(Value::Null);
        anyhow::bail!("request failed: {}", body.get("message").and_then(Value::as_str).unwrap_or("unknown error"))
    }

    async fn unwrap(response: reqwest::Response) -> anyhow::Result<Value> {
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if status.is_success() {
            Ok(body.get("data").cloned().unwrap_or(body))
        } else {
            let code = body.get("code").and_then(Value::as_str).unwrap_or("UNKNOWN");
            let message = body.get("message").and_then(Value::as_str).unwrap_or("request failed");
            anyhow::bail!("{code}: {message}")
        }
    }
}
