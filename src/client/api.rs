//! HTTP client speaking the `{success, data|error}` envelope protocol.

use anyhow::{bail, Context, Result};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<()> {
        let response = self.http.get(self.url("/api/health")).send().await?;
        unwrap_envelope(response).await.map(|_| ())
    }

    pub async fn fetch_document(&self, filename: &str) -> Result<Value> {
        let response = self
            .http
            .get(self.url(&format!("/api/data/{}", filename)))
            .send()
            .await?;
        unwrap_envelope(response).await
    }

    /// The combined endpoint; missing documents come back as `null`.
    pub async fn fetch_all(&self) -> Result<Value> {
        let response = self.http.get(self.url("/api/data")).send().await?;
        unwrap_envelope(response).await
    }

    pub async fn replace_document(&self, filename: &str, doc: &Value) -> Result<Value> {
        let response = self
            .http
            .post(self.url(&format!("/api/data/{}", filename)))
            .json(doc)
            .send()
            .await?;
        unwrap_envelope(response).await
    }

    pub async fn patch_item(&self, filename: &str, id: u64, patch: &Value) -> Result<Value> {
        let response = self
            .http
            .put(self.url(&format!("/api/data/{}/{}", filename, id)))
            .json(patch)
            .send()
            .await?;
        unwrap_envelope(response).await
    }

    pub async fn delete_item(&self, filename: &str, id: u64) -> Result<Value> {
        let response = self
            .http
            .delete(self.url(&format!("/api/data/{}/{}", filename, id)))
            .send()
            .await?;
        unwrap_envelope(response).await
    }

    pub async fn backup(&self) -> Result<Value> {
        let response = self.http.post(self.url("/api/backup")).send().await?;
        unwrap_envelope(response).await
    }
}

async fn unwrap_envelope(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let mut body: Value = response
        .json()
        .await
        .with_context(|| format!("non-JSON response (status {})", status))?;

    if body.get("success").and_then(Value::as_bool) == Some(true) {
        // Health responses carry no data field; hand back the envelope.
        Ok(body
            .get_mut("data")
            .map(Value::take)
            .unwrap_or_else(|| body.clone()))
    } else {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        bail!("server error (status {}): {}", status, message)
    }
}
