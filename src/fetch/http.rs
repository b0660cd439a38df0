use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::{Credentials, Provider};
use crate::error::{Error, Result};
use crate::records::{RawConversation, RawOrder, RawPurchase};

pub const DEFAULT_BACKEND_URL: &str = "https://vinted-wrapped-backend.vercel.app";

/// Fetching a large account can take a minute or two.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

/// Provider backed by the wrapped HTTP backend.
///
/// Each resource is a `GET` returning `{ "<field>": [ ... ] }`.
pub struct HttpProvider {
    client: Client,
    base_url: Url,
}

impl HttpProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid backend URL {base_url}: {e}")))?;
        // Keep any path prefix when joining endpoint paths.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        field: &str,
        credentials: &Credentials,
    ) -> Result<Vec<T>> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| Error::Config(format!("invalid endpoint {path}: {e}")))?;
        log::debug!("GET {url}");

        let resp = self
            .client
            .get(url)
            .bearer_auth(&credentials.access_token)
            .header("X-CSRF-Token", &credentials.csrf_token)
            .header("X-Domain", &credentials.domain)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Fetch(error_message(&text).unwrap_or_else(|| {
                format!("Request to {path} failed with status {status}")
            })));
        }

        let mut body: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| Error::Fetch(format!("Malformed response from {path}: {e}")))?;
        let items = body
            .get_mut(field)
            .map(serde_json::Value::take)
            .ok_or_else(|| {
                Error::Fetch(format!(
                    "Malformed response from {path}: missing `{field}`"
                ))
            })?;
        serde_json::from_value(items)
            .map_err(|e| Error::Fetch(format!("Malformed response from {path}: {e}")))
    }
}

/// The backend's `error` field, if the body carries one.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

impl Provider for HttpProvider {
    async fn orders(&self, credentials: &Credentials) -> Result<Vec<RawOrder>> {
        self.get_list("api/my-orders", "my_orders", credentials).await
    }

    async fn purchases(&self, credentials: &Credentials) -> Result<Vec<RawPurchase>> {
        self.get_list("api/purchases", "purchases", credentials).await
    }

    async fn conversations(&self, credentials: &Credentials) -> Result<Vec<RawConversation>> {
        self.get_list("api/conversations", "conversations", credentials)
            .await
    }
}
