// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Hosted backend over REST: the storage API for photos and PostgREST for
//! table rows. Every call authenticates with the project API key.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, RequestBuilder, Response, Url};
use tracing::{debug, instrument};

use crate::config::Credentials;
use crate::error::{RegistrationError, Result};
use crate::store::{ObjectStore, RelationalStore, Row, SelectQuery};

pub struct SupabaseClient {
    http: reqwest::Client,
    base: Url,
    key: String,
}

impl SupabaseClient {
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistrationError::Config(format!("Cannot build HTTP client: {e}")))?;
        Self::with_client(credentials, http)
    }

    /// Create a client using the provided [`reqwest::Client`].
    pub fn with_client(credentials: Credentials, http: reqwest::Client) -> Result<Self> {
        let base = Url::parse(&credentials.url).map_err(|e| {
            RegistrationError::Config(format!("Invalid store URL '{}': {e}", credentials.url))
        })?;
        if base.cannot_be_a_base() {
            return Err(RegistrationError::Config(format!(
                "Store URL '{}' cannot be a base",
                credentials.url
            )));
        }
        Ok(Self { http, base, key: credentials.key })
    }

    /// `{base}/storage/v1/object/{bucket}/{path}`.
    pub fn object_url(&self, bucket: &str, path: &str) -> Result<Url> {
        self.endpoint(&["storage", "v1", "object", bucket, path])
    }

    /// `{base}/storage/v1/object/public/{bucket}/{path}`.
    pub fn public_object_url(&self, bucket: &str, path: &str) -> Result<Url> {
        self.endpoint(&["storage", "v1", "object", "public", bucket, path])
    }

    /// `{base}/rest/v1/{table}` plus `select`/`order` parameters when given.
    pub fn table_url(&self, table: &str, query: Option<&SelectQuery>) -> Result<Url> {
        let mut url = self.endpoint(&["rest", "v1", table])?;
        if let Some(query) = query {
            let mut pairs = url.query_pairs_mut();
            if !query.columns.is_empty() {
                pairs.append_pair("select", &query.columns.join(","));
            }
            if let Some(order) = &query.order {
                let dir = if order.descending { "desc" } else { "asc" };
                pairs.append_pair("order", &format!("{}.{dir}", order.column));
            }
        }
        Ok(url)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RegistrationError::Config("Store URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn send(&self, builder: RequestBuilder, url: &Url) -> Result<Response> {
        let response = builder.send().await.map_err(|source| RegistrationError::Http {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RegistrationError::UnexpectedStatus {
            url: url.to_string(),
            status,
            message: error_message(status, &body),
        })
    }
}

/// Message of an error reply: the JSON `message`/`error`/`msg` field when
/// present, otherwise the raw body.
pub fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error", "msg"] {
            if let Some(serde_json::Value::String(msg)) = map.get(field) {
                return msg.clone();
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        format!("store replied {status}")
    } else {
        body.to_string()
    }
}

#[async_trait]
impl ObjectStore for SupabaseClient {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(&self, bucket: &str, path: &str, bytes: Bytes, content_type: &str) -> Result<()> {
        let url = self.object_url(bucket, path)?;
        let builder = self
            .request(Method::POST, url.clone())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);
        self.send(builder, &url).await?;
        debug!(%url, "Object uploaded");
        Ok(())
    }

    async fn public_url(&self, bucket: &str, path: &str) -> Result<String> {
        Ok(self.public_object_url(bucket, path)?.to_string())
    }
}

#[async_trait]
impl RelationalStore for SupabaseClient {
    #[instrument(skip(self, row))]
    async fn insert(&self, table: &str, row: Row) -> Result<()> {
        let url = self.table_url(table, None)?;
        let builder = self
            .request(Method::POST, url.clone())
            .header("Prefer", "return=minimal")
            .json(&row);
        self.send(builder, &url).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Row>> {
        let url = self.table_url(table, Some(query))?;
        let response = self.send(self.request(Method::GET, url.clone()), &url).await?;
        response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| RegistrationError::Decode(format!("{url}: {e}")))
    }
}
