// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Store seam: object storage for photos + relational rows, with a hosted
//! REST backend and an in-memory one.

pub mod memory;
pub mod supabase;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::{Config, StoreConfig};
use crate::error::{RegistrationError, Result};

/// One table row: column name → JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Ordering clause of a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// Projection + optional ordering against one table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectQuery {
    pub columns: Vec<String>,
    pub order: Option<Order>,
}

impl SelectQuery {
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { columns: columns.into_iter().map(Into::into).collect(), order: None }
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(Order { column: column.to_string(), descending: true });
        self
    }
}

/// Blob storage keyed by bucket + path.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `bucket/path` with the given content type.
    async fn upload(&self, bucket: &str, path: &str, bytes: Bytes, content_type: &str) -> Result<()>;

    /// Public, unauthenticated URL of `bucket/path`.
    async fn public_url(&self, bucket: &str, path: &str) -> Result<String>;
}

/// Row storage: insert one row, or select with projection and ordering.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    async fn insert(&self, table: &str, row: Row) -> Result<()>;

    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Row>>;
}

/// Bucket and table names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub photo_bucket: String,
    pub inscriptions_table: String,
    pub players_table: String,
}

impl From<&StoreConfig> for StoreLayout {
    fn from(cfg: &StoreConfig) -> Self {
        Self {
            photo_bucket: cfg.photo_bucket.clone(),
            inscriptions_table: cfg.inscriptions_table.clone(),
            players_table: cfg.players_table.clone(),
        }
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::from(&StoreConfig::default())
    }
}

/// Store handles shared by every request.
#[derive(Clone)]
pub struct Stores {
    pub objects: Arc<dyn ObjectStore>,
    pub rows: Arc<dyn RelationalStore>,
    pub layout: StoreLayout,
}

/// Data capability resolved once at startup.
#[derive(Clone)]
pub enum Backend {
    Ready(Stores),
    Unavailable { reason: String },
}

impl Backend {
    /// Hosted backend when both credentials are present, `Unavailable` otherwise.
    pub fn from_config(config: &Config) -> Result<Self> {
        let Some(credentials) = config.credentials() else {
            return Ok(Backend::Unavailable {
                reason: format!(
                    "missing {} or {}",
                    crate::config::URL_ENV,
                    crate::config::KEY_ENV
                ),
            });
        };
        let client = Arc::new(supabase::SupabaseClient::new(
            credentials,
            std::time::Duration::from_secs(config.store.timeout_secs),
        )?);
        Ok(Backend::Ready(Stores {
            objects: client.clone(),
            rows: client,
            layout: StoreLayout::from(&config.store),
        }))
    }

    /// Backend over a single in-memory store.
    pub fn in_memory(store: Arc<memory::MemoryStore>, layout: StoreLayout) -> Self {
        Backend::Ready(Stores { objects: store.clone(), rows: store, layout })
    }

    pub fn stores(&self) -> Result<&Stores> {
        match self {
            Backend::Ready(stores) => Ok(stores),
            Backend::Unavailable { reason } => Err(RegistrationError::Config(reason.clone())),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Backend::Ready(_))
    }
}
