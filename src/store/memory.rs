// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! In-memory store used for local runs (`serve --memory`) and tests.
//!
//! Failure injection switches let callers exercise the upload, insert and
//! select error paths without a network.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{RegistrationError, Result};
use crate::store::{ObjectStore, RelationalStore, Row, SelectQuery};

/// A stored blob with its declared content type.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: String,
}

pub struct MemoryStore {
    base_url: String,
    objects: RwLock<HashMap<(String, String), StoredObject>>,
    tables: RwLock<HashMap<String, Vec<Row>>>,
    fail_uploads: AtomicBool,
    fail_inserts: RwLock<Option<String>>,
    fail_selects: RwLock<Option<String>>,
}

impl MemoryStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
            tables: RwLock::new(HashMap::new()),
            fail_uploads: AtomicBool::new(false),
            fail_inserts: RwLock::new(None),
            fail_selects: RwLock::new(None),
        }
    }

    /// Make every subsequent upload fail.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, AtomicOrdering::SeqCst);
    }

    /// Make every subsequent insert fail with `message`, or clear with `None`.
    pub fn set_fail_inserts(&self, message: Option<&str>) {
        *self.fail_inserts.write() = message.map(str::to_string);
    }

    /// Make every subsequent select fail with `message`, or clear with `None`.
    pub fn set_fail_selects(&self, message: Option<&str>) {
        *self.fail_selects.write() = message.map(str::to_string);
    }

    /// Append rows directly, bypassing failure injection.
    pub fn seed<I>(&self, table: &str, rows: I)
    where
        I: IntoIterator<Item = Row>,
    {
        self.tables.write().entry(table.to_string()).or_default().extend(rows);
    }

    /// Snapshot of every row in `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.read().get(table).cloned().unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("http://localhost")
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(&self, bucket: &str, path: &str, bytes: Bytes, content_type: &str) -> Result<()> {
        if self.fail_uploads.load(AtomicOrdering::SeqCst) {
            return Err(RegistrationError::Store(format!("upload of {bucket}/{path} rejected")));
        }
        let mut objects = self.objects.write();
        let key = (bucket.to_string(), path.to_string());
        if objects.contains_key(&key) {
            return Err(RegistrationError::Store("The resource already exists".into()));
        }
        objects.insert(key, StoredObject { bytes, content_type: content_type.to_string() });
        Ok(())
    }

    async fn public_url(&self, bucket: &str, path: &str) -> Result<String> {
        Ok(format!("{}/storage/v1/object/public/{bucket}/{path}", self.base_url))
    }
}

#[async_trait]
impl RelationalStore for MemoryStore {
    async fn insert(&self, table: &str, row: Row) -> Result<()> {
        if let Some(message) = self.fail_inserts.read().clone() {
            return Err(RegistrationError::Store(message));
        }
        self.tables.write().entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Row>> {
        if let Some(message) = self.fail_selects.read().clone() {
            return Err(RegistrationError::Store(message));
        }
        let mut rows = self.rows(table);
        if let Some(order) = &query.order {
            // Stable sort: ties keep insertion order.
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                if order.descending { ord.reverse() } else { ord }
            });
        }
        if query.columns.is_empty() {
            return Ok(rows);
        }
        Ok(rows
            .into_iter()
            .map(|row| {
                query
                    .columns
                    .iter()
                    .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect())
    }
}

/// Ascending order with nulls last, so a descending sort puts nulls first
/// like PostgreSQL does.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
