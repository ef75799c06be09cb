use lru::LruCache;
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::db::handle::{DatabaseHandle, HandleId};
use crate::db::query_result::QueryResult;
use crate::error::ConnectionError;

pub const DEFAULT_CAPACITY: usize = 32;

/// Text rendering of the tables behind a handle. Clones share one allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescription(Arc<str>);

/// One table as seen by introspection.
#[derive(Debug, Clone)]
pub struct TableDescription {
    pub name: String,
    pub ddl: String,
    pub sample: QueryResult,
}

impl SchemaDescription {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    /// `CREATE TABLE` text per table followed by a comment with its sample rows.
    pub fn from_tables(tables: &[TableDescription]) -> Self {
        if tables.is_empty() {
            return Self::new("No tables found.");
        }

        let sections: Vec<String> = tables
            .iter()
            .map(|table| {
                format!(
                    "{}\n\n/*\n{} rows from {} table:\n{}\n*/",
                    table.ddl.trim_end(),
                    table.sample.row_count(),
                    table.name,
                    table.sample.to_tsv()
                )
            })
            .collect();

        Self::new(sections.join("\n\n"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when both values are the same cached allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for SchemaDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounded memo of schema descriptions keyed by handle identity.
///
/// Entries are never refreshed: a stale description stays until the handle is
/// replaced (and [`SchemaCache::forget`] is called) or it ages out of the LRU.
pub struct SchemaCache {
    entries: Mutex<LruCache<HandleId, SchemaDescription>>,
}

impl SchemaCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn get_schema(
        &self,
        handle: &DatabaseHandle,
    ) -> Result<SchemaDescription, ConnectionError> {
        self.get_or_introspect(handle.id(), || handle.introspect())
            .await
    }

    /// Returns the cached entry for `id`, running `introspect` only on a miss.
    pub async fn get_or_introspect<F, Fut>(
        &self,
        id: HandleId,
        introspect: F,
    ) -> Result<SchemaDescription, ConnectionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SchemaDescription, ConnectionError>>,
    {
        if let Some(schema) = self.entries.lock().await.get(&id) {
            debug!("Schema cache hit for handle {}", id);
            return Ok(schema.clone());
        }

        // The lock is not held across introspection, it can block on the network
        info!("Schema cache miss for handle {}, introspecting", id);
        let schema = introspect().await?;

        let mut entries = self.entries.lock().await;
        if let Some((evicted, _)) = entries.push(id, schema.clone()) {
            if evicted != id {
                debug!("Evicted schema for handle {}", evicted);
            }
        }
        Ok(schema)
    }

    pub async fn forget(&self, id: HandleId) {
        if self.entries.lock().await.pop(&id).is_some() {
            debug!("Dropped cached schema for handle {}", id);
        }
    }

    pub async fn contains(&self, id: HandleId) -> bool {
        self.entries.lock().await.contains(&id)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
