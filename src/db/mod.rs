pub mod db_pool;
pub mod handle;
pub mod query_result;
pub mod schema_cache;

mod duckdb_backend;
mod mysql_backend;

pub use handle::{ConnectParams, DatabaseDriver, DatabaseHandle, HandleId, PoolSettings};
pub use query_result::QueryResult;
pub use schema_cache::{SchemaCache, SchemaDescription};

/// Sample rows shown per table in a schema description.
pub(crate) const SAMPLE_ROWS: usize = 3;
