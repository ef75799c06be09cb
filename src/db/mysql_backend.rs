use mysql::prelude::Queryable;
use mysql::{Conn, Row, Value};
use r2d2::Pool;
use tracing::warn;

use crate::db::db_pool::MySqlConnectionManager;
use crate::db::query_result::QueryResult;
use crate::db::schema_cache::TableDescription;
use crate::db::SAMPLE_ROWS;
use crate::error::{ConnectionError, QueryExecutionError};

pub(crate) fn execute(
    pool: &Pool<MySqlConnectionManager>,
    sql: &str,
) -> Result<QueryResult, QueryExecutionError> {
    let mut conn = pool
        .get()
        .map_err(|e| QueryExecutionError::PoolTimeout(e.to_string()))?;
    fetch(&mut conn, sql).map_err(|e| QueryExecutionError::Backend(e.to_string()))
}

pub(crate) fn introspect(
    pool: &Pool<MySqlConnectionManager>,
) -> Result<Vec<TableDescription>, ConnectionError> {
    let mut conn = pool
        .get()
        .map_err(|e| ConnectionError::Introspection(e.to_string()))?;
    describe_tables(&mut conn).map_err(|e| ConnectionError::Introspection(e.to_string()))
}

fn describe_tables(conn: &mut Conn) -> mysql::Result<Vec<TableDescription>> {
    // Views are left out, SHOW CREATE TABLE reports them with a different shape
    let listing: Vec<Row> = conn.query("SHOW FULL TABLES WHERE Table_type = 'BASE TABLE'")?;
    let names: Vec<String> = listing
        .iter()
        .filter_map(|row| row.get_opt::<String, usize>(0)?.ok())
        .collect();

    let mut descriptions = Vec::with_capacity(names.len());
    for name in names {
        let ident = quote_ident(&name);

        let create: Vec<Row> = conn.query(format!("SHOW CREATE TABLE {}", ident))?;
        let ddl = match create.first().and_then(|row| row.get_opt::<String, usize>(1)?.ok()) {
            Some(ddl) => ddl,
            None => {
                warn!("No CREATE TABLE statement returned for {}", name);
                format!("CREATE TABLE {} (...)", ident)
            }
        };

        let sample = fetch(conn, &format!("SELECT * FROM {} LIMIT {}", ident, SAMPLE_ROWS))?;

        descriptions.push(TableDescription { name, ddl, sample });
    }

    Ok(descriptions)
}

/// Runs `sql` and keeps the first result set. Column names come from the set's
/// metadata, so they survive an empty result.
fn fetch(conn: &mut Conn, sql: &str) -> mysql::Result<QueryResult> {
    let mut result = conn.query_iter(sql)?;
    let Some(set) = result.iter() else {
        return Ok(QueryResult::default());
    };

    let columns = set
        .columns()
        .as_ref()
        .iter()
        .map(|column| column.name_str().into_owned())
        .collect();
    let rows = set.collect::<mysql::Result<Vec<Row>>>()?;

    Ok(rows_to_result(columns, &rows))
}

fn rows_to_result(columns: Vec<String>, rows: &[Row]) -> QueryResult {
    let rendered = rows
        .iter()
        .map(|row| {
            (0..row.len())
                .map(|i| row.as_ref(i).map(render_value).unwrap_or_else(|| "NULL".to_string()))
                .collect()
        })
        .collect();

    QueryResult::new(columns, rendered)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::NULL => "NULL".to_string(),
        Value::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        // Dates and times
        other => other.as_sql(false).trim_matches('\'').to_string(),
    }
}

fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&Value::NULL), "NULL");
        assert_eq!(render_value(&Value::Bytes(b"Aruba".to_vec())), "Aruba");
        assert_eq!(render_value(&Value::Int(-3)), "-3");
        assert_eq!(render_value(&Value::UInt(42)), "42");
        assert_eq!(render_value(&Value::Double(1.5)), "1.5");
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("city"), "`city`");
        assert_eq!(quote_ident("odd`name"), "`odd``name`");
    }

    #[test]
    fn test_empty_rows_keep_columns() {
        let result = rows_to_result(vec!["Name".to_string(), "Population".to_string()], &[]);
        assert_eq!(result.columns, vec!["Name", "Population"]);
        assert!(result.is_empty());
        assert_eq!(result.to_tsv(), "Name\tPopulation");
    }
}
