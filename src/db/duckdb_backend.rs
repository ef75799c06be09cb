use duckdb::arrow::array::Array;
use duckdb::arrow::record_batch::RecordBatch;
use duckdb::arrow::util::display::array_value_to_string;
use duckdb::{params, Connection};
use r2d2::Pool;

use crate::db::db_pool::DuckDbConnectionManager;
use crate::db::query_result::QueryResult;
use crate::db::schema_cache::TableDescription;
use crate::db::SAMPLE_ROWS;
use crate::error::{ConnectionError, QueryExecutionError};

pub(crate) fn execute(
    pool: &Pool<DuckDbConnectionManager>,
    sql: &str,
) -> Result<QueryResult, QueryExecutionError> {
    let conn = pool
        .get()
        .map_err(|e| QueryExecutionError::PoolTimeout(e.to_string()))?;
    run_query(&conn, sql).map_err(|e| QueryExecutionError::Backend(e.to_string()))
}

pub(crate) fn introspect(
    pool: &Pool<DuckDbConnectionManager>,
) -> Result<Vec<TableDescription>, ConnectionError> {
    let conn = pool
        .get()
        .map_err(|e| ConnectionError::Introspection(e.to_string()))?;
    describe_tables(&conn).map_err(|e| ConnectionError::Introspection(e.to_string()))
}

fn run_query(conn: &Connection, sql: &str) -> duckdb::Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let arrow = stmt.query_arrow([])?;
    let schema = arrow.get_schema();

    let columns = schema
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect::<Vec<String>>();

    let batches: Vec<RecordBatch> = arrow.collect();
    let mut rows = Vec::new();
    for batch in &batches {
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|column| render_cell(column.as_ref(), row))
                    .collect(),
            );
        }
    }

    Ok(QueryResult::new(columns, rows))
}

fn render_cell(column: &dyn Array, row: usize) -> String {
    if column.is_null(row) {
        return "NULL".to_string();
    }
    array_value_to_string(column, row).unwrap_or_else(|e| format!("<{}>", e))
}

fn describe_tables(conn: &Connection) -> duckdb::Result<Vec<TableDescription>> {
    let mut tables_stmt = conn.prepare(
        "SELECT table_schema, table_name FROM information_schema.tables \
         WHERE table_type = 'BASE TABLE' AND table_schema NOT IN ('information_schema', 'pg_catalog') \
         ORDER BY table_schema, table_name",
    )?;
    let tables = tables_stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut columns_stmt = conn.prepare(
        "SELECT column_name, data_type, is_nullable FROM information_schema.columns \
         WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
    )?;

    let mut descriptions = Vec::with_capacity(tables.len());
    for (schema_name, table_name) in &tables {
        let columns = columns_stmt
            .query_map(params![schema_name, table_name], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)? == "YES",
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        // Tables in the default schema are shown unqualified
        let display_name = if schema_name == "main" {
            table_name.clone()
        } else {
            format!("{}.{}", schema_name, table_name)
        };
        let qualified = format!("{}.{}", quote_ident(schema_name), quote_ident(table_name));

        let mut ddl = format!("CREATE TABLE {} (\n", display_name);
        let defs: Vec<String> = columns
            .iter()
            .map(|(name, data_type, nullable)| {
                let null_str = if *nullable { "" } else { " NOT NULL" };
                format!("    {} {}{}", name, data_type, null_str)
            })
            .collect();
        ddl.push_str(&defs.join(",\n"));
        ddl.push_str("\n);");

        let sample = run_query(conn, &format!("SELECT * FROM {} LIMIT {}", qualified, SAMPLE_ROWS))?;

        descriptions.push(TableDescription {
            name: display_name,
            ddl,
            sample,
        });
    }

    Ok(descriptions)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use r2d2::ManageConnection;

    fn seeded() -> Connection {
        let manager = DuckDbConnectionManager::open(":memory:").unwrap();
        let conn = manager.connect().unwrap();
        conn.execute_batch(
            "CREATE TABLE Artist (ArtistId INTEGER NOT NULL, Name VARCHAR);
             INSERT INTO Artist VALUES (1, 'AC/DC'), (2, 'Accept'), (3, NULL), (4, 'Aerosmith');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_run_query_renders_cells() {
        let conn = seeded();
        let result = run_query(&conn, "SELECT ArtistId, Name FROM Artist ORDER BY ArtistId").unwrap();
        assert_eq!(result.columns, vec!["ArtistId", "Name"]);
        assert_eq!(result.row_count(), 4);
        assert_eq!(result.rows[0], vec!["1", "AC/DC"]);
        assert_eq!(result.rows[2], vec!["3", "NULL"]);
    }

    #[test]
    fn test_describe_tables() {
        let conn = seeded();
        let tables = describe_tables(&conn).unwrap();
        assert_eq!(tables.len(), 1);

        let artist = &tables[0];
        assert_eq!(artist.name, "Artist");
        assert!(artist.ddl.starts_with("CREATE TABLE Artist ("));
        assert!(artist.ddl.contains("ArtistId INTEGER NOT NULL"));
        assert!(artist.ddl.contains("Name VARCHAR"));
        assert_eq!(artist.sample.row_count(), SAMPLE_ROWS);
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("Artist"), "\"Artist\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
