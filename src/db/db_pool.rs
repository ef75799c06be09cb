use duckdb::Connection;
use r2d2::ManageConnection;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::db::handle::ConnectParams;

/// r2d2 manager for MySQL, one TCP connection per pooled slot.
pub struct MySqlConnectionManager {
    opts: mysql::Opts,
}

impl MySqlConnectionManager {
    pub fn new(params: &ConnectParams, connect_timeout: Duration) -> Self {
        let opts = mysql::OptsBuilder::new()
            .ip_or_hostname(Some(params.host.clone()))
            .tcp_port(params.port)
            .user(Some(params.user.clone()))
            .pass(Some(params.password.clone()))
            .db_name(Some(params.database.clone()))
            .tcp_connect_timeout(Some(connect_timeout));

        Self { opts: opts.into() }
    }
}

impl ManageConnection for MySqlConnectionManager {
    type Connection = mysql::Conn;
    type Error = mysql::Error;

    fn connect(&self) -> Result<Self::Connection, Self::Error> {
        mysql::Conn::new(self.opts.clone())
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        use mysql::prelude::Queryable;
        conn.query_drop("SELECT 1")
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

/// r2d2 manager for DuckDB. Every pooled connection is a clone of one base
/// connection, so they all see the same database (including `:memory:`).
pub struct DuckDbConnectionManager {
    base: Mutex<Connection>,
}

impl DuckDbConnectionManager {
    pub fn open(database: &str) -> Result<Self, duckdb::Error> {
        let base = if database.is_empty() || database == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(database)?
        };

        Ok(Self {
            base: Mutex::new(base),
        })
    }
}

impl ManageConnection for DuckDbConnectionManager {
    type Connection = Connection;
    type Error = duckdb::Error;

    fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let base = self.base.lock().unwrap_or_else(PoisonError::into_inner);
        base.try_clone()
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        conn.execute_batch("SELECT 1")
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duckdb_clones_share_database() {
        let manager = DuckDbConnectionManager::open(":memory:").unwrap();
        let first = manager.connect().unwrap();
        first
            .execute_batch("CREATE TABLE Artist (Name VARCHAR); INSERT INTO Artist VALUES ('AC/DC');")
            .unwrap();

        let mut second = manager.connect().unwrap();
        assert!(manager.is_valid(&mut second).is_ok());
        let name: String = second
            .query_row("SELECT Name FROM Artist", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "AC/DC");
    }
}
