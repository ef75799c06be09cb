//! Pool limits under concurrent executions against an in-memory DuckDB.

use std::time::Duration;

use sql_chat::db::{ConnectParams, DatabaseHandle, PoolSettings};
use sql_chat::error::QueryExecutionError;

// Long enough to keep a pooled connection busy well past the acquire timeout
const SLOW_QUERY: &str = "SELECT sum(hash(a.range + b.range)) FROM range(30000) a, range(30000) b";

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_executions_beyond_pool_limit() {
    let settings = PoolSettings {
        pool_size: 1,
        max_overflow: 1,
        acquire_timeout: Duration::from_millis(50),
    };
    let handle = DatabaseHandle::connect(ConnectParams::duckdb(":memory:"), settings)
        .await
        .unwrap();

    let callers = settings.max_connections() as usize + 1;
    let tasks: Vec<_> = (0..callers)
        .map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move { handle.execute(SLOW_QUERY).await })
        })
        .collect();

    // Sample while the queries are still running
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(handle.open_connections() <= settings.max_connections());
    }

    let mut completed = 0;
    let mut timed_out = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(result) => {
                assert_eq!(result.row_count(), 1);
                completed += 1;
            }
            Err(QueryExecutionError::PoolTimeout(_)) => timed_out += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert!(timed_out >= 1);
    assert!(completed >= 1);
    assert_eq!(completed + timed_out, callers);
    assert!(handle.open_connections() <= settings.max_connections());
}

#[tokio::test]
async fn test_waiting_caller_gets_freed_connection() {
    let settings = PoolSettings {
        pool_size: 1,
        max_overflow: 0,
        acquire_timeout: Duration::from_secs(30),
    };
    let handle = DatabaseHandle::connect(ConnectParams::duckdb(":memory:"), settings)
        .await
        .unwrap();

    // Both callers share one connection; the second waits instead of failing
    let (first, second) = tokio::join!(
        handle.execute("SELECT count(*) AS n FROM range(1000000)"),
        handle.execute("SELECT 42 AS answer"),
    );

    assert_eq!(first.unwrap().rows[0], vec!["1000000"]);
    assert_eq!(second.unwrap().rows[0], vec!["42"]);
    assert!(handle.open_connections() <= 1);
}
