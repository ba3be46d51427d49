//! Debouncing on the tokio timer.
#![cfg(feature = "tokio")]

use std::sync::Arc;
use std::time::Duration;

use nexus_table::{mock_users, MemoryStore, TableConfig, TableQuery, TokioScheduler};

#[tokio::test(start_paused = true)]
async fn search_settles_on_tokio_timer() {
    let mut table = TableQuery::new(
        mock_users(100),
        TableConfig::default(),
        Arc::new(MemoryStore::new()),
        Arc::new(TokioScheduler::current()),
    );

    table.set_search_term("user 7");
    tokio::time::sleep(Duration::from_millis(150)).await;
    table.set_search_term("user 9");
    tokio::time::sleep(Duration::from_millis(299)).await;
    assert_eq!(table.debounced_search_term(), "");

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(table.debounced_search_term(), "user 9");
    assert_eq!(table.total(), 11);
}

#[tokio::test(start_paused = true)]
async fn close_cancels_tokio_timer() {
    let mut table = TableQuery::new(
        mock_users(10),
        TableConfig::default(),
        Arc::new(MemoryStore::new()),
        Arc::new(TokioScheduler::current()),
    );

    table.set_search_term("user 1");
    table.close();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(table.debounced_search_term(), "");
}
