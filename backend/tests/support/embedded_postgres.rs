//! Embedded PostgreSQL databases for adapter tests.
//!
//! Every test gets a fresh database on the process-wide shared cluster with
//! the service migrations applied. Fixture rows go in over a plain `postgres`
//! client so Diesel's own transaction handling is not involved in setup.

use std::time::Duration;

use keyledger::outbound::persistence::run_pending_migrations;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};

use super::format_postgres_error;

const CLUSTER_RETRIES: usize = 5;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// The shared cluster, retried while a sibling test binary is still
/// bootstrapping it.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let mut attempt = 1;
    loop {
        match shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt < CLUSTER_RETRIES => {
                eprintln!("pg-embed: cluster attempt {attempt}/{CLUSTER_RETRIES} failed: {error:?}");
                std::thread::sleep(CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(error) => return Err(format!("shared cluster: {error:?}")),
        }
    }
}

/// A fresh, migrated database. Dropped with the returned guard.
pub fn provision_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let name = format!("keyledger_test_{}", uuid::Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(name.as_str())
        .map_err(|err| format!("create database: {err:?}"))?;
    run_pending_migrations(database.url()).map_err(|err| err.to_string())?;
    Ok(database)
}

/// Insert available keys as `(id, name, address)`.
pub fn seed_keys(url: &str, keys: &[(&str, &str, &str)]) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    for (id, name, address) in keys {
        client
            .execute(
                "INSERT INTO keys (bs_id, bs_name, bs_address) VALUES ($1, $2, $3)",
                &[id, name, address],
            )
            .map_err(|err| format_postgres_error(&err))?;
    }
    Ok(())
}

/// Number of ledger rows for `key_id`, open or closed.
pub fn count_loans(url: &str, key_id: &str) -> Result<i64, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one("SELECT COUNT(*) FROM borrow WHERE bs_id = $1", &[&key_id])
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get(0))
}

/// The persisted custody flag for `key_id`.
pub fn borrowed_flag(url: &str, key_id: &str) -> Result<bool, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one("SELECT borrow FROM keys WHERE bs_id = $1", &[&key_id])
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get(0))
}
