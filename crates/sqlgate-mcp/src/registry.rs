//! Open-transaction registry.
//!
//! Each open transaction pins one connection checked out of the pool for
//! its whole lifetime; pool connections don't preserve session state across
//! checkouts, so a transaction must never hop connections. Commit and
//! rollback drop the pinned connection back into the pool.

use sqlgate::pool::{OwnedTds, TdsPool, get_owned};
use sqlgate::{GateError, GateResult, QueryOutput, Statement, tx};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

pub struct TransactionRegistry {
    sessions: Mutex<HashMap<String, OwnedTds>>,
    counter: AtomicU64,
}

impl TransactionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Begin a transaction on a freshly pinned connection and return its id.
    pub async fn begin(&self, pool: &TdsPool) -> GateResult<String> {
        let mut conn = get_owned(pool).await?;
        tx::begin().execute(&mut *conn).await?;

        let id = format!("tx-{}", self.counter.fetch_add(1, Ordering::Relaxed) + 1);
        self.sessions.lock().await.insert(id.clone(), conn);
        tracing::debug!(transaction = %id, "transaction started");
        Ok(id)
    }

    /// Commit and release the pinned connection.
    pub async fn commit(&self, id: &str) -> GateResult<()> {
        let mut conn = self.take(id).await?;
        tx::commit().execute(&mut *conn).await?;
        tracing::debug!(transaction = %id, "transaction committed");
        Ok(())
    }

    /// Roll back and release the pinned connection.
    pub async fn rollback(&self, id: &str) -> GateResult<()> {
        let mut conn = self.take(id).await?;
        tx::rollback().execute(&mut *conn).await?;
        tracing::debug!(transaction = %id, "transaction rolled back");
        Ok(())
    }

    /// Create a savepoint inside an open transaction.
    pub async fn savepoint(&self, id: &str, name: &str) -> GateResult<()> {
        self.execute_in(id, &tx::savepoint(name)?).await.map(|_| ())
    }

    /// Roll back to a savepoint, keeping the transaction open.
    pub async fn rollback_to_savepoint(&self, id: &str, name: &str) -> GateResult<()> {
        self.execute_in(id, &tx::rollback_to_savepoint(name)?)
            .await
            .map(|_| ())
    }

    /// Run a row-returning statement on the transaction's connection.
    pub async fn fetch_in(&self, id: &str, stmt: &Statement) -> GateResult<QueryOutput> {
        let mut sessions = self.sessions.lock().await;
        let conn = sessions
            .get_mut(id)
            .ok_or_else(|| unknown_transaction(id))?;
        stmt.fetch(&mut **conn).await
    }

    /// Run a mutation on the transaction's connection.
    pub async fn execute_in(&self, id: &str, stmt: &Statement) -> GateResult<u64> {
        let mut sessions = self.sessions.lock().await;
        let conn = sessions
            .get_mut(id)
            .ok_or_else(|| unknown_transaction(id))?;
        stmt.execute(&mut **conn).await
    }

    async fn take(&self, id: &str) -> GateResult<OwnedTds> {
        self.sessions
            .lock()
            .await
            .remove(id)
            .ok_or_else(|| unknown_transaction(id))
    }
}

impl Default for TransactionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn unknown_transaction(id: &str) -> GateError {
    GateError::not_found(format!(
        "Unknown transaction id '{id}' (begin_transaction returns a valid id)"
    ))
}
