//! In-memory transaction log
//!
//! A single vector behind a mutex. Appends clamp the timestamp against
//! the previous one, so `created_at` never decreases even if the wall
//! clock steps backwards between appends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use ulid::Ulid;

use super::{NewTransaction, TransactionLog, TransactionRecord, TxSide};
use crate::error::WalletError;

#[derive(Default)]
struct LogInner {
    records: Vec<TransactionRecord>,
    last_ts: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct MemoryTransactionLog {
    inner: Mutex<LogInner>,
}

impl MemoryTransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records ever appended. Test/diagnostic helper.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|g| g.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> WalletError {
    WalletError::Storage("transaction log lock poisoned".to_string())
}

#[async_trait]
impl TransactionLog for MemoryTransactionLog {
    async fn append(&self, tx: NewTransaction) -> Result<TransactionRecord, WalletError> {
        let mut inner = self.inner.lock().map_err(|_| poisoned())?;

        let mut now = Utc::now();
        if let Some(last) = inner.last_ts {
            if now < last {
                now = last;
            }
        }

        let record = TransactionRecord {
            id: Ulid::new().to_string(),
            from_account_id: tx.from_account_id,
            to_account_id: tx.to_account_id,
            amount: tx.amount,
            created_at: now,
        };
        inner.last_ts = Some(now);
        inner.records.push(record.clone());
        Ok(record)
    }

    async fn list_for(
        &self,
        account_id: &str,
        side: TxSide,
        limit: usize,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<TransactionRecord>, WalletError> {
        let inner = self.inner.lock().map_err(|_| poisoned())?;

        // Insertion order is append order, so newest-first is a reverse
        // scan; ties on created_at keep later appends first.
        let records = inner
            .records
            .iter()
            .rev()
            .filter(|r| side.matches(account_id, r))
            .filter(|r| before.map(|b| r.created_at < b).unwrap_or(true))
            .take(limit)
            .cloned()
            .collect();
        Ok(records)
    }
}
