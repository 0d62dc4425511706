//! Transaction log module
//!
//! Append-only, insertion-ordered record of completed transfers,
//! queryable by either participant. Records are immutable once
//! appended: replaying the log from a snapshot reproduces balances.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core_types::{AccountId, Points, TransactionId};
use crate::error::WalletError;

pub use memory::MemoryTransactionLog;
pub use pg::PgTransactionLog;

/// A completed transfer, as stored. `amount` equals the balance delta
/// applied to both participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Points,
    pub created_at: DateTime<Utc>,
}

/// Input to `append`. Id and timestamp are assigned by the log.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: Points,
}

/// Which side of a transfer an account must be on to match a history
/// query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxSide {
    From,
    To,
    Either,
}

impl TxSide {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "from" => Some(TxSide::From),
            "to" => Some(TxSide::To),
            "either" => Some(TxSide::Either),
            _ => None,
        }
    }

    fn matches(&self, account_id: &str, record: &TransactionRecord) -> bool {
        match self {
            TxSide::From => record.from_account_id == account_id,
            TxSide::To => record.to_account_id == account_id,
            TxSide::Either => {
                record.from_account_id == account_id || record.to_account_id == account_id
            }
        }
    }
}

#[async_trait]
pub trait TransactionLog: Send + Sync {
    /// Assign id and timestamp, persist, return the stored record.
    /// Timestamps are monotonically non-decreasing per log instance.
    async fn append(&self, tx: NewTransaction) -> Result<TransactionRecord, WalletError>;

    /// List records involving `account_id`, newest first.
    ///
    /// The result is one chunk of at most `limit` records; passing the
    /// oldest returned `created_at` as `before` restarts the sequence
    /// from where the previous chunk stopped. No caller may assume the
    /// full history fits one chunk.
    async fn list_for(
        &self,
        account_id: &str,
        side: TxSide,
        limit: usize,
        before: Option<DateTime<Utc>>,
    ) -> Result<Vec<TransactionRecord>, WalletError>;
}
