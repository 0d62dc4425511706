//! Account store contract
//!
//! The store owns all account state. `apply_transfer` is the ONLY
//! operation permitted to decrement one balance and increment another,
//! and it re-checks the debit precondition at mutation time under the
//! store's own synchronization - a balance check done earlier by the
//! caller is advisory only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{Account, NewAccount};
use crate::core_types::Points;
use crate::error::WalletError;

/// Balances after a committed transfer, as observed inside the atomic
/// mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferApplied {
    pub from_balance: Points,
    pub to_balance: Points,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Read one account. `None` means the id has never been onboarded.
    async fn get(&self, id: &str) -> Result<Option<Account>, WalletError>;

    /// Create the account if the id is unseen, otherwise return the
    /// existing record unchanged - no overwrite of role or balance.
    /// Atomic per id: concurrent first sign-ins converge on one record.
    async fn create_if_absent(&self, new: NewAccount) -> Result<Account, WalletError>;

    /// Atomically debit `from` and credit `to`.
    ///
    /// Either both updates are durably visible or neither is. Fails with
    /// `InsufficientBalance` if the debit precondition does not hold at
    /// the moment of mutation; returns immediately rather than retrying.
    async fn apply_transfer(
        &self,
        from: &str,
        to: &str,
        amount: Points,
    ) -> Result<TransferApplied, WalletError>;

    /// Record a sign-in timestamp. Touches `last_login` only - never
    /// role or balance. Unknown ids are a no-op.
    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), WalletError>;
}
