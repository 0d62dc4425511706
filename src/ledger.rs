//! Transfer Ledger
//!
//! Validates a transfer request, executes it as an atomic two-account
//! balance mutation, appends one audit record, and returns a receipt or
//! a typed failure.
//!
//! # Pipeline
//!
//! ```text
//! validate (amount, self, counterparty, role, balance)
//!     → apply_transfer (atomic, precondition re-checked in the store)
//!     → append audit record
//!     → receipt
//! ```
//!
//! Validation failures are terminal and mutate nothing. The one
//! deliberate asymmetry: if the audit append fails AFTER the balance
//! mutation committed, the transfer stays committed - balances are
//! authoritative - and the receipt reports the audit gap instead of
//! rolling back a successful funds movement.

use std::sync::Arc;

use crate::account::{AccountStore, Role};
use crate::core_types::{Points, TransactionId};
use crate::error::WalletError;
use crate::txlog::{NewTransaction, TransactionLog};

/// Whether the audit record for a committed transfer was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutcome {
    Recorded { transaction_id: TransactionId },
    /// Balances moved but the audit append failed. Success for balance
    /// purposes; a signal to alert an operator about the audit gap.
    Degraded,
}

impl LogOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, LogOutcome::Degraded)
    }
}

/// Result of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub acting_balance: Points,
    pub counterparty_balance: Points,
    pub log: LogOutcome,
}

pub struct TransferLedger {
    accounts: Arc<dyn AccountStore>,
    txlog: Arc<dyn TransactionLog>,
}

impl TransferLedger {
    pub fn new(accounts: Arc<dyn AccountStore>, txlog: Arc<dyn TransactionLog>) -> Self {
        Self { accounts, txlog }
    }

    /// Move `amount` points from the acting account to the scanned
    /// counterparty.
    ///
    /// Fail-fast validation order:
    /// 1. amount must be positive
    /// 2. counterparty must not be the acting account itself
    /// 3. counterparty must exist
    /// 4. counterparty must be a merchant
    /// 5. acting account must exist and cover the amount (advisory;
    ///    re-verified atomically inside the store at mutation time)
    async fn validate(
        &self,
        acting_account_id: &str,
        scanned_counterparty_id: &str,
        amount: Points,
    ) -> Result<(), WalletError> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount);
        }
        if scanned_counterparty_id == acting_account_id {
            return Err(WalletError::SelfTransfer);
        }

        let counterparty = self
            .accounts
            .get(scanned_counterparty_id)
            .await?
            .ok_or(WalletError::CounterpartyNotFound)?;
        if counterparty.role != Role::Merchant {
            return Err(WalletError::InvalidCounterpartyRole(counterparty.role));
        }

        // Fresh read, not a cached value: the balance may have changed
        // since the caller last saw it.
        let acting = self
            .accounts
            .get(acting_account_id)
            .await?
            .ok_or_else(|| WalletError::AccountNotFound(acting_account_id.to_string()))?;
        if acting.balance < amount {
            return Err(WalletError::InsufficientBalance);
        }

        Ok(())
    }

    pub async fn transfer(
        &self,
        acting_account_id: &str,
        scanned_counterparty_id: &str,
        amount: Points,
    ) -> Result<TransferReceipt, WalletError> {
        self.validate(acting_account_id, scanned_counterparty_id, amount)
            .await?;

        let applied = self
            .accounts
            .apply_transfer(acting_account_id, scanned_counterparty_id, amount)
            .await?;

        tracing::info!(
            from = acting_account_id,
            to = scanned_counterparty_id,
            amount,
            "transfer committed"
        );

        let log = match self
            .txlog
            .append(NewTransaction {
                from_account_id: acting_account_id.to_string(),
                to_account_id: scanned_counterparty_id.to_string(),
                amount,
            })
            .await
        {
            Ok(record) => LogOutcome::Recorded {
                transaction_id: record.id,
            },
            Err(e) => {
                // Committed but unaudited. Do not roll back.
                tracing::error!(
                    from = acting_account_id,
                    to = scanned_counterparty_id,
                    amount,
                    error = %e,
                    "audit append failed after balance mutation"
                );
                LogOutcome::Degraded
            }
        };

        Ok(TransferReceipt {
            acting_balance: applied.from_balance,
            counterparty_balance: applied.to_balance,
            log,
        })
    }
}

// ============================================================
// TESTS
// ============================================================
