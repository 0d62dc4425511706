//! In-memory account store
//!
//! Authoritative balance state behind a single writer lock. Both the
//! debit and the credit of a transfer happen under one write guard, so
//! the pair is observed together or not at all, and the balance
//! precondition is re-checked at the moment of mutation. Two concurrent
//! transfers that would jointly overdraw an account can never both pass
//! the check.
//!
//! Critical sections are short and never cross an await point.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use std::sync::RwLock;

use super::models::{Account, NewAccount};
use super::store::{AccountStore, TransferApplied};
use crate::core_types::{AccountId, Points};
use crate::error::WalletError;

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<FxHashMap<AccountId, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts. Test/diagnostic helper.
    pub fn len(&self) -> usize {
        self.accounts.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> WalletError {
    WalletError::Storage("account map lock poisoned".to_string())
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn get(&self, id: &str) -> Result<Option<Account>, WalletError> {
        let accounts = self.accounts.read().map_err(|_| poisoned())?;
        Ok(accounts.get(id).cloned())
    }

    async fn create_if_absent(&self, new: NewAccount) -> Result<Account, WalletError> {
        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
        if let Some(existing) = accounts.get(&new.id) {
            return Ok(existing.clone());
        }
        let account = Account {
            id: new.id.clone(),
            role: new.role,
            balance: new.balance,
            version: 0,
            profile: new.profile,
            created_at: Utc::now(),
            last_login: None,
        };
        accounts.insert(new.id, account.clone());
        Ok(account)
    }

    async fn apply_transfer(
        &self,
        from: &str,
        to: &str,
        amount: Points,
    ) -> Result<TransferApplied, WalletError> {
        // Same-id transfer would alias the two lookups below.
        if from == to {
            return Err(WalletError::SelfTransfer);
        }

        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;

        let from_balance = accounts
            .get(from)
            .ok_or_else(|| WalletError::AccountNotFound(from.to_string()))?
            .balance;
        let to_balance = accounts
            .get(to)
            .ok_or_else(|| WalletError::AccountNotFound(to.to_string()))?
            .balance;

        // Precondition re-check at mutation time, under the write guard.
        let new_from = from_balance
            .checked_sub(amount)
            .ok_or(WalletError::InsufficientBalance)?;
        let new_to = to_balance
            .checked_add(amount)
            .ok_or_else(|| WalletError::Storage("credit overflow".to_string()))?;

        // Both checks passed - apply both writes before releasing the guard.
        if let Some(acc) = accounts.get_mut(from) {
            acc.balance = new_from;
            acc.version += 1;
        }
        if let Some(acc) = accounts.get_mut(to) {
            acc.balance = new_to;
            acc.version += 1;
        }

        Ok(TransferApplied {
            from_balance: new_from,
            to_balance: new_to,
        })
    }

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> Result<(), WalletError> {
        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
        if let Some(acc) = accounts.get_mut(id) {
            acc.last_login = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::models::{AccountProfile, Role};

    fn new_account(id: &str, role: Role, balance: Points) -> NewAccount {
        NewAccount {
            id: id.to_string(),
            role,
            balance,
            profile: AccountProfile::default(),
        }
    }

    #[tokio::test]
    async fn test_create_if_absent_is_idempotent() {
        let store = MemoryAccountStore::new();

        let first = store
            .create_if_absent(new_account("c1", Role::Customer, 500))
            .await
            .unwrap();
        assert_eq!(first.balance, 500);

        // Second call with a different role/balance must NOT overwrite.
        let second = store
            .create_if_absent(new_account("c1", Role::Merchant, 0))
            .await
            .unwrap();
        assert_eq!(second.role, Role::Customer);
        assert_eq!(second.balance, 500);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_apply_transfer_moves_both_balances() {
        let store = MemoryAccountStore::new();
        store
            .create_if_absent(new_account("c1", Role::Customer, 500))
            .await
            .unwrap();
        store
            .create_if_absent(new_account("m1", Role::Merchant, 0))
            .await
            .unwrap();

        let applied = store.apply_transfer("c1", "m1", 120).await.unwrap();
        assert_eq!(applied.from_balance, 380);
        assert_eq!(applied.to_balance, 120);

        let c1 = store.get("c1").await.unwrap().unwrap();
        let m1 = store.get("m1").await.unwrap().unwrap();
        assert_eq!(c1.balance, 380);
        assert_eq!(m1.balance, 120);
        assert_eq!(c1.version, 1);
        assert_eq!(m1.version, 1);
    }

    #[tokio::test]
    async fn test_apply_transfer_insufficient_mutates_nothing() {
        let store = MemoryAccountStore::new();
        store
            .create_if_absent(new_account("c1", Role::Customer, 500))
            .await
            .unwrap();
        store
            .create_if_absent(new_account("m1", Role::Merchant, 0))
            .await
            .unwrap();

        let err = store.apply_transfer("c1", "m1", 600).await.unwrap_err();
        assert_eq!(err, WalletError::InsufficientBalance);

        assert_eq!(store.get("c1").await.unwrap().unwrap().balance, 500);
        assert_eq!(store.get("m1").await.unwrap().unwrap().balance, 0);
    }

    #[tokio::test]
    async fn test_apply_transfer_unknown_account() {
        let store = MemoryAccountStore::new();
        store
            .create_if_absent(new_account("c1", Role::Customer, 500))
            .await
            .unwrap();

        let err = store.apply_transfer("c1", "ghost", 100).await.unwrap_err();
        assert_eq!(err, WalletError::AccountNotFound("ghost".to_string()));
        assert_eq!(store.get("c1").await.unwrap().unwrap().balance, 500);
    }

    #[tokio::test]
    async fn test_record_login_touches_timestamp_only() {
        let store = MemoryAccountStore::new();
        store
            .create_if_absent(new_account("c1", Role::Customer, 500))
            .await
            .unwrap();

        let at = Utc::now();
        store.record_login("c1", at).await.unwrap();

        let acc = store.get("c1").await.unwrap().unwrap();
        assert_eq!(acc.last_login, Some(at));
        assert_eq!(acc.balance, 500);
        assert_eq!(acc.version, 0);

        // Unknown id is a no-op, not an error.
        store.record_login("ghost", at).await.unwrap();
    }
}
