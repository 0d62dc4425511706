//! Wallet Error Types
//!
//! Every rejected precondition maps to exactly one named error kind.
//! Error codes are stable strings used in API responses.

use thiserror::Error;

use crate::account::Role;

/// Wallet error types
///
/// Validation failures are reported synchronously with no side effects
/// performed. `Storage` is the backing store's failure domain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    // === Transfer validation errors ===
    #[error("Amount must be a positive whole number of points")]
    InvalidAmount,

    #[error("Cannot transfer points to your own account")]
    SelfTransfer,

    #[error("Scanned account does not exist")]
    CounterpartyNotFound,

    #[error("Transfers can only go to a merchant account, not a {0} account")]
    InvalidCounterpartyRole(Role),

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    // === Onboarding errors ===
    #[error("Account is registered as {stored}, cannot sign in as {claimed}")]
    RoleMismatch { stored: Role, claimed: Role },

    #[error("Sign-in rejected: {0}")]
    OnboardingRejected(String),

    // === System errors ===
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WalletError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::InvalidAmount => "INVALID_AMOUNT",
            WalletError::SelfTransfer => "SELF_TRANSFER",
            WalletError::CounterpartyNotFound => "COUNTERPARTY_NOT_FOUND",
            WalletError::InvalidCounterpartyRole(_) => "INVALID_COUNTERPARTY_ROLE",
            WalletError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            WalletError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            WalletError::RoleMismatch { .. } => "ROLE_MISMATCH",
            WalletError::OnboardingRejected(_) => "ONBOARDING_REJECTED",
            WalletError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            WalletError::InvalidAmount | WalletError::SelfTransfer => 400,
            WalletError::CounterpartyNotFound | WalletError::AccountNotFound(_) => 404,
            WalletError::InvalidCounterpartyRole(_) | WalletError::InsufficientBalance => 422,
            WalletError::RoleMismatch { .. } => 409,
            WalletError::OnboardingRejected(_) => 403,
            WalletError::Storage(_) => 500,
        }
    }
}

impl From<sqlx::Error> for WalletError {
    fn from(e: sqlx::Error) -> Self {
        WalletError::Storage(e.to_string())
    }
}
