//! Wallet API handlers
//!
//! The gateway trusts the verified account identifiers it is handed -
//! authentication happens upstream. The scanned QR payload arrives
//! verbatim as `counterparty_id`; an unresolvable string surfaces as
//! `COUNTERPARTY_NOT_FOUND`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::state::AppState;
use crate::account::{Account, Role};
use crate::core_types::Points;
use crate::error::WalletError;
use crate::ledger::LogOutcome;
use crate::onboarding::IdentitySignal;
use crate::txlog::{TransactionRecord, TxSide};

const DEFAULT_HISTORY_LIMIT: usize = 50;
const MAX_HISTORY_LIMIT: usize = 200;

// ============================================================================
// API Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Verified id of the paying account.
    pub acting_account_id: String,
    /// Scanned QR payload, passed through verbatim.
    pub counterparty_id: String,
    /// Amount as string (rejects non-numeric input with a wallet error
    /// instead of a serde error).
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub acting_balance: Points,
    pub counterparty_balance: Points,
    /// Absent when the audit append failed after the transfer committed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub logging_degraded: bool,
}

#[derive(Debug, Deserialize)]
pub struct OnboardRequest {
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    /// Explicit role claim ("customer" / "merchant"), e.g. from a
    /// sign-in tab choice. Optional; the policy derives a role if
    /// absent.
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub account_id: String,
    /// "from", "to", or "either" (default).
    pub side: Option<String>,
    pub limit: Option<usize>,
    /// Restart cursor: only records strictly older than this.
    pub before: Option<DateTime<Utc>>,
}

/// API wrapper for standard response format
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            data: Some(data),
            msg: None,
        }
    }

    pub fn error(code: i32, msg: impl ToString) -> Self {
        Self {
            code,
            data: None,
            msg: Some(msg.to_string()),
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

pub mod error_codes {
    pub const INVALID_PARAMETER: i32 = -1001;
    pub const INVALID_AMOUNT: i32 = -1002;
    pub const SELF_TRANSFER: i32 = -1003;
    pub const COUNTERPARTY_NOT_FOUND: i32 = -2001;
    pub const INVALID_COUNTERPARTY_ROLE: i32 = -2002;
    pub const ACCOUNT_NOT_FOUND: i32 = -2003;
    pub const INSUFFICIENT_BALANCE: i32 = -2004;
    pub const ROLE_MISMATCH: i32 = -3001;
    pub const ONBOARDING_REJECTED: i32 = -3002;
    pub const STORAGE_ERROR: i32 = -5001;
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a points amount from its string form.
///
/// Points are whole and positive: anything non-numeric, fractional,
/// zero, or negative is invalid.
pub fn parse_points(s: &str) -> Result<Points, WalletError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(WalletError::InvalidAmount);
    }
    let amount: Points = s.parse().map_err(|_| WalletError::InvalidAmount)?;
    if amount == 0 {
        return Err(WalletError::InvalidAmount);
    }
    Ok(amount)
}

/// Map WalletError to (StatusCode, error_code, message)
fn map_error(e: &WalletError) -> (StatusCode, Json<ApiResponse<()>>) {
    let status =
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let code = match e {
        WalletError::InvalidAmount => error_codes::INVALID_AMOUNT,
        WalletError::SelfTransfer => error_codes::SELF_TRANSFER,
        WalletError::CounterpartyNotFound => error_codes::COUNTERPARTY_NOT_FOUND,
        WalletError::InvalidCounterpartyRole(_) => error_codes::INVALID_COUNTERPARTY_ROLE,
        WalletError::AccountNotFound(_) => error_codes::ACCOUNT_NOT_FOUND,
        WalletError::InsufficientBalance => error_codes::INSUFFICIENT_BALANCE,
        WalletError::RoleMismatch { .. } => error_codes::ROLE_MISMATCH,
        WalletError::OnboardingRejected(_) => error_codes::ONBOARDING_REJECTED,
        WalletError::Storage(_) => error_codes::STORAGE_ERROR,
    };

    (status, Json(ApiResponse::error(code, e)))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/transfer
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<ApiResponse<TransferResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    let amount = parse_points(&req.amount).map_err(|e| map_error(&e))?;

    let receipt = state
        .ledger
        .transfer(&req.acting_account_id, &req.counterparty_id, amount)
        .await
        .map_err(|e| map_error(&e))?;

    let (transaction_id, logging_degraded) = match receipt.log {
        LogOutcome::Recorded { transaction_id } => (Some(transaction_id), false),
        LogOutcome::Degraded => (None, true),
    };

    Ok(Json(ApiResponse::success(TransferResponse {
        acting_balance: receipt.acting_balance,
        counterparty_balance: receipt.counterparty_balance,
        transaction_id,
        logging_degraded,
    })))
}

/// POST /api/v1/onboard
pub async fn onboard(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OnboardRequest>,
) -> Result<Json<ApiResponse<Account>>, (StatusCode, Json<ApiResponse<()>>)> {
    let claimed_role = match req.role.as_deref() {
        None => None,
        Some(s) => Some(Role::parse(s).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    error_codes::INVALID_PARAMETER,
                    format!("Unknown role: {}. Use 'customer' or 'merchant'", s),
                )),
            )
        })?),
    };

    let signal = IdentitySignal {
        subject: req.subject,
        email: req.email,
        display_name: req.display_name,
        photo_url: req.photo_url,
    };

    let account = state
        .onboarding
        .resolve(signal, claimed_role)
        .await
        .map_err(|e| map_error(&e))?;

    Ok(Json(ApiResponse::success(account)))
}

/// GET /api/v1/history
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<TransactionRecord>>>, (StatusCode, Json<ApiResponse<()>>)> {
    let side = match query.side.as_deref() {
        None => TxSide::Either,
        Some(s) => TxSide::parse(s).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    error_codes::INVALID_PARAMETER,
                    format!("Unknown side: {}. Use 'from', 'to' or 'either'", s),
                )),
            )
        })?,
    };

    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);

    let records = state
        .txlog
        .list_for(&query.account_id, side, limit, query.before)
        .await
        .map_err(|e| map_error(&e))?;

    Ok(Json(ApiResponse::success(records)))
}

/// GET /api/v1/account/{id}
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Account>>, (StatusCode, Json<ApiResponse<()>>)> {
    let account = state
        .accounts
        .get(&id)
        .await
        .map_err(|e| map_error(&e))?
        .ok_or_else(|| map_error(&WalletError::AccountNotFound(id.clone())))?;

    Ok(Json(ApiResponse::success(account)))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_points() {
        assert_eq!(parse_points("120").unwrap(), 120);
        assert_eq!(parse_points(" 1 ").unwrap(), 1);

        assert!(parse_points("0").is_err());
        assert!(parse_points("").is_err());
        assert!(parse_points("-5").is_err());
        assert!(parse_points("12.5").is_err());
        assert!(parse_points("abc").is_err());
        assert!(parse_points("1e3").is_err());
    }

    #[test]
    fn test_map_error_codes() {
        let (status, body) = map_error(&WalletError::InsufficientBalance);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.code, error_codes::INSUFFICIENT_BALANCE);

        let (status, body) = map_error(&WalletError::CounterpartyNotFound);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, error_codes::COUNTERPARTY_NOT_FOUND);

        let (status, body) = map_error(&WalletError::SelfTransfer);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, error_codes::SELF_TRANSFER);
    }
}
