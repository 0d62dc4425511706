//! Data models for wallet accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core_types::{AccountId, Points};

/// Account role
///
/// Immutable once first assigned. A customer may transfer only to a
/// merchant, never to another customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Merchant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Merchant => "merchant",
        }
    }

    /// Parse from the stored string form. Unknown strings are rejected
    /// rather than defaulted - a bad role column is data corruption.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Role::Customer),
            "merchant" => Some(Role::Merchant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity metadata captured at sign-in. All fields optional - the
/// identity provider may not supply them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

/// A wallet account
///
/// # Invariants:
/// - `balance` is never negative (enforced by type and checked arithmetic)
/// - `role` never changes after creation
/// - `version` increments on every balance mutation
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub role: Role,
    pub balance: Points,
    /// Mutation counter, bumped by every balance write.
    pub version: u64,
    #[serde(flatten)]
    pub profile: AccountProfile,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Initial record for a never-seen identity. Role and starting balance
/// come from the onboarding policy, never from the caller directly.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: AccountId,
    pub role: Role,
    pub balance: Points,
    pub profile: AccountProfile,
}
