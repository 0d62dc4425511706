//! Onboarding Policy
//!
//! Decides initial role and starting balance for a never-seen account
//! identifier. The decision function is pure; the service wrapper
//! drives the store's create-if-absent and enforces that a stored role
//! is authoritative over any later claim.
//!
//! The rule set is configuration, not code baked into the ledger: the
//! role mapping and starting balances can evolve without touching the
//! transfer path.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::account::{Account, AccountProfile, AccountStore, NewAccount, Role};
use crate::core_types::Points;
use crate::error::WalletError;

// ============================================================
// POLICY CONFIGURATION
// ============================================================

fn default_customer_balance() -> Points {
    500
}

fn default_merchant_prefix() -> String {
    "stall.".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingConfig {
    /// Starting balance for a new customer account.
    #[serde(default = "default_customer_balance")]
    pub customer_initial_balance: Points,
    /// Starting balance for a new merchant account.
    #[serde(default)]
    pub merchant_initial_balance: Points,
    /// If set, sign-ins must present an email under this domain.
    #[serde(default)]
    pub allowed_email_domain: Option<String>,
    /// Email local-part prefix that marks a merchant account when no
    /// role is claimed explicitly.
    #[serde(default = "default_merchant_prefix")]
    pub merchant_email_prefix: String,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            customer_initial_balance: default_customer_balance(),
            merchant_initial_balance: 0,
            allowed_email_domain: None,
            merchant_email_prefix: default_merchant_prefix(),
        }
    }
}

// ============================================================
// IDENTITY SIGNAL AND DECISION
// ============================================================

/// What the identity collaborator hands us after verifying a sign-in.
/// `subject` is the provider's stable account identifier; the rest is
/// whatever profile data the provider exposes.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySignal {
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleDecision {
    pub role: Role,
    pub initial_balance: Points,
}

pub struct OnboardingPolicy {
    config: OnboardingConfig,
}

impl OnboardingPolicy {
    pub fn new(config: OnboardingConfig) -> Self {
        Self { config }
    }

    /// Map a verified identity signal to a role and starting balance.
    ///
    /// An explicit claim wins over derivation; with no claim, the role
    /// is derived from the email convention. Applies only to accounts
    /// that do not exist yet - for existing accounts the stored role is
    /// authoritative.
    pub fn decide(
        &self,
        signal: &IdentitySignal,
        claimed_role: Option<Role>,
    ) -> Result<RoleDecision, WalletError> {
        if let Some(domain) = &self.config.allowed_email_domain {
            let email = signal.email.as_deref().ok_or_else(|| {
                WalletError::OnboardingRejected(format!("an @{domain} email is required"))
            })?;
            if !email.ends_with(&format!("@{domain}")) {
                return Err(WalletError::OnboardingRejected(format!(
                    "only @{domain} accounts can sign in"
                )));
            }
        }

        let role = match claimed_role {
            Some(role) => role,
            None => self.derive_role(signal.email.as_deref()),
        };

        let initial_balance = match role {
            Role::Customer => self.config.customer_initial_balance,
            Role::Merchant => self.config.merchant_initial_balance,
        };

        Ok(RoleDecision {
            role,
            initial_balance,
        })
    }

    fn derive_role(&self, email: Option<&str>) -> Role {
        match email {
            Some(e) if e.starts_with(&self.config.merchant_email_prefix) => Role::Merchant,
            _ => Role::Customer,
        }
    }
}

// ============================================================
// SERVICE
// ============================================================

pub struct OnboardingService {
    policy: OnboardingPolicy,
    accounts: Arc<dyn AccountStore>,
}

impl OnboardingService {
    pub fn new(config: OnboardingConfig, accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            policy: OnboardingPolicy::new(config),
            accounts,
        }
    }

    /// Resolve a verified sign-in to an account, creating it on first
    /// contact. Idempotent: repeated calls for one identity converge on
    /// one record with the initial role and balance written exactly
    /// once.
    pub async fn resolve(
        &self,
        signal: IdentitySignal,
        claimed_role: Option<Role>,
    ) -> Result<Account, WalletError> {
        let decision = self.policy.decide(&signal, claimed_role)?;

        let account = self
            .accounts
            .create_if_absent(NewAccount {
                id: signal.subject.clone(),
                role: decision.role,
                balance: decision.initial_balance,
                profile: AccountProfile {
                    display_name: signal.display_name,
                    email: signal.email,
                    photo_url: signal.photo_url,
                },
            })
            .await?;

        // The stored role is authoritative. An explicit claim that
        // disagrees is rejected; a derived disagreement defers to the
        // stored role.
        if let Some(claimed) = claimed_role {
            if account.role != claimed {
                return Err(WalletError::RoleMismatch {
                    stored: account.role,
                    claimed,
                });
            }
        } else if account.role != decision.role {
            tracing::warn!(
                account_id = %account.id,
                stored = %account.role,
                derived = %decision.role,
                "derived role disagrees with stored role; keeping stored"
            );
        }

        self.accounts.record_login(&account.id, Utc::now()).await?;

        tracing::info!(account_id = %account.id, role = %account.role, "sign-in resolved");
        Ok(self.accounts.get(&account.id).await?.unwrap_or(account))
    }
}

// ============================================================
// TESTS
// ============================================================
