//! Shared gateway state

use std::sync::Arc;

use crate::account::AccountStore;
use crate::ledger::TransferLedger;
use crate::onboarding::{OnboardingConfig, OnboardingService};
use crate::txlog::TransactionLog;

/// Everything the handlers need, behind one `Arc`.
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub txlog: Arc<dyn TransactionLog>,
    pub ledger: TransferLedger,
    pub onboarding: OnboardingService,
}

impl AppState {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        txlog: Arc<dyn TransactionLog>,
        onboarding_config: OnboardingConfig,
    ) -> Self {
        Self {
            ledger: TransferLedger::new(accounts.clone(), txlog.clone()),
            onboarding: OnboardingService::new(onboarding_config, accounts.clone()),
            accounts,
            txlog,
        }
    }
}
