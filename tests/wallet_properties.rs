//! End-to-end wallet properties: conservation, no-overdraft under
//! concurrency, audit-log reconstructibility, onboarding idempotence.

use std::collections::HashMap;
use std::sync::Arc;

use pointpay::account::{AccountProfile, AccountStore, MemoryAccountStore, NewAccount, Role};
use pointpay::ledger::TransferLedger;
use pointpay::onboarding::{IdentitySignal, OnboardingConfig, OnboardingService};
use pointpay::txlog::{MemoryTransactionLog, TransactionLog, TxSide};
use pointpay::{Points, WalletError};

use futures::future::join_all;
use rand::Rng;

async fn seed_account(
    store: &MemoryAccountStore,
    id: &str,
    role: Role,
    balance: Points,
) {
    store
        .create_if_absent(NewAccount {
            id: id.to_string(),
            role,
            balance,
            profile: AccountProfile::default(),
        })
        .await
        .expect("seed account");
}

fn wallet() -> (Arc<MemoryAccountStore>, Arc<MemoryTransactionLog>, Arc<TransferLedger>) {
    let accounts = Arc::new(MemoryAccountStore::new());
    let txlog = Arc::new(MemoryTransactionLog::new());
    let ledger = Arc::new(TransferLedger::new(accounts.clone(), txlog.clone()));
    (accounts, txlog, ledger)
}

#[tokio::test]
async fn worked_example_customer_pays_merchant() {
    let (accounts, txlog, ledger) = wallet();
    seed_account(&accounts, "c1", Role::Customer, 500).await;
    seed_account(&accounts, "m1", Role::Merchant, 0).await;

    let receipt = ledger.transfer("c1", "m1", 120).await.expect("transfer");
    assert_eq!(receipt.acting_balance, 380);
    assert_eq!(receipt.counterparty_balance, 120);

    let history = txlog.list_for("m1", TxSide::To, 10, None).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].from_account_id, "c1");
    assert_eq!(history[0].to_account_id, "m1");
    assert_eq!(history[0].amount, 120);
}

/// Two racing transfers that would jointly overdraw the account: at
/// most one may commit.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_overdraw_commits_exactly_once() {
    for _ in 0..50 {
        let (accounts, txlog, ledger) = wallet();
        seed_account(&accounts, "c1", Role::Customer, 500).await;
        seed_account(&accounts, "m1", Role::Merchant, 0).await;

        let a = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.transfer("c1", "m1", 300).await }
        });
        let b = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.transfer("c1", "m1", 300).await }
        });

        let results = [a.await.expect("join"), b.await.expect("join")];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let insufficient = results
            .iter()
            .filter(|r| matches!(r, Err(WalletError::InsufficientBalance)))
            .count();

        assert_eq!(successes, 1, "exactly one of two racing transfers commits");
        assert_eq!(insufficient, 1);

        let c1 = accounts.get("c1").await.expect("get").expect("c1").balance;
        let m1 = accounts.get("m1").await.expect("get").expect("m1").balance;
        assert_eq!(c1, 200);
        assert_eq!(m1, 300);
        assert_eq!(txlog.len(), 1);
    }
}

/// Two racing transfers that both fit the balance both commit.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_affordable_transfers_both_commit() {
    let (accounts, _txlog, ledger) = wallet();
    seed_account(&accounts, "c1", Role::Customer, 500).await;
    seed_account(&accounts, "m1", Role::Merchant, 0).await;

    let a = tokio::spawn({
        let ledger = ledger.clone();
        async move { ledger.transfer("c1", "m1", 200).await }
    });
    let b = tokio::spawn({
        let ledger = ledger.clone();
        async move { ledger.transfer("c1", "m1", 200).await }
    });

    a.await.expect("join").expect("first transfer");
    b.await.expect("join").expect("second transfer");

    assert_eq!(accounts.get("c1").await.expect("get").expect("c1").balance, 100);
    assert_eq!(accounts.get("m1").await.expect("get").expect("m1").balance, 400);
}

/// Randomized concurrent stress: balances stay non-negative, the total
/// supply is conserved, and replaying the audit log from the initial
/// snapshot reproduces every final balance.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn randomized_concurrent_stress_conserves_points() {
    const CUSTOMERS: usize = 4;
    const MERCHANTS: usize = 3;
    const TASKS: usize = 40;
    const TRANSFERS_PER_TASK: usize = 5;
    const INITIAL: Points = 1_000;

    let (accounts, txlog, ledger) = wallet();

    let mut initial: HashMap<String, Points> = HashMap::new();
    for i in 0..CUSTOMERS {
        let id = format!("c{i}");
        seed_account(&accounts, &id, Role::Customer, INITIAL).await;
        initial.insert(id, INITIAL);
    }
    for i in 0..MERCHANTS {
        let id = format!("m{i}");
        seed_account(&accounts, &id, Role::Merchant, 0).await;
        initial.insert(id, 0);
    }
    let supply: Points = INITIAL * CUSTOMERS as Points;

    let mut handles = Vec::with_capacity(TASKS);
    for _ in 0..TASKS {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            let mut committed = 0usize;
            for _ in 0..TRANSFERS_PER_TASK {
                let (from, to, amount) = {
                    let mut rng = rand::thread_rng();
                    (
                        format!("c{}", rng.gen_range(0..CUSTOMERS)),
                        format!("m{}", rng.gen_range(0..MERCHANTS)),
                        rng.gen_range(1..=100u64),
                    )
                };
                match ledger.transfer(&from, &to, amount).await {
                    Ok(_) => committed += 1,
                    Err(WalletError::InsufficientBalance) => {}
                    Err(e) => panic!("unexpected transfer error: {e}"),
                }
            }
            committed
        }));
    }

    let committed: usize = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.expect("join"))
        .sum();

    // Every committed transfer produced exactly one audit record.
    assert_eq!(txlog.len(), committed);

    // Conservation: no points created or destroyed.
    let mut total: Points = 0;
    for id in initial.keys() {
        total += accounts.get(id).await.expect("get").expect("account").balance;
    }
    assert_eq!(total, supply);

    // Replaying the log from the initial snapshot reproduces balances.
    let mut replayed = initial.clone();
    for id in initial.keys() {
        for record in txlog
            .list_for(id, TxSide::From, usize::MAX, None)
            .await
            .expect("list")
        {
            *replayed.entry(record.from_account_id.clone()).or_default() -= record.amount;
            *replayed.entry(record.to_account_id.clone()).or_default() += record.amount;
        }
    }
    for (id, expected) in replayed {
        let actual = accounts.get(&id).await.expect("get").expect("account").balance;
        assert_eq!(actual, expected, "replayed balance mismatch for {id}");
    }
}

/// Concurrent first-sign-ins for one identity converge on one record.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_onboarding_is_idempotent() {
    let store = Arc::new(MemoryAccountStore::new());
    let service = Arc::new(OnboardingService::new(
        OnboardingConfig::default(),
        store.clone(),
    ));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .resolve(
                    IdentitySignal {
                        subject: "u1".to_string(),
                        email: Some("u1@campus.edu".to_string()),
                        display_name: None,
                        photo_url: None,
                    },
                    None,
                )
                .await
        }));
    }

    for result in join_all(handles).await {
        let account = result.expect("join").expect("resolve");
        assert_eq!(account.id, "u1");
        assert_eq!(account.role, Role::Customer);
        assert_eq!(account.balance, 500);
    }
    assert_eq!(store.len(), 1);
}
