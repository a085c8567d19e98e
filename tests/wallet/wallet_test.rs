// Wallet Tests
// Refresh scanning, coin selection and submission against the mock client

use ledger_spammer::client::MockLedgerClient;
use ledger_spammer::identity::Seed;
use ledger_spammer::ledger::{Balances, Color, InclusionState, Output, OutputId, TransactionId};
use ledger_spammer::wallet::{Wallet, WalletError, WalletFacade, GAP_LIMIT};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn output(n: u8, seed: &Seed, index: u64, balances: Balances) -> Output {
    let id = OutputId::new(&TransactionId::from_bytes([n; 32]), 0);
    Output::new(id, seed.address(index), balances)
}

// ============================================================================
// REFRESH
// ============================================================================

#[tokio::test]
async fn test_refresh_collects_outputs_across_addresses() {
    let seed = Seed::generate();
    let client = Arc::new(
        MockLedgerClient::new()
            .with_outputs(
                seed.address(0),
                vec![output(1, &seed, 0, Balances::single(Color::NATIVE, 100))],
            )
            .with_outputs(
                seed.address(2),
                vec![output(2, &seed, 2, Balances::single(Color::NATIVE, 50))],
            ),
    );

    let mut wallet = Wallet::new(seed.clone(), client.clone());
    wallet.refresh(true).await.unwrap();

    assert_eq!(wallet.balance(&Color::NATIVE), 150);
    assert_eq!(wallet.unspent_outputs().len(), 2);
    assert_eq!(wallet.change_index(), 3);
    // indexes 0..=2 plus GAP_LIMIT empty addresses
    assert_eq!(client.total_outputs_calls() as u64, 3 + GAP_LIMIT);
}

#[tokio::test]
async fn test_refresh_skips_pending_unless_requested() {
    let seed = Seed::generate();
    let pending = output(1, &seed, 0, Balances::single(Color::NATIVE, 100)).with_confirmed(false);
    let client = Arc::new(MockLedgerClient::new().with_outputs(seed.address(0), vec![pending]));

    let mut wallet = Wallet::new(seed.clone(), client.clone());
    wallet.refresh(false).await.unwrap();
    assert_eq!(wallet.balance(&Color::NATIVE), 0);
    assert_eq!(wallet.change_index(), 0);

    wallet.refresh(true).await.unwrap();
    assert_eq!(wallet.balance(&Color::NATIVE), 100);
}

#[tokio::test]
async fn test_refresh_misses_outputs_past_gap_limit() {
    let seed = Seed::generate();
    let client = Arc::new(MockLedgerClient::new().with_outputs(
        seed.address(7),
        vec![output(1, &seed, 7, Balances::single(Color::NATIVE, 100))],
    ));

    let mut wallet = Wallet::new(seed.clone(), client.clone());
    wallet.refresh(true).await.unwrap();
    assert_eq!(wallet.balance(&Color::NATIVE), 0);

    let mut wallet = Wallet::new(seed, client).with_min_scan(7);
    wallet.refresh(true).await.unwrap();
    assert_eq!(wallet.balance(&Color::NATIVE), 100);
    assert_eq!(wallet.change_index(), 8);
}

#[tokio::test]
async fn test_two_wallets_on_one_seed_see_same_outputs() {
    let seed = Seed::generate();
    let client = Arc::new(MockLedgerClient::new().with_outputs(
        seed.address(0),
        vec![output(1, &seed, 0, Balances::single(Color::NATIVE, 100))],
    ));

    let mut a = Wallet::new(seed.clone(), client.clone());
    let mut b = Wallet::new(seed, client);
    a.refresh(true).await.unwrap();
    b.refresh(true).await.unwrap();

    assert_eq!(a.unspent_outputs(), b.unspent_outputs());
}

// ============================================================================
// SEND FUNDS
// ============================================================================

#[tokio::test]
async fn test_send_entire_balance_has_no_change() {
    let seed = Seed::generate();
    let destination = Seed::generate().address(0);
    let client = Arc::new(MockLedgerClient::new().with_outputs(
        seed.address(0),
        vec![output(1, &seed, 0, Balances::single(Color::NATIVE, 1_000))],
    ));

    let mut wallet = Wallet::new(seed.clone(), client.clone()).with_pledge_id("node");
    wallet.refresh(true).await.unwrap();
    let id = wallet
        .send_funds(&destination, 1_000, Color::NATIVE, false)
        .await
        .unwrap();

    let sent = client.transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].id().unwrap(), id);
    assert_eq!(sent[0].essence().outputs().len(), 1);
    assert_eq!(sent[0].essence().outputs()[0].address, destination);
    assert_eq!(sent[0].essence().access_pledge_id(), "node");
    assert!(sent[0].verify(&[seed.address(0)]));
    assert_eq!(wallet.balance(&Color::NATIVE), 0);
}

#[tokio::test]
async fn test_send_partial_returns_change_with_other_colors() {
    let seed = Seed::generate();
    let gold = Color::from_bytes([9u8; 32]);
    let destination = Seed::generate().address(0);
    let client = Arc::new(MockLedgerClient::new().with_outputs(
        seed.address(0),
        vec![output(1, &seed, 0, Balances::single(Color::NATIVE, 1_000).with(gold, 7))],
    ));

    let mut wallet = Wallet::new(seed.clone(), client.clone());
    wallet.refresh(true).await.unwrap();
    wallet
        .send_funds(&destination, 400, Color::NATIVE, false)
        .await
        .unwrap();

    let tx = &client.transactions()[0];
    let outputs = tx.essence().outputs();
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].balances.get(&Color::NATIVE), Some(400));
    assert_eq!(outputs[1].address, seed.address(1));
    assert_eq!(outputs[1].balances.get(&Color::NATIVE), Some(600));
    assert_eq!(outputs[1].balances.get(&gold), Some(7));
    assert_eq!(wallet.change_index(), 2);
}

#[tokio::test]
async fn test_send_ignores_outputs_without_color() {
    let seed = Seed::generate();
    let gold = Color::from_bytes([9u8; 32]);
    let client = Arc::new(
        MockLedgerClient::new()
            .with_outputs(seed.address(0), vec![output(1, &seed, 0, Balances::single(gold, 500))])
            .with_outputs(
                seed.address(1),
                vec![output(2, &seed, 1, Balances::single(Color::NATIVE, 300))],
            ),
    );

    let mut wallet = Wallet::new(seed.clone(), client.clone());
    wallet.refresh(true).await.unwrap();
    wallet
        .send_funds(&Seed::generate().address(0), 300, Color::NATIVE, false)
        .await
        .unwrap();

    let tx = &client.transactions()[0];
    assert_eq!(tx.essence().inputs().len(), 1);
    assert!(tx.verify(&[seed.address(1)]));
}

#[tokio::test]
async fn test_send_insufficient_balance() {
    let seed = Seed::generate();
    let client = Arc::new(MockLedgerClient::new().with_outputs(
        seed.address(0),
        vec![output(1, &seed, 0, Balances::single(Color::NATIVE, 10))],
    ));

    let mut wallet = Wallet::new(seed, client.clone());
    wallet.refresh(true).await.unwrap();
    let result = wallet
        .send_funds(&Seed::generate().address(0), 11, Color::NATIVE, false)
        .await;

    assert!(matches!(
        result,
        Err(WalletError::InsufficientBalance { available: 10, required: 11, .. })
    ));
    assert!(client.transactions().is_empty());
}

#[tokio::test]
async fn test_send_zero_amount() {
    let client = Arc::new(MockLedgerClient::new());
    let mut wallet = Wallet::new(Seed::generate(), client);
    let result = wallet
        .send_funds(&Seed::generate().address(0), 0, Color::NATIVE, false)
        .await;
    assert!(matches!(result, Err(WalletError::InvalidAmount)));
}

#[tokio::test]
async fn test_send_submission_failure_keeps_outputs() {
    let seed = Seed::generate();
    let client = Arc::new(
        MockLedgerClient::new()
            .with_submit_failure("conflict rejected")
            .with_outputs(
                seed.address(0),
                vec![output(1, &seed, 0, Balances::single(Color::NATIVE, 10))],
            ),
    );

    let mut wallet = Wallet::new(seed, client);
    wallet.refresh(true).await.unwrap();
    let result = wallet
        .send_funds(&Seed::generate().address(0), 10, Color::NATIVE, false)
        .await;

    assert!(matches!(result, Err(WalletError::Client(_))));
    assert_eq!(wallet.balance(&Color::NATIVE), 10);
}

#[tokio::test]
async fn test_send_waits_for_confirmation() {
    let seed = Seed::generate();
    let client = Arc::new(MockLedgerClient::new().with_outputs(
        seed.address(0),
        vec![output(1, &seed, 0, Balances::single(Color::NATIVE, 10))],
    ));

    let mut wallet = Wallet::new(seed, client);
    wallet.refresh(true).await.unwrap();
    let result = wallet
        .send_funds(&Seed::generate().address(0), 10, Color::NATIVE, true)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_send_reports_rejection_when_waiting() {
    let seed = Seed::generate();
    let client = Arc::new(
        MockLedgerClient::new()
            .with_inclusion_state(InclusionState::Rejected)
            .with_outputs(
                seed.address(0),
                vec![output(1, &seed, 0, Balances::single(Color::NATIVE, 10))],
            ),
    );

    let mut wallet = Wallet::new(seed, client);
    wallet.refresh(true).await.unwrap();
    let result = wallet
        .send_funds(&Seed::generate().address(0), 10, Color::NATIVE, true)
        .await;
    assert!(matches!(result, Err(WalletError::Rejected(_))));
}

#[tokio::test]
async fn test_send_confirmation_timeout() {
    let seed = Seed::generate();
    let client = Arc::new(
        MockLedgerClient::new()
            .with_inclusion_state(InclusionState::Pending)
            .with_outputs(
                seed.address(0),
                vec![output(1, &seed, 0, Balances::single(Color::NATIVE, 10))],
            ),
    );

    let mut wallet = Wallet::new(seed, client)
        .with_confirmation_polling(Duration::from_millis(5), Duration::from_millis(20));
    wallet.refresh(true).await.unwrap();
    let result = wallet
        .send_funds(&Seed::generate().address(0), 10, Color::NATIVE, true)
        .await;
    assert!(matches!(result, Err(WalletError::ConfirmationTimeout(_))));
}
