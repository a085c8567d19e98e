// Proof of Work Tests
// Faucet nonce search and verification

use ledger_spammer::client::pow::{self, PowError, MAX_POW_TARGET};
use ledger_spammer::identity::Seed;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_solved_nonce_meets_target() {
    let payload = pow::faucet_payload(&Seed::generate().address(0), "node-id");

    let nonce = pow::solve(&payload, 12).unwrap();
    assert!(pow::meets_target(&payload, nonce, 12));
}

#[test]
fn test_solve_returns_first_matching_nonce() {
    let payload = b"first match".to_vec();
    let nonce = pow::solve(&payload, 8).unwrap();

    for earlier in 0..nonce {
        assert!(!pow::meets_target(&payload, earlier, 8));
    }
}

#[test]
fn test_payload_binds_pledge_id() {
    let address = Seed::generate().address(0);
    assert_ne!(
        pow::faucet_payload(&address, "node-a"),
        pow::faucet_payload(&address, "node-b")
    );
}

#[test]
fn test_target_above_digest_size() {
    assert_eq!(
        pow::solve(b"x", MAX_POW_TARGET + 1),
        Err(PowError::TargetTooHigh(MAX_POW_TARGET + 1))
    );
}

#[test]
fn test_unreachable_target_rejected() {
    assert_eq!(MAX_POW_TARGET, 64);
    assert_eq!(pow::solve(b"x", 256), Err(PowError::TargetTooHigh(256)));
}

#[test]
fn test_cancelled_search_returns_promptly() {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    let search = std::thread::spawn(move || pow::solve_cancellable(b"x", MAX_POW_TARGET, &flag));

    std::thread::sleep(Duration::from_millis(20));
    cancel.store(true, Ordering::Relaxed);

    assert_eq!(search.join().unwrap(), Err(PowError::Cancelled));
}
