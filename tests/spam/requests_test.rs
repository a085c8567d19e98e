// Request And Data Spammer Tests
// Faucet request loop, data message loop, error tolerance

use ledger_spammer::client::MockLedgerClient;
use ledger_spammer::identity::Seed;
use ledger_spammer::spam::{DataSpammer, RequestSpammer, SpamConfig, SpamError};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::Level;

/// In-memory log sink
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn bounded(iterations: u64) -> SpamConfig {
    SpamConfig::new()
        .with_faucet_pow_target(0)
        .with_iterations(Some(iterations))
}

// ============================================================================
// FAUCET REQUESTS
// ============================================================================

#[tokio::test]
async fn test_requests_use_fresh_seed_addresses() {
    let seed = Seed::generate();
    let client = Arc::new(MockLedgerClient::new().with_identity("node-1"));

    RequestSpammer::new(client.clone(), bounded(4).with_faucet_pow_target(5))
        .run_with_seed(0, seed.clone())
        .await
        .unwrap();

    let requests = client.faucet_requests();
    assert_eq!(requests.len(), 4);
    for (i, (address, pow_target, pledge_id)) in requests.iter().enumerate() {
        assert_eq!(*address, seed.address(i as u64));
        assert_eq!(*pow_target, 5);
        assert_eq!(pledge_id, "node-1");
    }

    let mut distinct: Vec<_> = requests.iter().map(|(a, _, _)| *a).collect();
    distinct.sort();
    distinct.dedup();
    assert_eq!(distinct.len(), 4);
    assert_eq!(client.info_calls(), 1, "identity is fetched once per worker");
}

#[tokio::test]
async fn test_faucet_errors_do_not_stop_the_loop() {
    let client = Arc::new(MockLedgerClient::new().with_faucet_failure("too many requests"));

    let result = RequestSpammer::new(client.clone(), bounded(3)).run(0).await;

    assert!(result.is_ok());
    assert_eq!(client.faucet_requests().len(), 3);
}

#[tokio::test]
async fn test_identity_failure_ends_request_worker() {
    let client = Arc::new(MockLedgerClient::new().with_info_failure("refused"));

    let result = RequestSpammer::new(client.clone(), bounded(3)).run(0).await;

    assert!(matches!(result, Err(SpamError::Setup(_))));
    assert!(client.faucet_requests().is_empty());
}

#[tokio::test]
async fn test_request_sleep_paces_worker() {
    let client = Arc::new(MockLedgerClient::new());
    let config = bounded(3).with_request_sleep(Duration::from_millis(20));

    let started = Instant::now();
    RequestSpammer::new(client.clone(), config).run(0).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(40));
    assert_eq!(client.faucet_requests().len(), 3);
}

// ============================================================================
// DATA MESSAGES
// ============================================================================

#[tokio::test]
async fn test_data_payloads_count_up_despite_failures() {
    let client = Arc::new(MockLedgerClient::new().with_data_failure_every(3));

    DataSpammer::new(client.clone(), bounded(7))
        .run(0)
        .await
        .unwrap();

    let payloads: Vec<String> = client
        .data_payloads()
        .into_iter()
        .map(|p| String::from_utf8(p).unwrap())
        .collect();
    let expected: Vec<String> = (0..7).map(|i: u64| i.to_string()).collect();
    assert_eq!(payloads, expected);
    assert_eq!(client.data_calls(), 7);
}

#[tokio::test]
async fn test_data_spammer_needs_no_node_identity() {
    let client = Arc::new(MockLedgerClient::new().with_info_failure("refused"));

    DataSpammer::new(client.clone(), bounded(2))
        .run(0)
        .await
        .unwrap();

    assert_eq!(client.info_calls(), 0);
    assert_eq!(client.data_calls(), 2);
}

#[tokio::test]
async fn test_zero_iterations_sends_nothing() {
    let client = Arc::new(MockLedgerClient::new());

    DataSpammer::new(client.clone(), bounded(0)).run(0).await.unwrap();
    RequestSpammer::new(client.clone(), bounded(0)).run(0).await.unwrap();

    assert_eq!(client.data_calls(), 0);
    assert!(client.faucet_requests().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn test_sent_messages_visible_at_info_level() {
    let capture = Capture::default();
    let sink = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_writer(move || sink.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let client = Arc::new(MockLedgerClient::new().with_data_failure_every(2));
    DataSpammer::new(client, bounded(2)).run(3).await.unwrap();

    let logs = capture.contents();
    assert!(logs.contains("sent msg"), "{logs}");
    assert!(logs.contains("unable to send message"), "{logs}");
}
