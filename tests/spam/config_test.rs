// Spam Config Tests
// Defaults, validation and duration parsing

use ledger_spammer::spam::{parse_duration, SpamConfig, SpamError};
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = SpamConfig::default();
    assert_eq!(config.parallelism, 4);
    assert_eq!(config.faucet_pow_target, 22);
    assert_eq!(config.request_sleep, Duration::ZERO);
    assert_eq!(config.polling_interval, Duration::from_secs(1));
    assert_eq!(config.funding_timeout, Duration::from_secs(20));
    assert_eq!(config.funding_threshold, 1_000_000);
    assert_eq!(config.funding_index, 0);
    assert_eq!(config.iterations, None);
    assert!(config.validate().is_ok());
}

#[test]
fn test_builder_sets_fields() {
    let config = SpamConfig::new()
        .with_parallelism(8)
        .with_faucet_pow_target(10)
        .with_request_sleep(Duration::from_millis(5))
        .with_funding_index(3)
        .with_iterations(Some(100));

    assert_eq!(config.parallelism, 8);
    assert_eq!(config.faucet_pow_target, 10);
    assert_eq!(config.request_sleep, Duration::from_millis(5));
    assert_eq!(config.funding_index, 3);
    assert_eq!(config.iterations, Some(100));
}

#[test]
fn test_validate_rejects_bad_values() {
    let invalid = [
        SpamConfig::new().with_parallelism(0),
        SpamConfig::new().with_polling_interval(Duration::ZERO),
        SpamConfig::new().with_funding_timeout(Duration::ZERO),
        SpamConfig::new().with_funding_threshold(0),
        SpamConfig::new().with_faucet_pow_target(65),
    ];

    for config in invalid {
        assert!(
            matches!(config.validate(), Err(SpamError::InvalidConfig(_))),
            "{config:?} should be rejected"
        );
    }
}

#[test]
fn test_zero_pow_target_is_valid() {
    assert!(SpamConfig::new().with_faucet_pow_target(0).validate().is_ok());
    assert!(SpamConfig::new().with_faucet_pow_target(64).validate().is_ok());
}

#[test]
fn test_parse_duration_units() {
    assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
    assert_eq!(parse_duration("2s"), Ok(Duration::from_secs(2)));
    assert_eq!(parse_duration("5"), Ok(Duration::from_secs(5)));
    assert_eq!(parse_duration("0.5"), Ok(Duration::from_millis(500)));
    assert_eq!(parse_duration("1m"), Ok(Duration::from_secs(60)));
    assert_eq!(parse_duration("1.5m"), Ok(Duration::from_secs(90)));
    assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3_600)));
    assert_eq!(parse_duration(" 3s "), Ok(Duration::from_secs(3)));
}

#[test]
fn test_parse_duration_rejects_garbage() {
    for input in ["", "   ", "s", "5x", "abc", "-1s", "1.2.3s"] {
        assert!(parse_duration(input).is_err(), "{input:?} should not parse");
    }
}
