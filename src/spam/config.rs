use crate::client::pow::MAX_POW_TARGET;
use crate::spam::SpamError;
use std::time::Duration;

/// Configuration shared by all spammers
#[derive(Clone, Debug)]
pub struct SpamConfig {
    /// Number of concurrent workers for faucet and data spam
    pub parallelism: usize,
    /// Leading zero bits required by the faucet's proof of work
    pub faucet_pow_target: u32,
    /// Pause between two requests of one worker (zero for none)
    pub request_sleep: Duration,
    /// Interval between two funding polls
    pub polling_interval: Duration,
    /// How long the conflict spammer waits for faucet funds
    pub funding_timeout: Duration,
    /// Native balance the funding address must reach before spending
    pub funding_threshold: u64,
    /// Seed index of the conflict spammer's funding address
    pub funding_index: u64,
    /// Per-worker iteration cap; `None` runs until interrupted
    pub iterations: Option<u64>,
}

impl SpamConfig {
    /// Create a new config with builder pattern
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_faucet_pow_target(mut self, target: u32) -> Self {
        self.faucet_pow_target = target;
        self
    }

    pub fn with_request_sleep(mut self, sleep: Duration) -> Self {
        self.request_sleep = sleep;
        self
    }

    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    pub fn with_funding_timeout(mut self, timeout: Duration) -> Self {
        self.funding_timeout = timeout;
        self
    }

    pub fn with_funding_threshold(mut self, threshold: u64) -> Self {
        self.funding_threshold = threshold;
        self
    }

    pub fn with_funding_index(mut self, index: u64) -> Self {
        self.funding_index = index;
        self
    }

    pub fn with_iterations(mut self, iterations: Option<u64>) -> Self {
        self.iterations = iterations;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SpamError> {
        if self.parallelism == 0 {
            return Err(SpamError::InvalidConfig(
                "parallelism must be > 0".to_string(),
            ));
        }
        if self.polling_interval.is_zero() {
            return Err(SpamError::InvalidConfig(
                "polling_interval must be > 0".to_string(),
            ));
        }
        if self.funding_timeout.is_zero() {
            return Err(SpamError::InvalidConfig(
                "funding_timeout must be > 0".to_string(),
            ));
        }
        if self.funding_threshold == 0 {
            return Err(SpamError::InvalidConfig(
                "funding_threshold must be > 0".to_string(),
            ));
        }
        if self.faucet_pow_target > MAX_POW_TARGET {
            return Err(SpamError::InvalidConfig(format!(
                "faucet_pow_target must be <= {MAX_POW_TARGET}"
            )));
        }
        Ok(())
    }

    /// Iteration indexes a worker runs through
    pub(crate) fn iteration_range(&self) -> impl Iterator<Item = u64> {
        let limit = self.iterations;
        (0u64..).take_while(move |i| limit.map_or(true, |limit| *i < limit))
    }
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            faucet_pow_target: 22,
            request_sleep: Duration::ZERO,
            polling_interval: Duration::from_secs(1),
            funding_timeout: Duration::from_secs(20),
            funding_threshold: 1_000_000,
            funding_index: 0,
            iterations: None,
        }
    }
}

/// Parse a duration such as `250ms`, `2s`, `1m`, `1h` or bare seconds (`5`, `0.5`)
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("duration cannot be empty".to_string());
    }

    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration number: {s}"))?;

    let seconds = match unit {
        "" | "s" => value,
        "ms" => value / 1_000.0,
        "m" => value * 60.0,
        "h" => value * 3_600.0,
        other => return Err(format!("unknown duration unit '{other}' in {s}")),
    };

    Duration::try_from_secs_f64(seconds).map_err(|e| format!("invalid duration {s}: {e}"))
}
