// Funding waiter - polls an address until it holds enough of one color

use crate::client::LedgerClient;
use crate::identity::Address;
use crate::ledger::{sum_color, Color};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// What to wait for: `min_amount` of the tracked color on `address` before `deadline`
#[derive(Clone, Debug)]
pub struct FundingTarget {
    pub address: Address,
    pub min_amount: u64,
    pub deadline: Instant,
}

impl FundingTarget {
    pub fn new(address: Address, min_amount: u64, deadline: Instant) -> Self {
        Self {
            address,
            min_amount,
            deadline,
        }
    }

    /// Target whose deadline is `timeout` from now
    pub fn within(address: Address, min_amount: u64, timeout: Duration) -> Self {
        Self::new(address, min_amount, Instant::now() + timeout)
    }
}

/// Why a wait ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FundingStatus {
    /// The observed sum reached the target
    Funded,
    /// The deadline passed first
    TimedOut,
    /// An output query failed; waiting stopped without retrying
    QueryFailed,
}

/// Result of [`FundingWaiter::await_funding`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FundingOutcome {
    /// Sum observed on the funding poll; zero unless funded
    pub observed: u64,
    pub status: FundingStatus,
}

impl FundingOutcome {
    fn funded(observed: u64) -> Self {
        Self {
            observed,
            status: FundingStatus::Funded,
        }
    }

    fn unfunded(status: FundingStatus) -> Self {
        Self {
            observed: 0,
            status,
        }
    }

    pub fn is_funded(&self) -> bool {
        self.status == FundingStatus::Funded
    }
}

/// Polls address outputs until a balance threshold is met.
///
/// Not-yet-funded polls are retried every `poll_interval`; a failed query ends the wait
/// immediately.
pub struct FundingWaiter<C: LedgerClient> {
    client: Arc<C>,
    poll_interval: Duration,
    color: Color,
}

impl<C: LedgerClient> FundingWaiter<C> {
    /// Waiter tracking the native color
    pub fn new(client: Arc<C>, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
            color: Color::NATIVE,
        }
    }

    /// Track a different color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub async fn await_funding(&self, target: &FundingTarget) -> FundingOutcome {
        let address = &target.address;

        loop {
            if Instant::now() >= target.deadline {
                return FundingOutcome::unfunded(FundingStatus::TimedOut);
            }

            let outputs = match self.client.address_outputs(address).await {
                Ok(outputs) => outputs,
                Err(e) => {
                    warn!(address = %address, error = %e, "unable to check outputs for funding");
                    return FundingOutcome::unfunded(FundingStatus::QueryFailed);
                }
            };

            let sum = sum_color(&outputs, &self.color);
            if sum >= target.min_amount {
                return FundingOutcome::funded(sum);
            }
            debug!(
                address = %address,
                sum,
                min_amount = target.min_amount,
                "address not funded yet"
            );

            tokio::select! {
                biased;
                _ = tokio::time::sleep_until(target.deadline) => {
                    return FundingOutcome::unfunded(FundingStatus::TimedOut);
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}
