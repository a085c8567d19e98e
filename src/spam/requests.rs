// Request and data spammers - unbounded request loops, one per worker

use crate::client::LedgerClient;
use crate::identity::Seed;
use crate::spam::{SpamConfig, SpamError};
use std::sync::Arc;
use tracing::{info, warn};

/// Requests faucet funds for a fresh address on every iteration
pub struct RequestSpammer<C: LedgerClient> {
    client: Arc<C>,
    config: SpamConfig,
}

impl<C: LedgerClient> RequestSpammer<C> {
    pub fn new(client: Arc<C>, config: SpamConfig) -> Self {
        Self { client, config }
    }

    /// Run one worker with its own seed.
    ///
    /// Only fetching the node identity can fail; request errors are logged and skipped.
    pub async fn run(&self, worker: usize) -> Result<(), SpamError> {
        self.run_with_seed(worker, Seed::generate()).await
    }

    pub async fn run_with_seed(&self, worker: usize, seed: Seed) -> Result<(), SpamError> {
        let node = self
            .client
            .info()
            .await
            .map_err(|e| SpamError::Setup(format!("cannot fetch node identity: {e}")))?;
        info!(worker, pledge_id = %node.identity_id, "will pledge to node");

        for i in self.config.iteration_range() {
            // A fresh address per request keeps the faucet from rate limiting us
            let address = seed.address(i);
            match self
                .client
                .request_faucet_funds(&address, self.config.faucet_pow_target, &node.identity_id)
                .await
            {
                Ok(request_id) => {
                    info!(worker, address = %address, request_id = %request_id, "did faucet request")
                }
                Err(e) => {
                    warn!(worker, address = %address, error = %e, "error doing faucet request")
                }
            }

            if !self.config.request_sleep.is_zero() {
                tokio::time::sleep(self.config.request_sleep).await;
            }
        }
        Ok(())
    }
}

/// Submits data messages carrying an increasing counter
pub struct DataSpammer<C: LedgerClient> {
    client: Arc<C>,
    config: SpamConfig,
}

impl<C: LedgerClient> DataSpammer<C> {
    pub fn new(client: Arc<C>, config: SpamConfig) -> Self {
        Self { client, config }
    }

    pub async fn run(&self, worker: usize) -> Result<(), SpamError> {
        for i in self.config.iteration_range() {
            let payload = i.to_string();
            match self.client.submit_data(payload.as_bytes()).await {
                Ok(message_id) => info!(worker, counter = i, message_id = %message_id, "sent msg"),
                Err(e) => warn!(worker, counter = i, error = %e, "unable to send message"),
            }

            if !self.config.request_sleep.is_zero() {
                tokio::time::sleep(self.config.request_sleep).await;
            }
        }
        Ok(())
    }
}
