// Conflict spammer - two wallets on one seed spend the same funds at the same time

use crate::client::LedgerClient;
use crate::identity::{Address, Seed};
use crate::ledger::{Color, TransactionId};
use crate::spam::{FundingTarget, FundingWaiter, SpamConfig, SpamError};
use crate::wallet::{Wallet, WalletError, WalletFacade};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Outcome of one of the two conflicting spends
#[derive(Clone, Debug)]
pub struct SpendAttempt {
    /// Which wallet submitted the spend (0 or 1)
    pub wallet: usize,
    pub destination: Address,
    pub result: Result<TransactionId, String>,
}

impl SpendAttempt {
    pub fn is_submitted(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of a finished conflict run
#[derive(Clone, Debug)]
pub struct ConflictReport {
    pub funding_address: Address,
    pub funded_amount: u64,
    pub attempts: Vec<SpendAttempt>,
}

impl ConflictReport {
    /// Number of spends the node accepted for processing
    pub fn submitted(&self) -> usize {
        self.attempts.iter().filter(|a| a.is_submitted()).count()
    }
}

/// Funds one address from the faucet, then double-spends it from two wallets
pub struct ConflictSpammer<C: LedgerClient> {
    client: Arc<C>,
    config: SpamConfig,
    seed: Option<Seed>,
    target_seed: Option<Seed>,
}

impl<C: LedgerClient + 'static> ConflictSpammer<C> {
    pub fn new(client: Arc<C>, config: SpamConfig) -> Self {
        Self {
            client,
            config,
            seed: None,
            target_seed: None,
        }
    }

    /// Fund and spend from this seed instead of a fresh one
    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Derive the two destinations from this seed instead of a fresh one
    pub fn with_target_seed(mut self, seed: Seed) -> Self {
        self.target_seed = Some(seed);
        self
    }

    pub async fn run(&self) -> Result<ConflictReport, SpamError> {
        let node = self
            .client
            .info()
            .await
            .map_err(|e| SpamError::Setup(format!("cannot fetch node identity: {e}")))?;

        let seed = self.seed.clone().unwrap_or_else(Seed::generate);
        let funding_address = seed.address(self.config.funding_index);

        match self
            .client
            .request_faucet_funds(
                &funding_address,
                self.config.faucet_pow_target,
                &node.identity_id,
            )
            .await
        {
            Ok(request_id) => {
                info!(address = %funding_address, request_id = %request_id, "did faucet request")
            }
            Err(e) => warn!(address = %funding_address, error = %e, "error doing faucet request"),
        }

        let waiter = FundingWaiter::new(self.client.clone(), self.config.polling_interval);
        let target = FundingTarget::within(
            funding_address,
            self.config.funding_threshold,
            self.config.funding_timeout,
        );
        let outcome = waiter.await_funding(&target).await;
        if !outcome.is_funded() {
            error!(
                address = %funding_address,
                timeout = ?self.config.funding_timeout,
                status = ?outcome.status,
                "could not fund address"
            );
            return Err(SpamError::FundingTimeout {
                address: funding_address,
                timeout: self.config.funding_timeout,
            });
        }
        let sum = outcome.observed;
        info!(address = %funding_address, sum, "address is funded");

        // Both wallets hold the same seed, so both see and spend the same outputs
        let funding_index = self.config.funding_index;
        let mut wallets = [
            Wallet::new(seed.clone(), self.client.clone())
                .with_pledge_id(&node.identity_id)
                .with_min_scan(funding_index),
            Wallet::new(seed, self.client.clone())
                .with_pledge_id(&node.identity_id)
                .with_min_scan(funding_index),
        ];
        for wallet in wallets.iter_mut() {
            wallet.refresh(true).await?;
        }

        let target_seed = self.target_seed.clone().unwrap_or_else(Seed::generate);
        let destinations = [target_seed.address(0), target_seed.address(1)];

        let handles: Vec<(usize, Address, JoinHandle<Result<TransactionId, WalletError>>)> =
            wallets
                .into_iter()
                .zip(destinations)
                .enumerate()
                .map(|(n, (mut wallet, destination))| {
                    let handle = tokio::spawn(async move {
                        wallet
                            .send_funds(&destination, sum, Color::NATIVE, false)
                            .await
                    });
                    (n, destination, handle)
                })
                .collect();

        let mut attempts = Vec::with_capacity(handles.len());
        for (n, destination, handle) in handles {
            let result = match handle.await {
                Ok(Ok(id)) => {
                    info!(wallet = n, destination = %destination, transaction_id = %id, "conflicting spend sent");
                    Ok(id)
                }
                Ok(Err(e)) => {
                    warn!(wallet = n, destination = %destination, error = %e, "conflicting spend failed");
                    Err(e.to_string())
                }
                Err(e) => {
                    error!(wallet = n, destination = %destination, error = %e, "spend task failed");
                    Err(format!("spend task failed: {e}"))
                }
            };
            attempts.push(SpendAttempt {
                wallet: n,
                destination,
                result,
            });
        }

        info!(address = %funding_address, "conflicts sent");
        Ok(ConflictReport {
            funding_address,
            funded_amount: sum,
            attempts,
        })
    }
}
