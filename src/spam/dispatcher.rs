// Dispatcher - picks a spammer, runs its workers and waits for shutdown

use crate::client::LedgerClient;
use crate::spam::{ConflictSpammer, DataSpammer, RequestSpammer, SpamConfig, SpamError};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Which load to generate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Faucet requests to fresh addresses
    FaucetRequests,
    /// Data messages carrying a counter
    DataMessages,
    /// One funded double spend
    Conflicts,
}

impl TryFrom<u8> for Mode {
    type Error = SpamError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Mode::FaucetRequests),
            1 => Ok(Mode::DataMessages),
            2 => Ok(Mode::Conflicts),
            other => Err(SpamError::UnknownMode(other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::FaucetRequests => write!(f, "faucet-requests"),
            Mode::DataMessages => write!(f, "data-messages"),
            Mode::Conflicts => write!(f, "conflicts"),
        }
    }
}

/// Runs the workers of one [`Mode`] until shutdown
pub struct Dispatcher<C: LedgerClient> {
    client: Arc<C>,
    config: SpamConfig,
}

impl<C: LedgerClient + 'static> Dispatcher<C> {
    pub fn new(client: Arc<C>, config: SpamConfig) -> Result<Self, SpamError> {
        config.validate()?;
        Ok(Self { client, config })
    }

    /// Spawn the workers for `mode`: `parallelism` loops, or a single conflict run
    pub fn spawn_workers(&self, mode: Mode) -> JoinSet<Result<(), SpamError>> {
        let mut workers = JoinSet::new();

        match mode {
            Mode::FaucetRequests => {
                for worker in 0..self.config.parallelism {
                    let spammer = RequestSpammer::new(self.client.clone(), self.config.clone());
                    workers.spawn(async move { spammer.run(worker).await });
                }
            }
            Mode::DataMessages => {
                for worker in 0..self.config.parallelism {
                    let spammer = DataSpammer::new(self.client.clone(), self.config.clone());
                    workers.spawn(async move { spammer.run(worker).await });
                }
            }
            Mode::Conflicts => {
                let spammer = ConflictSpammer::new(self.client.clone(), self.config.clone());
                workers.spawn(async move {
                    match spammer.run().await {
                        Ok(report) => {
                            info!(
                                submitted = report.submitted(),
                                attempts = report.attempts.len(),
                                "conflict run finished"
                            );
                            Ok(())
                        }
                        Err(e) if !e.is_fatal() => {
                            error!(error = %e, "conflict run aborted");
                            Ok(())
                        }
                        Err(e) => Err(e),
                    }
                });
            }
        }

        workers
    }

    /// Run `mode` until `shutdown` resolves.
    ///
    /// Finished workers do not end the run; the first fatal worker error does.
    pub async fn run<F>(&self, mode: Mode, shutdown: F) -> Result<(), SpamError>
    where
        F: Future<Output = ()>,
    {
        info!(%mode, parallelism = self.config.parallelism, "running program");
        let mut workers = self.spawn_workers(mode);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("interrupt received, stopping workers");
                    workers.shutdown().await;
                    return Ok(());
                }
                joined = workers.join_next(), if !workers.is_empty() => {
                    match joined {
                        Some(Ok(Ok(()))) | None => {}
                        Some(Ok(Err(e))) => {
                            error!(error = %e, "worker failed");
                            workers.shutdown().await;
                            return Err(e);
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "worker panicked");
                            workers.shutdown().await;
                            return Err(SpamError::Worker(e.to_string()));
                        }
                    }
                }
            }
        }
    }
}
