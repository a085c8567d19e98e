use crate::client::ClientError;
use crate::identity::Address;
use crate::wallet::WalletError;
use std::time::Duration;
use thiserror::Error;

/// Errors that end a spammer run
#[derive(Error, Debug)]
pub enum SpamError {
    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("Could not fund address {address} in {timeout:?}")]
    FundingTimeout { address: Address, timeout: Duration },

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown program mode: {0}")]
    UnknownMode(u8),

    #[error("Worker failed: {0}")]
    Worker(String),
}

impl SpamError {
    /// Whether the process should stop.
    ///
    /// Only a funding timeout is survivable: it aborts one conflict run and nothing else.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SpamError::FundingTimeout { .. })
    }
}
