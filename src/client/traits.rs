// Ledger client trait - the node API consumed by wallets and spammers

use crate::client::pow::PowError;
use crate::identity::Address;
use crate::ledger::{
    CodecError, InclusionState, MessageId, NodeInfo, Output, Transaction, TransactionId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by a ledger client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse: {0}")]
    Url(#[from] url::ParseError),

    #[error("node returned error: {0}")]
    Node(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("proof of work failed: {0}")]
    Pow(#[from] PowError),

    #[error("transaction codec: {0}")]
    Codec(#[from] CodecError),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

/// Public API of a ledger node
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Node identity and version
    async fn info(&self) -> Result<NodeInfo, ClientError>;

    /// Submit an opaque data payload as a message
    async fn submit_data(&self, payload: &[u8]) -> Result<MessageId, ClientError>;

    /// Ask the faucet to fund `address`, pledging mana to `pledge_id`.
    ///
    /// `pow_target` is the number of leading zero bits the request nonce must produce.
    async fn request_faucet_funds(
        &self,
        address: &Address,
        pow_target: u32,
        pledge_id: &str,
    ) -> Result<MessageId, ClientError>;

    /// Unspent outputs currently held by `address`
    async fn address_outputs(&self, address: &Address) -> Result<Vec<Output>, ClientError>;

    /// Submit a signed transaction without waiting for it to be confirmed
    async fn submit_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<TransactionId, ClientError>;

    /// Current inclusion state of a previously submitted transaction
    async fn inclusion_state(&self, id: &TransactionId) -> Result<InclusionState, ClientError>;
}

#[async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for Arc<T> {
    async fn info(&self) -> Result<NodeInfo, ClientError> {
        (**self).info().await
    }

    async fn submit_data(&self, payload: &[u8]) -> Result<MessageId, ClientError> {
        (**self).submit_data(payload).await
    }

    async fn request_faucet_funds(
        &self,
        address: &Address,
        pow_target: u32,
        pledge_id: &str,
    ) -> Result<MessageId, ClientError> {
        (**self)
            .request_faucet_funds(address, pow_target, pledge_id)
            .await
    }

    async fn address_outputs(&self, address: &Address) -> Result<Vec<Output>, ClientError> {
        (**self).address_outputs(address).await
    }

    async fn submit_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<TransactionId, ClientError> {
        (**self).submit_transaction(transaction).await
    }

    async fn inclusion_state(&self, id: &TransactionId) -> Result<InclusionState, ClientError> {
        (**self).inclusion_state(id).await
    }
}
