use crate::ledger::Transaction;
use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to encode transaction: {0}")]
    EncodeError(String),

    #[error("Failed to decode transaction: {0}")]
    DecodeError(String),

    #[error("Invalid base64 string: {0}")]
    InvalidBase64(String),
}

/// Wire codec for signed transactions (postcard bytes, base64 in JSON bodies)
pub struct TransactionCodec;

impl TransactionCodec {
    pub fn encode(transaction: &Transaction) -> Result<Vec<u8>, CodecError> {
        postcard::to_allocvec(transaction).map_err(|e| CodecError::EncodeError(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Transaction, CodecError> {
        postcard::from_bytes(bytes).map_err(|e| CodecError::DecodeError(e.to_string()))
    }

    pub fn encode_base64(transaction: &Transaction) -> Result<String, CodecError> {
        Ok(STANDARD.encode(Self::encode(transaction)?))
    }

    pub fn decode_base64(b64: &str) -> Result<Transaction, CodecError> {
        let bytes = STANDARD
            .decode(b64)
            .map_err(|e| CodecError::InvalidBase64(e.to_string()))?;
        Self::decode(&bytes)
    }
}
