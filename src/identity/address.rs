use crate::identity::PublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Version byte for addresses backed by a single ed25519 key
pub const ED25519_ADDRESS_VERSION: u8 = 0x00;

const ADDRESS_LEN: usize = 33;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address cannot be empty")]
    Empty,

    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid address length: expected {ADDRESS_LEN}, got {0}")]
    InvalidLength(usize),

    #[error("Unsupported address version: {0:#04x}")]
    UnsupportedVersion(u8),
}

/// Ledger destination: a version byte followed by the SHA-256 digest of the owning public key.
///
/// The human readable form is base58 of the 33 raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address {
    version: u8,
    digest: [u8; 32],
}

impl Address {
    /// Derive the address owned by a public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let digest: [u8; 32] = Sha256::digest(public_key.as_bytes()).into();
        Self {
            version: ED25519_ADDRESS_VERSION,
            digest,
        }
    }

    /// Parse a base58 address string
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;

        Self::from_bytes(&bytes)
    }

    /// Rebuild an address from its 33 raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        if bytes[0] != ED25519_ADDRESS_VERSION {
            return Err(AddressError::UnsupportedVersion(bytes[0]));
        }

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[1..]);
        Ok(Self {
            version: bytes[0],
            digest,
        })
    }

    /// The 33 raw bytes (version + digest)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(ADDRESS_LEN);
        bytes.push(self.version);
        bytes.extend_from_slice(&self.digest);
        bytes
    }

    /// Base58 form used on the wire and in logs
    pub fn to_base58(&self) -> String {
        bs58::encode(self.to_bytes()).into_string()
    }

    /// Check whether `public_key` is allowed to unlock outputs on this address
    pub fn is_owned_by(&self, public_key: &PublicKey) -> bool {
        *self == Self::from_public_key(public_key)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
