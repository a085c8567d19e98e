use crate::identity::{Address, Keypair};
use bip39::Mnemonic;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

const SEED_LEN: usize = 32;
const DERIVATION_DOMAIN: &[u8] = b"ledger-spammer:seed:";

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Invalid seed length: expected {SEED_LEN}, got {0}")]
    InvalidLength(usize),

    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),
}

/// 32 bytes of entropy from which an unbounded sequence of keypairs is derived.
///
/// Derivation is a pure function of `(seed, index)`, so two wallets holding clones
/// of the same seed see exactly the same addresses.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed([u8; SEED_LEN]);

impl Seed {
    /// Generate a fresh seed from the OS RNG
    pub fn generate() -> Self {
        let mut bytes = [0u8; SEED_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create a seed from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SeedError> {
        let bytes: [u8; SEED_LEN] = bytes
            .try_into()
            .map_err(|_| SeedError::InvalidLength(bytes.len()))?;
        Ok(Self(bytes))
    }

    /// Import a base58 encoded seed
    pub fn from_base58(s: &str) -> Result<Self, SeedError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SeedError::InvalidBase58(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Import a seed from a 24-word BIP-39 mnemonic
    pub fn from_mnemonic(phrase: &str) -> Result<Self, SeedError> {
        let mnemonic =
            Mnemonic::parse(phrase).map_err(|e| SeedError::InvalidMnemonic(e.to_string()))?;
        Self::from_bytes(&mnemonic.to_entropy())
    }

    /// Export the seed as a 24-word BIP-39 mnemonic
    pub fn to_mnemonic(&self) -> Result<String, SeedError> {
        Mnemonic::from_entropy(&self.0)
            .map(|m| m.to_string())
            .map_err(|e| SeedError::InvalidMnemonic(e.to_string()))
    }

    /// Export the seed as base58
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Derive the keypair at `index`
    pub fn keypair(&self, index: u64) -> Keypair {
        let mut hasher = Sha256::new();
        hasher.update(DERIVATION_DOMAIN);
        hasher.update(self.0);
        hasher.update(index.to_le_bytes());
        let secret: [u8; 32] = hasher.finalize().into();
        Keypair::from_secret_bytes(&secret)
    }

    /// Derive the address at `index`
    pub fn address(&self, index: u64) -> Address {
        Address::from_public_key(&self.keypair(index).public_key())
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}
