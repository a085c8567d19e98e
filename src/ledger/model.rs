// Ledger data model shared by the remote client and the wallet

use crate::identity::Address;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid {kind} length: expected 32, got {got}")]
    InvalidLength { kind: &'static str, got: usize },
}

fn decode_32(kind: &'static str, s: &str) -> Result<[u8; 32], ModelError> {
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|e| ModelError::InvalidBase58(e.to_string()))?;
    bytes.as_slice().try_into().map_err(|_| ModelError::InvalidLength {
        kind,
        got: bytes.len(),
    })
}

// ============================================================================
// COLOR
// ============================================================================

/// Asset tag distinguishing fungible token types
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Color([u8; 32]);

impl Color {
    /// The ledger's native token
    pub const NATIVE: Color = Color([0u8; 32]);

    const NATIVE_NAME: &'static str = "NATIVE";

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }

    /// Parse either `NATIVE` or a base58 encoded 32-byte color
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        if s == Self::NATIVE_NAME {
            return Ok(Self::NATIVE);
        }
        decode_32("color", s).map(Self)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            f.write_str(Self::NATIVE_NAME)
        } else {
            f.write_str(&bs58::encode(self.0).into_string())
        }
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({})", self)
    }
}

impl FromStr for Color {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// BALANCES
// ============================================================================

/// Per-color amounts held by one output
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances(BTreeMap<Color, u64>);

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balances holding a single color
    pub fn single(color: Color, amount: u64) -> Self {
        Self::new().with(color, amount)
    }

    /// Add `amount` of `color` (builder style)
    pub fn with(mut self, color: Color, amount: u64) -> Self {
        self.add(color, amount);
        self
    }

    /// Add `amount` of `color`, saturating at `u64::MAX`
    pub fn add(&mut self, color: Color, amount: u64) {
        if amount == 0 {
            return;
        }
        let entry = self.0.entry(color).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Amount held in `color`, `None` when the color is absent
    pub fn get(&self, color: &Color) -> Option<u64> {
        self.0.get(color).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Color, &u64)> {
        self.0.iter()
    }

    /// Merge every color of `other` into `self`
    pub fn merge(&mut self, other: &Balances) {
        for (color, amount) in other.iter() {
            self.add(*color, *amount);
        }
    }

    /// Subtract `amount` of `color`; returns false (and leaves `self` untouched) if not enough
    pub fn take(&mut self, color: &Color, amount: u64) -> bool {
        let Some(held) = self.0.get_mut(color) else {
            return amount == 0;
        };
        if *held < amount {
            return false;
        }
        *held -= amount;
        if *held == 0 {
            self.0.remove(color);
        }
        true
    }
}

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Identifier of a transaction (SHA-256 of its essence bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId([u8; 32]);

impl TransactionId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn parse(s: &str) -> Result<Self, ModelError> {
        decode_32("transaction id", s).map(Self)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self)
    }
}

/// Identifier of an output: hash of the creating transaction and the output index
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputId([u8; 32]);

impl OutputId {
    /// Id of output `index` created by `transaction_id`
    pub fn new(transaction_id: &TransactionId, index: u16) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(transaction_id.as_bytes());
        hasher.update(index.to_le_bytes());
        Self(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn parse(s: &str) -> Result<Self, ModelError> {
        decode_32("output id", s).map(Self)
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputId({})", self)
    }
}

/// Identifier the node assigns to an accepted message or faucet request
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// A unit of value sitting on an address, as reported by the node
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    id: OutputId,
    address: Address,
    balances: Balances,
    confirmed: bool,
}

impl Output {
    /// Create a confirmed output
    pub fn new(id: OutputId, address: Address, balances: Balances) -> Self {
        Self {
            id,
            address,
            balances,
            confirmed: true,
        }
    }

    /// Mark the output as pending (or confirmed)
    pub fn with_confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    pub fn id(&self) -> &OutputId {
        &self.id
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }
}

/// Sum `color` across `outputs`; outputs without that color contribute nothing
pub fn sum_color<'a>(outputs: impl IntoIterator<Item = &'a Output>, color: &Color) -> u64 {
    outputs
        .into_iter()
        .filter_map(|output| output.balances().get(color))
        .fold(0u64, |acc, amount| acc.saturating_add(amount))
}

// ============================================================================
// NODE INFO / INCLUSION STATE
// ============================================================================

/// Subset of the node's info endpoint used by the spammers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeInfo {
    /// Identity that mana from faucet requests is pledged to
    pub identity_id: String,
    pub version: Option<String>,
}

/// Ledger verdict on a submitted transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InclusionState {
    Pending,
    Confirmed,
    Rejected,
}
