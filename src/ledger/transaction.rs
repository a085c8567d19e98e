use crate::identity::{Address, Keypair, PublicKey, Signature, Signer};
use crate::ledger::{Balances, OutputId, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors that can occur when building a transaction
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Missing inputs: at least one input is required")]
    MissingInputs,

    #[error("Missing outputs: at least one output is required")]
    MissingOutputs,

    #[error("Empty output: output {0} carries no balance")]
    EmptyOutput(usize),

    #[error("Duplicate input: {0}")]
    DuplicateInput(OutputId),

    #[error("Failed to serialize essence: {0}")]
    Serialization(String),
}

/// Destination and amounts of one created output
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutput {
    pub address: Address,
    pub balances: Balances,
}

/// The signed part of a transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEssence {
    timestamp: DateTime<Utc>,
    access_pledge_id: String,
    consensus_pledge_id: String,
    inputs: Vec<OutputId>,
    outputs: Vec<TransferOutput>,
}

impl TransactionEssence {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn access_pledge_id(&self) -> &str {
        &self.access_pledge_id
    }

    pub fn consensus_pledge_id(&self) -> &str {
        &self.consensus_pledge_id
    }

    pub fn inputs(&self) -> &[OutputId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransferOutput] {
        &self.outputs
    }

    /// Canonical bytes that are hashed and signed
    pub fn to_signing_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        postcard::to_allocvec(self).map_err(|e| TransactionError::Serialization(e.to_string()))
    }
}

/// Proof that the holder of `public_key` may spend the matching input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockBlock {
    pub public_key: PublicKey,
    pub signature: Signature,
}

/// A signed transfer: essence plus one unlock block per input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    essence: TransactionEssence,
    unlocks: Vec<UnlockBlock>,
}

impl Transaction {
    pub fn essence(&self) -> &TransactionEssence {
        &self.essence
    }

    pub fn unlocks(&self) -> &[UnlockBlock] {
        &self.unlocks
    }

    /// Transaction id: SHA-256 of the essence bytes
    pub fn id(&self) -> Result<TransactionId, TransactionError> {
        let digest: [u8; 32] = Sha256::digest(self.essence.to_signing_bytes()?).into();
        Ok(TransactionId::from_bytes(digest))
    }

    /// Ids of the outputs this transaction creates, in output order
    pub fn output_ids(&self) -> Result<Vec<OutputId>, TransactionError> {
        let id = self.id()?;
        Ok((0..self.essence.outputs.len())
            .map(|i| OutputId::new(&id, i as u16))
            .collect())
    }

    /// Check every unlock block against the address of the input it unlocks.
    ///
    /// `input_addresses[i]` must be the address holding `essence.inputs()[i]`.
    pub fn verify(&self, input_addresses: &[Address]) -> bool {
        if input_addresses.len() != self.essence.inputs.len()
            || self.unlocks.len() != self.essence.inputs.len()
        {
            return false;
        }

        let Ok(message) = self.essence.to_signing_bytes() else {
            return false;
        };
        self.unlocks
            .iter()
            .zip(input_addresses)
            .all(|(unlock, address)| {
                address.is_owned_by(&unlock.public_key)
                    && Signer::verify(&unlock.public_key, &message, &unlock.signature)
            })
    }
}

/// Builder for creating signed transactions
pub struct TransactionBuilder<'a> {
    inputs: Vec<(OutputId, &'a Keypair)>,
    outputs: Vec<TransferOutput>,
    access_pledge_id: String,
    consensus_pledge_id: String,
    timestamp: Option<DateTime<Utc>>,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            access_pledge_id: String::new(),
            consensus_pledge_id: String::new(),
            timestamp: None,
        }
    }

    /// Spend `output_id`, signed by `keypair` (the key owning its address)
    pub fn input(mut self, output_id: OutputId, keypair: &'a Keypair) -> Self {
        self.inputs.push((output_id, keypair));
        self
    }

    /// Create an output on `address`
    pub fn output(mut self, address: Address, balances: Balances) -> Self {
        self.outputs.push(TransferOutput { address, balances });
        self
    }

    /// Node identities credited with the access and consensus mana of this transfer
    pub fn pledge(mut self, access: &str, consensus: &str) -> Self {
        self.access_pledge_id = access.to_string();
        self.consensus_pledge_id = consensus.to_string();
        self
    }

    /// Set the timestamp (optional - defaults to now)
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build and sign the transaction
    pub fn build(self) -> Result<Transaction, TransactionError> {
        if self.inputs.is_empty() {
            return Err(TransactionError::MissingInputs);
        }
        if self.outputs.is_empty() {
            return Err(TransactionError::MissingOutputs);
        }
        if let Some(index) = self.outputs.iter().position(|o| o.balances.is_empty()) {
            return Err(TransactionError::EmptyOutput(index));
        }
        for (i, (id, _)) in self.inputs.iter().enumerate() {
            if self.inputs[..i].iter().any(|(other, _)| other == id) {
                return Err(TransactionError::DuplicateInput(*id));
            }
        }

        let essence = TransactionEssence {
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            access_pledge_id: self.access_pledge_id,
            consensus_pledge_id: self.consensus_pledge_id,
            inputs: self.inputs.iter().map(|(id, _)| *id).collect(),
            outputs: self.outputs,
        };

        let message = essence.to_signing_bytes()?;
        let unlocks = self
            .inputs
            .iter()
            .map(|(_, keypair)| UnlockBlock {
                public_key: keypair.public_key(),
                signature: Signer::sign(keypair, &message),
            })
            .collect();

        Ok(Transaction { essence, unlocks })
    }
}

impl<'a> Default for TransactionBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}
