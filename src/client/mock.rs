// Mock ledger client for tests and dry runs

use crate::client::{ClientError, LedgerClient};
use crate::identity::Address;
use crate::ledger::{
    Balances, Color, InclusionState, MessageId, NodeInfo, Output, OutputId, Transaction,
    TransactionId,
};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Scripted result of one `address_outputs` poll
#[derive(Clone, Debug)]
pub enum OutputsPoll {
    Outputs(Vec<Output>),
    Fail(String),
}

#[derive(Default)]
struct MockState {
    static_outputs: HashMap<Address, Vec<Output>>,
    scripted_outputs: HashMap<Address, VecDeque<OutputsPoll>>,
    outputs_calls: HashMap<Address, usize>,
    data_payloads: Vec<Vec<u8>>,
    data_calls: usize,
    faucet_requests: Vec<(Address, u32, String)>,
    transactions: Vec<Transaction>,
    info_calls: usize,
    next_output: u64,
}

/// In-memory [`LedgerClient`] with configurable failures and delays.
///
/// Every call is recorded so tests can assert on what was sent.
pub struct MockLedgerClient {
    identity_id: String,
    info_failure: Option<String>,
    data_failure_every: Option<usize>,
    faucet_failure: Option<String>,
    faucet_grant: Option<u64>,
    submit_failure: Option<String>,
    submit_delay: Duration,
    inclusion: InclusionState,
    state: Mutex<MockState>,
}

impl MockLedgerClient {
    /// Create a mock that answers every call successfully with empty data
    pub fn new() -> Self {
        Self {
            identity_id: "mock-node".to_string(),
            info_failure: None,
            data_failure_every: None,
            faucet_failure: None,
            faucet_grant: None,
            submit_failure: None,
            submit_delay: Duration::ZERO,
            inclusion: InclusionState::Confirmed,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Identity reported by `info`
    pub fn with_identity(mut self, identity_id: &str) -> Self {
        self.identity_id = identity_id.to_string();
        self
    }

    /// Make `info` fail
    pub fn with_info_failure(mut self, message: &str) -> Self {
        self.info_failure = Some(message.to_string());
        self
    }

    /// Fail every `n`th data submission (1-based)
    pub fn with_data_failure_every(mut self, n: usize) -> Self {
        self.data_failure_every = Some(n.max(1));
        self
    }

    /// Make every faucet request fail
    pub fn with_faucet_failure(mut self, message: &str) -> Self {
        self.faucet_failure = Some(message.to_string());
        self
    }

    /// Credit `amount` native tokens to the requested address on each faucet request
    pub fn with_faucet_grant(mut self, amount: u64) -> Self {
        self.faucet_grant = Some(amount);
        self
    }

    /// Make every transaction submission fail
    pub fn with_submit_failure(mut self, message: &str) -> Self {
        self.submit_failure = Some(message.to_string());
        self
    }

    /// Delay each transaction submission
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    /// Inclusion state reported for every transaction
    pub fn with_inclusion_state(mut self, state: InclusionState) -> Self {
        self.inclusion = state;
        self
    }

    /// Outputs returned for `address` on every poll
    pub fn with_outputs(self, address: Address, outputs: Vec<Output>) -> Self {
        self.lock().static_outputs.insert(address, outputs);
        self
    }

    /// Successive poll results for `address`; the last one repeats once the script runs out
    pub fn with_output_script(self, address: Address, polls: Vec<OutputsPoll>) -> Self {
        self.lock()
            .scripted_outputs
            .insert(address, polls.into_iter().collect());
        self
    }

    /// Build an output holding `amount` native tokens on `address`
    pub fn native_output(&self, address: Address, amount: u64) -> Output {
        let id = self.next_output_id();
        Output::new(id, address, Balances::single(Color::NATIVE, amount))
    }

    /// Number of `address_outputs` calls made for `address`
    pub fn outputs_calls(&self, address: &Address) -> usize {
        self.lock().outputs_calls.get(address).copied().unwrap_or(0)
    }

    /// Total number of `address_outputs` calls
    pub fn total_outputs_calls(&self) -> usize {
        self.lock().outputs_calls.values().sum()
    }

    /// Data payloads in submission order, including rejected ones
    pub fn data_payloads(&self) -> Vec<Vec<u8>> {
        self.lock().data_payloads.clone()
    }

    /// Number of data submission attempts (including failures)
    pub fn data_calls(&self) -> usize {
        self.lock().data_calls
    }

    /// Faucet requests as (address, pow target, pledge id)
    pub fn faucet_requests(&self) -> Vec<(Address, u32, String)> {
        self.lock().faucet_requests.clone()
    }

    /// Transactions submitted, in arrival order
    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().transactions.clone()
    }

    pub fn info_calls(&self) -> usize {
        self.lock().info_calls
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_output_id(&self) -> OutputId {
        let mut state = self.lock();
        state.next_output += 1;
        let digest: [u8; 32] = Sha256::digest(state.next_output.to_le_bytes()).into();
        OutputId::from_bytes(digest)
    }
}

impl Default for MockLedgerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MockLedgerClient {
    async fn info(&self) -> Result<NodeInfo, ClientError> {
        self.lock().info_calls += 1;
        if let Some(message) = &self.info_failure {
            return Err(ClientError::Node(message.clone()));
        }
        Ok(NodeInfo {
            identity_id: self.identity_id.clone(),
            version: Some("mock".to_string()),
        })
    }

    async fn submit_data(&self, payload: &[u8]) -> Result<MessageId, ClientError> {
        let mut state = self.lock();
        state.data_calls += 1;
        state.data_payloads.push(payload.to_vec());
        if let Some(n) = self.data_failure_every {
            if state.data_calls % n == 0 {
                return Err(ClientError::Node(format!("data call {} rejected", state.data_calls)));
            }
        }
        Ok(MessageId::new(format!("msg-{}", state.data_calls)))
    }

    async fn request_faucet_funds(
        &self,
        address: &Address,
        pow_target: u32,
        pledge_id: &str,
    ) -> Result<MessageId, ClientError> {
        self.lock()
            .faucet_requests
            .push((*address, pow_target, pledge_id.to_string()));

        if let Some(message) = &self.faucet_failure {
            return Err(ClientError::Node(message.clone()));
        }

        if let Some(amount) = self.faucet_grant {
            let output = self.native_output(*address, amount);
            self.lock()
                .static_outputs
                .entry(*address)
                .or_default()
                .push(output);
        }

        let count = self.lock().faucet_requests.len();
        Ok(MessageId::new(format!("faucet-{count}")))
    }

    async fn address_outputs(&self, address: &Address) -> Result<Vec<Output>, ClientError> {
        let mut state = self.lock();
        *state.outputs_calls.entry(*address).or_insert(0) += 1;

        if let Some(script) = state.scripted_outputs.get_mut(address) {
            let poll = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            };
            if let Some(poll) = poll {
                return match poll {
                    OutputsPoll::Outputs(outputs) => Ok(outputs),
                    OutputsPoll::Fail(message) => Err(ClientError::Node(message)),
                };
            }
        }

        Ok(state.static_outputs.get(address).cloned().unwrap_or_default())
    }

    async fn submit_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<TransactionId, ClientError> {
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }

        self.lock().transactions.push(transaction.clone());

        if let Some(message) = &self.submit_failure {
            return Err(ClientError::Node(message.clone()));
        }
        transaction
            .id()
            .map_err(|e| ClientError::Node(format!("unreadable transaction: {e}")))
    }

    async fn inclusion_state(&self, _id: &TransactionId) -> Result<InclusionState, ClientError> {
        Ok(self.inclusion)
    }
}
