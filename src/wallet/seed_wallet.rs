// Seed wallet - derives addresses, scans their outputs and spends them

use crate::client::{ClientError, LedgerClient};
use crate::identity::{Address, Keypair, Seed};
use crate::ledger::{
    Balances, Color, InclusionState, Output, TransactionBuilder, TransactionError, TransactionId,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Consecutive empty addresses after which a refresh stops scanning
pub const GAP_LIMIT: u64 = 5;

/// Errors that can occur during wallet operations
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Insufficient balance of {color}: available {available}, required {required}")]
    InsufficientBalance {
        color: Color,
        available: u64,
        required: u64,
    },

    #[error("Invalid amount: must be greater than zero")]
    InvalidAmount,

    #[error("Transaction {0} was rejected by the ledger")]
    Rejected(TransactionId),

    #[error("Transaction {0} not confirmed in time")]
    ConfirmationTimeout(TransactionId),

    #[error("Remote call failed: {0}")]
    Client(#[from] ClientError),

    #[error("Building transaction failed: {0}")]
    Transaction(#[from] TransactionError),
}

/// Wallet operations the spammers depend on
#[async_trait]
pub trait WalletFacade: Send {
    /// Address at `index` of the wallet's seed
    fn derive_address(&self, index: u64) -> Address;

    /// Rescan the seed's addresses and replace the known unspent outputs.
    ///
    /// Pending (unconfirmed) outputs are kept only when `include_pending` is set.
    async fn refresh(&mut self, include_pending: bool) -> Result<(), WalletError>;

    /// Send `amount` of `color` to `destination` from the known outputs
    async fn send_funds(
        &mut self,
        destination: &Address,
        amount: u64,
        color: Color,
        wait_for_confirmation: bool,
    ) -> Result<TransactionId, WalletError>;
}

/// An unspent output together with the derivation index of its address
#[derive(Clone, Debug)]
struct OwnedOutput {
    index: u64,
    output: Output,
}

/// Wallet bound to one seed and a shared ledger client
pub struct Wallet<C: LedgerClient> {
    seed: Seed,
    client: Arc<C>,
    unspent: Vec<OwnedOutput>,
    change_index: u64,
    min_scan: u64,
    pledge_id: String,
    confirmation_poll: Duration,
    confirmation_timeout: Duration,
}

impl<C: LedgerClient> Wallet<C> {
    pub fn new(seed: Seed, client: Arc<C>) -> Self {
        Self {
            seed,
            client,
            unspent: Vec::new(),
            change_index: 0,
            min_scan: 0,
            pledge_id: String::new(),
            confirmation_poll: Duration::from_secs(1),
            confirmation_timeout: Duration::from_secs(60),
        }
    }

    /// Node identity credited with the mana of this wallet's transactions
    pub fn with_pledge_id(mut self, pledge_id: &str) -> Self {
        self.pledge_id = pledge_id.to_string();
        self
    }

    /// Keep refreshing at least up to `index`, regardless of the gap limit
    pub fn with_min_scan(mut self, index: u64) -> Self {
        self.min_scan = index;
        self
    }

    /// How often and how long `send_funds` polls when waiting for confirmation
    pub fn with_confirmation_polling(mut self, poll: Duration, timeout: Duration) -> Self {
        self.confirmation_poll = poll;
        self.confirmation_timeout = timeout;
        self
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    /// Known balance of `color` as of the last refresh
    pub fn balance(&self, color: &Color) -> u64 {
        crate::ledger::sum_color(self.unspent.iter().map(|o| &o.output), color)
    }

    /// Unspent outputs known from the last refresh
    pub fn unspent_outputs(&self) -> Vec<&Output> {
        self.unspent.iter().map(|o| &o.output).collect()
    }

    /// Index of the address that receives change from the next spend
    pub fn change_index(&self) -> u64 {
        self.change_index
    }

    async fn await_confirmation(&self, id: &TransactionId) -> Result<(), WalletError> {
        let deadline = tokio::time::Instant::now() + self.confirmation_timeout;
        loop {
            match self.client.inclusion_state(id).await? {
                InclusionState::Confirmed => return Ok(()),
                InclusionState::Rejected => return Err(WalletError::Rejected(*id)),
                InclusionState::Pending => {}
            }
            if tokio::time::Instant::now() + self.confirmation_poll > deadline {
                return Err(WalletError::ConfirmationTimeout(*id));
            }
            tokio::time::sleep(self.confirmation_poll).await;
        }
    }
}

#[async_trait]
impl<C: LedgerClient + 'static> WalletFacade for Wallet<C> {
    fn derive_address(&self, index: u64) -> Address {
        self.seed.address(index)
    }

    async fn refresh(&mut self, include_pending: bool) -> Result<(), WalletError> {
        let mut unspent = Vec::new();
        let mut first_unused = None;
        let mut empty_streak = 0;
        let mut index = 0;

        while empty_streak < GAP_LIMIT || index <= self.min_scan {
            let address = self.derive_address(index);
            let outputs: Vec<Output> = self
                .client
                .address_outputs(&address)
                .await?
                .into_iter()
                .filter(|o| include_pending || o.is_confirmed())
                .collect();

            if outputs.is_empty() {
                empty_streak += 1;
                first_unused.get_or_insert(index);
            } else {
                empty_streak = 0;
                first_unused = None;
                unspent.extend(outputs.into_iter().map(|output| OwnedOutput { index, output }));
            }
            index += 1;
        }

        self.unspent = unspent;
        self.change_index = first_unused.unwrap_or(index);
        debug!(
            outputs = self.unspent.len(),
            change_index = self.change_index,
            "wallet refreshed"
        );
        Ok(())
    }

    async fn send_funds(
        &mut self,
        destination: &Address,
        amount: u64,
        color: Color,
        wait_for_confirmation: bool,
    ) -> Result<TransactionId, WalletError> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount);
        }

        // Pick outputs holding `color` until the amount is covered
        let mut selected = Vec::new();
        let mut covered = 0u64;
        for (position, owned) in self.unspent.iter().enumerate() {
            if covered >= amount {
                break;
            }
            if let Some(held) = owned.output.balances().get(&color) {
                covered = covered.saturating_add(held);
                selected.push(position);
            }
        }
        if covered < amount {
            return Err(WalletError::InsufficientBalance {
                color,
                available: covered,
                required: amount,
            });
        }

        // Everything the inputs hold beyond `amount` goes back to a fresh change address
        let mut remainder = Balances::new();
        for &position in &selected {
            remainder.merge(self.unspent[position].output.balances());
        }
        remainder.take(&color, amount);

        let keypairs: Vec<Keypair> = selected
            .iter()
            .map(|&position| self.seed.keypair(self.unspent[position].index))
            .collect();

        let mut builder = TransactionBuilder::new()
            .pledge(&self.pledge_id, &self.pledge_id)
            .output(*destination, Balances::single(color, amount));
        let has_change = !remainder.is_empty();
        if has_change {
            builder = builder.output(self.derive_address(self.change_index), remainder);
        }
        for (&position, keypair) in selected.iter().zip(&keypairs) {
            builder = builder.input(*self.unspent[position].output.id(), keypair);
        }
        let transaction = builder.build()?;

        let id = self.client.submit_transaction(&transaction).await?;
        info!(transaction_id = %id, destination = %destination, amount, "transaction submitted");

        let spent: Vec<_> = transaction.essence().inputs().to_vec();
        self.unspent.retain(|o| !spent.contains(o.output.id()));
        if has_change {
            self.change_index += 1;
        }

        if wait_for_confirmation {
            self.await_confirmation(&id).await?;
        }
        Ok(id)
    }
}
