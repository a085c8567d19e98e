// HTTP ledger client - JSON over HTTP against the node's public API
//
// Endpoints:
// - GET  /info
// - POST /data
// - POST /faucet
// - GET  /ledgerstate/addresses/{address}
// - POST /ledgerstate/transactions
// - GET  /ledgerstate/transactions/{id}/metadata

use crate::client::pow;
use crate::client::{ClientError, LedgerClient};
use crate::identity::Address;
use crate::ledger::{
    Balances, Color, InclusionState, MessageId, NodeInfo, Output, OutputId, Transaction,
    TransactionCodec, TransactionId,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

// ============================================================================
// CLIENT CONFIG
// ============================================================================

/// Configuration for the HTTP client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the node API
    pub node_url: String,
    /// Timeout applied to every request
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(node_url: &str) -> Self {
        Self {
            node_url: node_url.to_string(),
            ..Self::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.request_timeout.is_zero() {
            return Err(ClientError::InvalidConfig(
                "request_timeout must be > 0".to_string(),
            ));
        }
        Url::parse(&self.node_url)?;
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node_url: "http://127.0.0.1:8080".to_string(),
            request_timeout: Duration::from_secs(20),
        }
    }
}

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Deserialize)]
struct InfoResponse {
    #[serde(rename = "identityID")]
    identity_id: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Serialize)]
struct DataRequest {
    data: String,
}

#[derive(Serialize)]
struct FaucetRequest<'a> {
    address: String,
    #[serde(rename = "accessManaPledgeID")]
    access_mana_pledge_id: &'a str,
    #[serde(rename = "consensusManaPledgeID")]
    consensus_mana_pledge_id: &'a str,
    #[serde(rename = "powNonce")]
    pow_nonce: u64,
}

#[derive(Deserialize)]
struct IdResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    error: String,
}

#[derive(Deserialize)]
struct AddressOutputsResponse {
    #[serde(default)]
    outputs: Vec<WireOutput>,
    #[serde(default)]
    error: String,
}

#[derive(Deserialize)]
struct WireOutput {
    #[serde(rename = "outputID")]
    output_id: String,
    address: String,
    #[serde(default)]
    balances: BTreeMap<String, u64>,
    #[serde(default = "default_confirmed")]
    confirmed: bool,
}

fn default_confirmed() -> bool {
    true
}

impl TryFrom<WireOutput> for Output {
    type Error = ClientError;

    fn try_from(wire: WireOutput) -> Result<Self, Self::Error> {
        let id = OutputId::parse(&wire.output_id)
            .map_err(|e| ClientError::Decode(format!("output id {}: {e}", wire.output_id)))?;
        let address = Address::parse(&wire.address)
            .map_err(|e| ClientError::Decode(format!("address {}: {e}", wire.address)))?;

        let mut balances = Balances::new();
        for (color, amount) in &wire.balances {
            let color = Color::parse(color)
                .map_err(|e| ClientError::Decode(format!("color {color}: {e}")))?;
            balances.add(color, *amount);
        }

        Ok(Output::new(id, address, balances).with_confirmed(wire.confirmed))
    }
}

#[derive(Serialize)]
struct TransactionRequest {
    txn_bytes: String,
}

#[derive(Deserialize)]
struct TransactionResponse {
    #[serde(default)]
    transaction_id: String,
    #[serde(default)]
    error: String,
}

#[derive(Deserialize)]
struct TransactionMetadataResponse {
    #[serde(rename = "inclusionState")]
    inclusion_state: Option<InclusionState>,
    #[serde(default)]
    error: String,
}

fn node_error(context: &str, error: String) -> Result<(), ClientError> {
    if error.is_empty() {
        Ok(())
    } else {
        Err(ClientError::Node(format!("{context}: {error}")))
    }
}

// ============================================================================
// HTTP CLIENT
// ============================================================================

/// [`LedgerClient`] backed by the node's REST API
#[derive(Clone)]
pub struct HttpLedgerClient {
    base: Url,
    client: Client,
}

impl HttpLedgerClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let mut base = Url::parse(&config.node_url)?;
        // Relative joins drop the last path segment unless it ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { base, client })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ClientError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let resp = self.client.get(url).send().await?;
        Self::decode(path, resp).await
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ClientError> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");
        let resp = self.client.post(url).json(body).send().await?;
        Self::decode(path, resp).await
    }

    async fn decode<R: DeserializeOwned>(
        path: &str,
        resp: reqwest::Response,
    ) -> Result<R, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Node(format!("{path} HTTP {status}: {body}")));
        }
        resp.json()
            .await
            .map_err(|e| ClientError::Decode(format!("{path}: {e}")))
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn info(&self) -> Result<NodeInfo, ClientError> {
        let resp: InfoResponse = self.get("info").await?;
        Ok(NodeInfo {
            identity_id: resp.identity_id,
            version: resp.version,
        })
    }

    async fn submit_data(&self, payload: &[u8]) -> Result<MessageId, ClientError> {
        let req = DataRequest {
            data: STANDARD.encode(payload),
        };
        let resp: IdResponse = self.post("data", &req).await?;
        node_error("data", resp.error)?;
        Ok(MessageId::new(resp.id))
    }

    async fn request_faucet_funds(
        &self,
        address: &Address,
        pow_target: u32,
        pledge_id: &str,
    ) -> Result<MessageId, ClientError> {
        let payload = pow::faucet_payload(address, pledge_id);
        let cancel = Arc::new(AtomicBool::new(false));
        // Aborted workers drop this future; the guard then stops the blocking search
        let _guard = pow::CancelOnDrop(cancel.clone());
        let pow_nonce = tokio::task::spawn_blocking(move || {
            pow::solve_cancellable(&payload, pow_target, &cancel)
        })
        .await
        .map_err(|e| ClientError::Node(format!("pow worker: {e}")))??;

        let req = FaucetRequest {
            address: address.to_base58(),
            access_mana_pledge_id: pledge_id,
            consensus_mana_pledge_id: pledge_id,
            pow_nonce,
        };
        let resp: IdResponse = self.post("faucet", &req).await?;
        node_error("faucet", resp.error)?;
        Ok(MessageId::new(resp.id))
    }

    async fn address_outputs(&self, address: &Address) -> Result<Vec<Output>, ClientError> {
        let path = format!("ledgerstate/addresses/{}", address);
        let resp: AddressOutputsResponse = self.get(&path).await?;
        node_error("address outputs", resp.error)?;
        resp.outputs.into_iter().map(Output::try_from).collect()
    }

    async fn submit_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<TransactionId, ClientError> {
        let req = TransactionRequest {
            txn_bytes: TransactionCodec::encode_base64(transaction)?,
        };
        let resp: TransactionResponse = self.post("ledgerstate/transactions", &req).await?;
        node_error("transaction", resp.error)?;
        TransactionId::parse(&resp.transaction_id)
            .map_err(|e| ClientError::Decode(format!("transaction id: {e}")))
    }

    async fn inclusion_state(&self, id: &TransactionId) -> Result<InclusionState, ClientError> {
        let path = format!("ledgerstate/transactions/{}/metadata", id);
        let resp: TransactionMetadataResponse = self.get(&path).await?;
        node_error("transaction metadata", resp.error)?;
        resp.inclusion_state
            .ok_or_else(|| ClientError::Decode("transaction metadata missing inclusionState".into()))
    }
}
