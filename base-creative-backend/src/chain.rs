//! Recording published designs on Base through a wallet bridge
//!

use async_trait::async_trait;
use base_creative_shared::cid::ContentId;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Base mainnet
pub const BASE_CHAIN_ID: u64 = 8453;
pub const SAVE_DESIGN_FUNCTION: &str = "saveDesign";
pub const PLACEHOLDER_CONTRACT_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("chain recording is not configured")]
    NotConfigured,
    #[error("wallet bridge request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("wallet bridge rejected the transaction with status {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected wallet bridge response: {0}")]
    InvalidResponse(String),
}

/// Submits a CID to the design registry contract, returning the transaction hash
#[async_trait]
pub trait ChainRecorder: Send + Sync {
    async fn record(&self, cid: &ContentId) -> Result<String, ChainError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContractCall<'a> {
    chain_id: u64,
    address: &'a str,
    function_name: &'a str,
    args: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct SubmittedTransaction {
    hash: String,
}

/// Hands `saveDesign(cid)` to a wallet bridge holding the connected account
pub struct WalletBridgeRecorder {
    client: reqwest::Client,
    endpoint: String,
    contract_address: String,
    chain_id: u64,
}

impl WalletBridgeRecorder {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        contract_address: &str,
        chain_id: u64,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            contract_address: contract_address.to_string(),
            chain_id,
        }
    }
}

#[async_trait]
impl ChainRecorder for WalletBridgeRecorder {
    #[instrument(level = "info", skip(self), fields(chain_id = self.chain_id))]
    async fn record(&self, cid: &ContentId) -> Result<String, ChainError> {
        let call = ContractCall {
            chain_id: self.chain_id,
            address: &self.contract_address,
            function_name: SAVE_DESIGN_FUNCTION,
            args: [cid.as_str()],
        };

        let response = self
            .client
            .post(format!("{}/v1/contract-calls", self.endpoint))
            .json(&call)
            .send()
            .await
            .map_err(ChainError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::Rejected { status, body });
        }

        let submitted: SubmittedTransaction = response
            .json()
            .await
            .map_err(|err| ChainError::InvalidResponse(err.to_string()))?;
        if submitted.hash.is_empty() {
            return Err(ChainError::InvalidResponse("empty hash".to_string()));
        }

        debug!("Transaction sent: {}", submitted.hash);
        Ok(submitted.hash)
    }
}
