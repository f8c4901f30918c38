//! Cli things
//!

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::chain::{ChainRecorder, WalletBridgeRecorder, BASE_CHAIN_ID, PLACEHOLDER_CONTRACT_ADDRESS};
use crate::publisher::pinata::DEFAULT_PINATA_ENDPOINT;
use crate::publisher::web3storage::{DEFAULT_GATEWAY_HOST, DEFAULT_WEB3_STORAGE_ENDPOINT};
use crate::publisher::{MemoryBackend, PinataBackend, PublisherBackend, Web3StorageBackend};

pub fn db_path_default() -> String {
    shellexpand::tilde("~/.cache/base-creative.sqlite3").to_string()
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum BackendKind {
    /// Pinata pinning gateway, API key + secret
    Pinata,
    /// web3.storage upload API, bearer token
    Web3Storage,
    /// In-process store, nothing leaves the machine
    Memory,
}

#[derive(Parser, Debug)]
pub struct CliOpts {
    #[clap(long, help = "Path to the database file", env = "BASE_CREATIVE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    #[clap(long, help = "Enable debug logging")]
    pub debug: bool,

    #[clap(
        long,
        value_enum,
        default_value = "pinata",
        help = "Storage backend designs are published to",
        env = "BASE_CREATIVE_BACKEND"
    )]
    pub backend: BackendKind,

    #[clap(long, env = "PINATA_API_KEY", hide_env_values = true)]
    pub pinata_api_key: Option<String>,

    #[clap(long, env = "PINATA_SECRET_API_KEY", hide_env_values = true)]
    pub pinata_secret_api_key: Option<String>,

    #[clap(long, default_value = DEFAULT_PINATA_ENDPOINT, env = "PINATA_ENDPOINT")]
    pub pinata_endpoint: String,

    #[clap(long, env = "WEB3_STORAGE_TOKEN", hide_env_values = true)]
    pub web3_storage_token: Option<String>,

    #[clap(long, default_value = DEFAULT_WEB3_STORAGE_ENDPOINT, env = "WEB3_STORAGE_ENDPOINT")]
    pub web3_storage_endpoint: String,

    #[clap(
        long,
        default_value = DEFAULT_GATEWAY_HOST,
        help = "Host used for subdomain gateway image links",
        env = "BASE_CREATIVE_GATEWAY_HOST"
    )]
    pub gateway_host: String,

    #[clap(
        long,
        default_value_t = 30,
        help = "Timeout for each upload request, in seconds",
        env = "BASE_CREATIVE_UPLOAD_TIMEOUT_SECS"
    )]
    pub upload_timeout_secs: u64,

    #[clap(
        long,
        help = "external_url written into published metadata",
        env = "BASE_CREATIVE_EXTERNAL_URL"
    )]
    pub external_url: Option<String>,

    #[clap(
        long,
        help = "Wallet bridge that submits contract calls, chain recording is disabled without it",
        env = "BASE_CREATIVE_WALLET_BRIDGE_URL"
    )]
    pub wallet_bridge_url: Option<String>,

    #[clap(long, default_value = PLACEHOLDER_CONTRACT_ADDRESS, env = "BASE_CREATIVE_CONTRACT_ADDRESS")]
    pub contract_address: String,

    #[clap(long, default_value_t = BASE_CHAIN_ID, env = "BASE_CREATIVE_CHAIN_ID")]
    pub chain_id: u64,
}

impl CliOpts {
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    /// Upper bound for a whole publish request: two uploads plus local work
    pub fn request_timeout(&self) -> Duration {
        self.upload_timeout() * 2 + Duration::from_secs(10)
    }

    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.upload_timeout())
            .user_agent(concat!("base-creative/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    /// Credentials are checked per publish, so a backend is built even when they are missing
    pub fn publisher(&self, client: reqwest::Client) -> Arc<dyn PublisherBackend> {
        match self.backend {
            BackendKind::Pinata => Arc::new(PinataBackend::new(
                client,
                &self.pinata_endpoint,
                self.pinata_api_key.clone(),
                self.pinata_secret_api_key.clone(),
            )),
            BackendKind::Web3Storage => Arc::new(Web3StorageBackend::new(
                client,
                &self.web3_storage_endpoint,
                self.web3_storage_token.clone(),
                &self.gateway_host,
            )),
            BackendKind::Memory => Arc::new(MemoryBackend::new()),
        }
    }

    pub fn chain_recorder(&self, client: reqwest::Client) -> Option<Arc<dyn ChainRecorder>> {
        self.wallet_bridge_url.as_deref().map(|endpoint| {
            Arc::new(WalletBridgeRecorder::new(
                client,
                endpoint,
                &self.contract_address,
                self.chain_id,
            )) as Arc<dyn ChainRecorder>
        })
    }
}
