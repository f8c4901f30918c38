//! Content identifiers
//!

use std::fmt;

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

const CID_VERSION_1: u8 = 0x01;
const RAW_CODEC: u8 = 0x55;
const SHA2_256: u8 = 0x12;
const SHA2_256_LEN: u8 = 0x20;

/// Names an object by a hash of its content, as returned by a storage backend
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// CIDv1 over the raw codec with a sha2-256 multihash, base32 multibase
    pub fn for_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut encoded = Vec::with_capacity(4 + digest.len());
        encoded.extend_from_slice(&[CID_VERSION_1, RAW_CODEC, SHA2_256, SHA2_256_LEN]);
        encoded.extend_from_slice(&digest);
        Self(format!(
            "b{}",
            BASE32_NOPAD.encode(&encoded).to_ascii_lowercase()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `ipfs://{cid}`
    pub fn ipfs_url(&self) -> String {
        format!("ipfs://{}", self.0)
    }

    /// Subdomain-style HTTP gateway URL, e.g. `https://{cid}.ipfs.dweb.link`
    pub fn gateway_url(&self, gateway_host: &str) -> String {
        format!("https://{}.ipfs.{}", self.0, gateway_host)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ContentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
