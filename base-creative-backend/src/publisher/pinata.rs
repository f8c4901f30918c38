//! Pinata pinning gateway
//!

use async_trait::async_trait;
use base_creative_shared::artifact::NamedBlob;
use base_creative_shared::cid::ContentId;
use base_creative_shared::metadata::ArtifactMetadata;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::{send_json, PublisherBackend};
use crate::error::PublishError;

pub const DEFAULT_PINATA_ENDPOINT: &str = "https://api.pinata.cloud";
const BACKEND: &str = "pinata";

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Relays uploads through the Pinata HTTP API, authenticated with a key pair
pub struct PinataBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    secret_api_key: Option<String>,
}

impl PinataBackend {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        api_key: Option<String>,
        secret_api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|v| !v.is_empty()),
            secret_api_key: secret_api_key.filter(|v| !v.is_empty()),
        }
    }

    fn credentials(&self) -> Result<(&str, &str), PublishError> {
        match (self.api_key.as_deref(), self.secret_api_key.as_deref()) {
            (Some(key), Some(secret)) => Ok((key, secret)),
            _ => Err(PublishError::MissingCredentials(
                "Server missing IPFS keys: PINATA_API_KEY and PINATA_SECRET_API_KEY must be set"
                    .to_string(),
            )),
        }
    }

    fn pin(&self, path: &str) -> Result<reqwest::RequestBuilder, PublishError> {
        let (key, secret) = self.credentials()?;
        Ok(self
            .client
            .post(format!("{}/pinning/{}", self.endpoint, path))
            .header("pinata_api_key", key)
            .header("pinata_secret_api_key", secret))
    }
}

#[async_trait]
impl PublisherBackend for PinataBackend {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn ensure_configured(&self) -> Result<(), PublishError> {
        self.credentials().map(|_| ())
    }

    #[instrument(level = "debug", skip_all, fields(filename = %blob.filename, bytes = blob.len()))]
    async fn upload_image(
        &self,
        blob: &NamedBlob,
        display_name: &str,
    ) -> Result<ContentId, PublishError> {
        let file = Part::bytes(blob.bytes.clone())
            .file_name(blob.filename.clone())
            .mime_str(&blob.mime_type)
            .map_err(|source| PublishError::Build {
                backend: BACKEND,
                source,
            })?;

        let form = Form::new()
            .part("file", file)
            .text(
                "pinataMetadata",
                json!({ "name": format!("BaseCreative Image - {display_name}") }).to_string(),
            )
            .text("pinataOptions", json!({ "cidVersion": 1 }).to_string());

        let request = self.pin("pinFileToIPFS")?.multipart(form);
        let response: PinResponse = send_json(BACKEND, request).await?;
        debug!("Pinned image as {}", response.ipfs_hash);
        pinned_cid(response)
    }

    #[instrument(level = "debug", skip_all, fields(name = %metadata.name))]
    async fn upload_metadata(
        &self,
        metadata: &ArtifactMetadata,
    ) -> Result<ContentId, PublishError> {
        let body = json!({
            "pinataContent": metadata,
            "pinataMetadata": {
                "name": format!("BaseCreative Metadata - {}", metadata.name),
            },
        });

        let request = self.pin("pinJSONToIPFS")?.json(&body);
        let response: PinResponse = send_json(BACKEND, request).await?;
        debug!("Pinned metadata as {}", response.ipfs_hash);
        pinned_cid(response)
    }

    fn image_ref(&self, cid: &ContentId, _blob: &NamedBlob) -> String {
        cid.ipfs_url()
    }
}

fn pinned_cid(response: PinResponse) -> Result<ContentId, PublishError> {
    if response.ipfs_hash.is_empty() {
        return Err(PublishError::InvalidResponse {
            backend: BACKEND,
            message: "empty IpfsHash".to_string(),
        });
    }
    Ok(ContentId::new(response.ipfs_hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base_creative_shared::metadata::TOOL_NAME;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> PinataBackend {
        PinataBackend::new(
            reqwest::Client::new(),
            &server.uri(),
            Some("key".to_string()),
            Some("secret".to_string()),
        )
    }

    #[tokio::test]
    async fn test_pin_file_and_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pinning/pinFileToIPFS"))
            .and(header("pinata_api_key", "key"))
            .and(header("pinata_secret_api_key", "secret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"IpfsHash": "bafy123", "PinSize": 10})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/pinning/pinJSONToIPFS"))
            .and(body_partial_json(json!({
                "pinataContent": {"image": "ipfs://bafy123"},
                "pinataMetadata": {"name": "BaseCreative Metadata - My Design"},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"IpfsHash": "bafy456"})))
            .expect(1)
            .mount(&server)
            .await;

        let backend = backend(&server);
        let blob = NamedBlob::png(vec![0u8; 10]);
        let image_cid = backend.upload_image(&blob, "My Design").await.unwrap();
        assert_eq!(image_cid.as_str(), "bafy123");
        assert_eq!(backend.image_ref(&image_cid, &blob), "ipfs://bafy123");

        let metadata = ArtifactMetadata::build("My Design", None, "ipfs://bafy123", TOOL_NAME);
        let metadata_cid = backend.upload_metadata(&metadata).await.unwrap();
        assert_eq!(metadata_cid.as_str(), "bafy456");
    }

    #[tokio::test]
    async fn test_server_error_is_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("nope"))
            .mount(&server)
            .await;

        let err = backend(&server)
            .upload_image(&NamedBlob::png(vec![1, 2, 3]), "x")
            .await
            .unwrap_err();
        match err {
            PublishError::Status { status, body, .. } => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "nope");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_credentials_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let backend = PinataBackend::new(
            reqwest::Client::new(),
            &server.uri(),
            Some("key".to_string()),
            Some(String::new()),
        );
        assert!(matches!(
            backend.ensure_configured(),
            Err(PublishError::MissingCredentials(_))
        ));
        assert!(matches!(
            backend.upload_image(&NamedBlob::png(vec![1]), "x").await,
            Err(PublishError::MissingCredentials(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_mime_type_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let blob = NamedBlob {
            bytes: vec![1, 2, 3],
            mime_type: "not a mime type".to_string(),
            filename: "design.bin".to_string(),
        };
        assert!(matches!(
            backend(&server).upload_image(&blob, "x").await,
            Err(PublishError::Build { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_hash_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"IpfsHash": ""})))
            .mount(&server)
            .await;

        assert!(matches!(
            backend(&server)
                .upload_image(&NamedBlob::png(vec![1]), "x")
                .await,
            Err(PublishError::InvalidResponse { .. })
        ));
    }
}
