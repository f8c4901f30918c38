
use crate::chain::{WalletBridgeRecorder, BASE_CHAIN_ID, PLACEHOLDER_CONTRACT_ADDRESS};
use crate::gallery::GalleryStore;
use crate::publisher::{MemoryBackend, PinataBackend, PublisherBackend};
use crate::{build_app, AppState, SharedState};
use axum::http::StatusCode;
use axum_test::*;
use base_creative_shared::api::{ErrorResponse, PublishDesignResponse, RecordDesignResponse};
use base_creative_shared::gallery::GalleryEntry;
use serde_json::json;
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

/// "hello" is not a PNG but the service does not inspect the bytes
const IMAGE_DATA_URL: &str = "data:image/png;base64,aGVsbG8=";

async fn setup_test_server(publisher: Arc<dyn PublisherBackend>) -> (TestServer, SharedState) {
    setup_test_server_with_timeout(publisher, Duration::from_secs(10)).await
}

async fn setup_test_server_with_timeout(
    publisher: Arc<dyn PublisherBackend>,
    request_timeout: Duration,
) -> (TestServer, SharedState) {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new(
                "base_creative_backend=debug,tower_http=debug",
            ))
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
    let appstate = AppState::test(publisher).await;
    let shared_state = Arc::new(RwLock::new(appstate));
    let app: axum::Router = build_app(&shared_state, request_timeout);

    (TestServer::new(app).unwrap(), shared_state)
}

fn pinata(server: &MockServer, key: Option<&str>) -> Arc<dyn PublisherBackend> {
    Arc::new(PinataBackend::new(
        reqwest::Client::new(),
        &server.uri(),
        key.map(str::to_string),
        key.map(str::to_string),
    ))
}

async fn gallery(server: &TestServer) -> Vec<GalleryEntry> {
    let res = server.get("/api/v1/gallery").await;
    res.assert_status_ok();
    res.json()
}

#[tokio::test]
async fn test_api_publish_memory_backend() {
    let (server, _) = setup_test_server(Arc::new(MemoryBackend::new())).await;

    assert!(gallery(&server).await.is_empty());

    let res = server
        .post("/api/v1/ipfs")
        .json(&json!({
            "image": IMAGE_DATA_URL,
            "name": "My Design",
        }))
        .await;
    res.assert_status_ok();
    let published: PublishDesignResponse = res.json();
    info!("published {:?}", published);
    assert!(published.success);
    assert_eq!(
        published.image_cid.as_str(),
        "bafkreibm6jg3ux5qumhcn2b3flc3tyu6dmlb4xa7u5bf44yegnrjhc4yeq"
    );
    assert_eq!(published.ipfs_url, published.metadata_cid.ipfs_url());

    let entries = gallery(&server).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].cid, published.metadata_cid);
    assert_eq!(entries[0].image, published.image_cid.ipfs_url());
    assert_eq!(entries[0].name, "My Design");
}

#[tokio::test]
async fn test_api_publish_missing_image() {
    let (server, _) = setup_test_server(Arc::new(MemoryBackend::new())).await;

    for body in [
        json!({"name": "My Design"}),
        json!({"image": IMAGE_DATA_URL}),
        json!({"image": "", "name": "My Design"}),
    ] {
        let res = server.post("/api/v1/ipfs").json(&body).await;
        res.assert_status(StatusCode::BAD_REQUEST);
        let err: ErrorResponse = res.json();
        assert_eq!(err.error, "Missing image data");
    }

    let res = server
        .post("/api/v1/ipfs")
        .json(&json!({"image": "data:image/png;base64,???", "name": "x"}))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);

    assert!(gallery(&server).await.is_empty());
}

#[tokio::test]
async fn test_api_publish_without_credentials() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock)
        .await;

    let (server, _) = setup_test_server(pinata(&mock, None)).await;
    let res = server
        .post("/api/v1/ipfs")
        .json(&json!({"image": IMAGE_DATA_URL, "name": "My Design"}))
        .await;
    res.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let err: ErrorResponse = res.json();
    assert!(err.error.contains("missing configuration"));
}

#[tokio::test]
async fn test_api_publish_gateway_failure() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinJSONToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"IpfsHash": "bafy456"})))
        .expect(0)
        .mount(&mock)
        .await;

    let (server, _) = setup_test_server(pinata(&mock, Some("key"))).await;
    let res = server
        .post("/api/v1/ipfs")
        .json(&json!({"image": IMAGE_DATA_URL, "name": "My Design"}))
        .await;
    res.assert_status(StatusCode::BAD_GATEWAY);
    let err: ErrorResponse = res.json();
    assert!(!err.error.is_empty());

    assert!(gallery(&server).await.is_empty());
}

#[tokio::test]
async fn test_api_publish_metadata_failure() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"IpfsHash": "bafy123"})))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinJSONToIPFS"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock)
        .await;

    let (server, _) = setup_test_server(pinata(&mock, Some("key"))).await;
    let res = server
        .post("/api/v1/ipfs")
        .json(&json!({"image": IMAGE_DATA_URL, "name": "My Design"}))
        .await;
    res.assert_status(StatusCode::BAD_GATEWAY);
    let err: ErrorResponse = res.json();
    assert!(err.error.contains("500"));

    assert!(gallery(&server).await.is_empty());
}

#[tokio::test]
async fn test_api_publish_outlives_request_timeout() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"IpfsHash": "bafy123"})))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinJSONToIPFS"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"IpfsHash": "bafy456"}))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&mock)
        .await;

    let (server, state) =
        setup_test_server_with_timeout(pinata(&mock, Some("key")), Duration::from_millis(200))
            .await;
    let res = server
        .post("/api/v1/ipfs")
        .json(&json!({"image": IMAGE_DATA_URL, "name": "My Design"}))
        .await;
    res.assert_status(StatusCode::REQUEST_TIMEOUT);
    let err: ErrorResponse = res.json();
    assert_eq!(err.error, "request timed out");

    let store = state.read().await.gallery.clone();
    let mut entries: Vec<GalleryEntry> = Vec::new();
    for _ in 0..50 {
        entries = store.read().await.unwrap();
        if !entries.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].cid.as_str(), "bafy456");
    assert_eq!(entries[0].image, "ipfs://bafy123");
}

#[tokio::test]
async fn test_api_publish_gateway_success() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"IpfsHash": "bafy123"})))
        .expect(1)
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinJSONToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"IpfsHash": "bafy456"})))
        .expect(1)
        .mount(&mock)
        .await;

    let (server, _) = setup_test_server(pinata(&mock, Some("key"))).await;
    let res = server
        .post("/api/v1/ipfs")
        .json(&json!({"image": IMAGE_DATA_URL, "name": "My Design"}))
        .await;
    res.assert_status_ok();
    res.assert_json(&json!({
        "success": true,
        "imageCid": "bafy123",
        "metadataCid": "bafy456",
        "ipfsUrl": "ipfs://bafy456",
    }));

    let entries = gallery(&server).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].image, "ipfs://bafy123");
}

#[tokio::test]
async fn test_api_record_design() {
    let (server, state) = setup_test_server(Arc::new(MemoryBackend::new())).await;

    let res = server.post("/api/v1/design/bafy456/record").await;
    res.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let bridge = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/contract-calls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hash": "0xfeed"})))
        .expect(1)
        .mount(&bridge)
        .await;
    state.write().await.chain = Some(Arc::new(WalletBridgeRecorder::new(
        reqwest::Client::new(),
        &bridge.uri(),
        PLACEHOLDER_CONTRACT_ADDRESS,
        BASE_CHAIN_ID,
    )));

    let res = server.post("/api/v1/design/bafy456/record").await;
    res.assert_status_ok();
    let recorded: RecordDesignResponse = res.json();
    assert_eq!(recorded.cid.as_str(), "bafy456");
    assert_eq!(recorded.transaction_hash, "0xfeed");
}

#[tokio::test]
async fn test_api_openapi_doc() {
    let (server, _) = setup_test_server(Arc::new(MemoryBackend::new())).await;
    let res = server.get("/api/v1/openapi.json").await;
    res.assert_status_ok();
    let doc: serde_json::Value = res.json();
    assert!(doc["paths"].get("/api/v1/ipfs").is_some());
    assert!(doc["paths"].get("/api/v1/gallery").is_some());
}
