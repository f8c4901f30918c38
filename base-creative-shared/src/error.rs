#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("data url is not base64 encoded")]
    NotBase64DataUrl,
    #[error("failed to decode image payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}
