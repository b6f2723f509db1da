/// Errors from asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("glTF parse error: {0}")]
    GltfParse(String),
    #[error("unsupported buffer uri: {0}")]
    UnsupportedUri(String),
    #[error("accessor {index}: {reason}")]
    Accessor { index: usize, reason: String },
    #[error("loader stopped before reporting a result")]
    Interrupted,
}
