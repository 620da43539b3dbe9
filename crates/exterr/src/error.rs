/// Failures decoding a rendered trace back into frames.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("malformed trace JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed nested trace: expected an object or null, found {0}")]
    NestedShape(&'static str),
}
