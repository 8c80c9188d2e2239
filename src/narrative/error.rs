use thiserror::Error;

/// Errors from narrative generation.
#[derive(Debug, Error)]
pub enum NarrativeError {
    /// No model is configured.
    #[error("language model not configured: {0}")]
    NotConfigured(String),

    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The model API returned a non-2xx status.
    #[error("model API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The model returned no candidates.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The model output could not be interpreted.
    #[error("could not parse model output: {0}")]
    Parse(String),

    /// A store read needed for the narrative failed.
    #[error("store error: {0}")]
    Store(#[source] anyhow::Error),
}

impl NarrativeError {
    /// Whether another attempt could succeed.
    ///
    /// Client errors other than 429 and missing configuration are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            NarrativeError::NotConfigured(_) | NarrativeError::Store(_) => false,
            NarrativeError::Api { status, .. } => *status == 429 || *status >= 500,
            NarrativeError::Http { .. } | NarrativeError::EmptyResponse | NarrativeError::Parse(_) => {
                true
            }
        }
    }
}
