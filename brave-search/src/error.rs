use brave_http::HttpError;
use thiserror::Error;

/// Terminal failure of a block invocation or API call.
///
/// Every variant aborts the invocation; nothing here is retried.
#[derive(Debug, Error)]
pub enum BlockError {
    /// Rejected before any network call.
    #[error("{message}")]
    InvalidInput { field: String, message: String },

    /// Non-success HTTP status from the provider.
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        /// Raw response text; error bodies are not guaranteed to be JSON.
        body: String,
    },

    #[error("failed to reach Brave Search API: {0}")]
    Transport(String),

    /// The subscription does not cover the requested capability.
    #[error("{0}")]
    FeatureUnavailable(String),

    #[error("unreadable provider response: {0}")]
    Decode(String),

    #[error("client setup failed: {0}")]
    Client(String),

    #[error("unknown block: {0}")]
    UnknownBlock(String),

    #[error("event emission failed: {0}")]
    Emit(String),
}

impl BlockError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        BlockError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BlockError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 4xx from the provider: usually a bad key or bad parameters.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// 5xx from the provider.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }
}

impl From<HttpError> for BlockError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Api {
                status,
                message,
                body,
            } => BlockError::Upstream {
                status: status.as_u16(),
                message,
                body,
            },
            HttpError::Network(msg) => BlockError::Transport(msg),
            HttpError::Decode(msg, snippet) => {
                BlockError::Decode(format!("{msg}, body_snippet: {snippet}"))
            }
            HttpError::Url(msg) | HttpError::Build(msg) => BlockError::Client(msg),
        }
    }
}
