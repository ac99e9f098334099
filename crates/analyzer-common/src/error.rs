/// Errors raised while talking to the external analysis service.
///
/// Application crates wrap `ClientError` via `#[from]` and surface it to the user
/// through [`ClientError::user_message`].
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("upstream returned error: status={status} detail={detail}")]
    Upstream { status: StatusCode, detail: String },

    #[error("upstream returned error without detail: status={status}")]
    UpstreamBody { status: StatusCode, body: String },
}

impl ClientError {
    /// The message to show inline: the server's `detail` when it sent one,
    /// otherwise the transport/decoding error text. Every variant's display
    /// text carries a fixed prefix, so the result is never blank.
    pub fn user_message(&self) -> String {
        if let ClientError::Upstream { detail, .. } = self {
            if !detail.trim().is_empty() {
                return detail.clone();
            }
        }
        self.to_string()
    }

    /// HTTP status of a non-success response, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Upstream { status, .. } | ClientError::UpstreamBody { status, .. } => {
                Some(*status)
            }
            ClientError::Request(e) => e.status(),
            ClientError::InvalidJson(_) => None,
        }
    }
}
