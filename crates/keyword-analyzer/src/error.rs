use analyzer_common::error::ClientError;

pub const EMPTY_TEXT_MESSAGE: &str = "Please enter a problem statement to analyze.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Please enter a problem statement to analyze.")]
    Validation,

    #[error("config error: {0}")]
    Config(String),
}

impl AppError {
    /// Text shown inline to the user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Client(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
