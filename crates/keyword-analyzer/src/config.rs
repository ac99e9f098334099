use std::path::PathBuf;

use analyzer_common::client::{resolve_api_base, AnalysisClientConfig};

use crate::error::AppError;

/// Application configuration, resolved once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// Analysis service endpoint, timeout and error-body cap.
    pub client: AnalysisClientConfig,
    /// Directory that receives `analyzer_matches.csv`.
    pub export_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `ANALYZER_API_BASE`: service base URL (a value baked in at build time wins)
    /// - `ANALYZER_TIMEOUT_SECS`: request timeout, default 30
    /// - `ANALYZER_MAX_ERROR_BODY_BYTES`: cap on error bodies read, default 8192
    /// - `ANALYZER_EXPORT_DIR`: CSV export directory, default the working directory
    pub fn from_env() -> Result<Self, AppError> {
        let export_dir = match std::env::var("ANALYZER_EXPORT_DIR") {
            Ok(dir) if dir.trim().is_empty() => {
                return Err(AppError::Config(
                    "ANALYZER_EXPORT_DIR is set but empty".to_string(),
                ));
            }
            Ok(dir) => PathBuf::from(dir),
            Err(_) => PathBuf::from("."),
        };

        Ok(Self {
            client: AnalysisClientConfig::from_env(),
            export_dir,
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, api_base: Option<&str>, out_dir: Option<PathBuf>) -> Self {
        if let Some(base) = api_base.filter(|b| !b.trim().is_empty()) {
            self.client.base_url = resolve_api_base(Some(base), None);
        }
        if let Some(dir) = out_dir {
            self.export_dir = dir;
        }
        self
    }
}
