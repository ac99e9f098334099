use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::model::{AnalysisResult, AnalyzeRequest};

/// Environment variable naming the analysis service base URL. Read both at
/// compile time and at runtime.
pub const API_BASE_ENV: &str = "ANALYZER_API_BASE";
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

const BUILD_TIME_API_BASE: Option<&str> = option_env!("ANALYZER_API_BASE");
const ANALYZE_PATH: &str = "/api/analyze";

/// Pick the first non-blank base URL: build-time value, then runtime value,
/// then the local default.
pub fn resolve_api_base(build_time: Option<&str>, runtime: Option<&str>) -> String {
    [build_time, runtime]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_API_BASE)
        .trim_end_matches('/')
        .to_string()
}

#[derive(Clone, Debug)]
pub struct AnalysisClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl AnalysisClientConfig {
    pub fn from_env() -> Self {
        let runtime_base = std::env::var(API_BASE_ENV).ok();
        let base_url = resolve_api_base(BUILD_TIME_API_BASE, runtime_base.as_deref());

        let timeout = env_parsed::<u64>("ANALYZER_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        let max_error_body_bytes =
            env_parsed::<usize>("ANALYZER_MAX_ERROR_BODY_BYTES").unwrap_or(8 * 1024);

        Self {
            base_url,
            timeout,
            max_error_body_bytes,
        }
    }

    /// Defaults with an explicit base URL.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: resolve_api_base(Some(base_url), None),
            timeout: Duration::from_secs(30),
            max_error_body_bytes: 8 * 1024,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparseable environment value");
            None
        }
    }
}

/// HTTP client for the external keyword analysis service.
///
/// One request per call. Failures are returned as-is; retrying is left to the
/// caller.
#[derive(Clone)]
pub struct AnalysisClient {
    config: AnalysisClientConfig,
    http: reqwest::Client,
}

impl AnalysisClient {
    pub fn new(config: AnalysisClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent("keyword-analyzer")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &AnalysisClientConfig {
        &self.config
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.config.base_url, ANALYZE_PATH)
    }

    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, ClientError> {
        let url = self.analyze_url();
        let started = Instant::now();
        let resp = self
            .http
            .post(&url)
            .timeout(self.config.timeout)
            .json(request)
            .send()
            .await?;
        let result: AnalysisResult =
            Self::parse_json_response(resp, self.config.max_error_body_bytes).await?;
        debug!(
            category = %request.category,
            matches = result.matches.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "analyze response decoded"
        );
        Ok(result)
    }

    async fn parse_json_response<T: for<'de> Deserialize<'de>>(
        resp: reqwest::Response,
        max_error_body_bytes: usize,
    ) -> Result<T, ClientError> {
        if resp.status().is_success() {
            let body = resp.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }
        Err(Self::to_upstream_error(resp, max_error_body_bytes).await)
    }

    async fn to_upstream_error(resp: reqwest::Response, max_error_body_bytes: usize) -> ClientError {
        let status = resp.status();
        let body = read_limited_text(resp, max_error_body_bytes).await;
        let detail = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|envelope| envelope.detail)
            .and_then(detail_text);
        match detail {
            Some(detail) => ClientError::Upstream { status, detail },
            None => ClientError::UpstreamBody { status, body },
        }
    }
}

/// FastAPI-style error body. `detail` is usually a string but validation
/// failures send a list of objects.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    detail: Option<Value>,
}

fn detail_text(detail: Value) -> Option<String> {
    match detail {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Read at most `max_bytes` of the body; the rest is never pulled off the wire.
async fn read_limited_text(mut resp: reqwest::Response, max_bytes: usize) -> String {
    let mut buf: Vec<u8> = Vec::new();
    while buf.len() < max_bytes {
        match resp.chunk().await {
            Ok(Some(chunk)) => {
                let room = max_bytes - buf.len();
                buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "failed to read upstream error body");
                if buf.is_empty() {
                    return "<failed to read error body>".to_string();
                }
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}
