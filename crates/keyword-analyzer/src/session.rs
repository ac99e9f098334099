/// Analyzer session: the text being analyzed, the chosen category, and the
/// outcome of the latest analyze call.
///
/// A result is only ever replaced or cleared as a whole. Responses are applied
/// in arrival order with no request fencing, and `clear` does not cancel a call
/// that is still in flight.
use std::path::Path;

use analyzer_common::client::AnalysisClient;
use analyzer_common::error::ClientError;
use analyzer_common::model::{AnalysisResult, AnalyzeRequest, Category};
use tracing::{info, warn};

use crate::error::AppError;
use crate::export::save_csv;
use crate::highlight::{highlight_matches, HighlightSpan};

#[derive(Debug, Default)]
pub struct AnalyzerSession {
    text: String,
    category: Category,
    loading: bool,
    result: Option<AnalysisResult>,
    error: Option<String>,
}

impl AnalyzerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Inline message for the last validation or request failure.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Reset the previous outcome and validate the input.
    ///
    /// On success the session is marked loading and the request to send is
    /// returned. Blank text fails with [`AppError::Validation`] and nothing is
    /// sent.
    pub fn begin_analyze(&mut self) -> Result<AnalyzeRequest, AppError> {
        self.error = None;
        self.result = None;

        if self.text.trim().is_empty() {
            let err = AppError::Validation;
            self.error = Some(err.user_message());
            return Err(err);
        }

        self.loading = true;
        Ok(AnalyzeRequest::new(self.text.clone(), self.category))
    }

    /// Store a successful response, replacing whatever was there.
    pub fn complete(&mut self, result: AnalysisResult) {
        self.result = Some(result);
        self.error = None;
        self.loading = false;
    }

    /// Store a failed response. The previous result is dropped so stale and
    /// current outcomes are never shown together.
    pub fn fail(&mut self, err: &ClientError) {
        warn!(error = %err, status = ?err.status(), "analysis request failed");
        self.result = None;
        self.error = Some(err.user_message());
        self.loading = false;
    }

    /// Run one analyze round trip against `client`.
    pub async fn analyze(&mut self, client: &AnalysisClient) -> Result<(), AppError> {
        let request = self.begin_analyze()?;
        match client.analyze(&request).await {
            Ok(result) => {
                info!(
                    category = %request.category,
                    relevant = result.relevant,
                    matches = result.matches.len(),
                    "analysis complete"
                );
                self.complete(result);
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e.into())
            }
        }
    }

    /// Empty the text and drop the result and error.
    pub fn clear(&mut self) {
        self.text.clear();
        self.result = None;
        self.error = None;
    }

    /// Highlighted rendering of the current text, if there is a result.
    pub fn preview(&self) -> Option<Vec<HighlightSpan>> {
        self.result
            .as_ref()
            .map(|result| highlight_matches(&self.text, &result.matches))
    }

    /// Write the current matches to `analyzer_matches.csv` in `dir`. No result
    /// or no matches means nothing is written.
    pub fn export_csv(&self, dir: &Path) {
        if let Some(result) = &self.result {
            save_csv(&result.matches, dir);
        }
    }
}
