use client::{MAX_TOP_N, MIN_TOP_N};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("top_n must be between 1 and 20, got {0}")]
    TopNOutOfRange(u32),
}

/// Parameters accepted by the query controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub paper_id: Option<String>,
    pub top_n: Option<u32>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_paper(mut self, paper_id: impl Into<String>) -> Self {
        self.paper_id = Some(paper_id.into());
        self
    }

    pub fn with_top_n(mut self, top_n: u32) -> Self {
        self.top_n = Some(top_n);
        self
    }
}

/// Raw search form fields, as typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchForm {
    pub query: String,
    /// Empty means "All papers".
    pub paper_id: String,
    pub top_n: u32,
}

impl Default for SearchForm {
    fn default() -> Self {
        Self {
            query: String::new(),
            paper_id: String::new(),
            top_n: client::DEFAULT_TOP_N,
        }
    }
}

impl SearchForm {
    pub fn can_submit(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Validates the form. An empty paper filter becomes `None` so the
    /// gateway searches all papers.
    pub fn submit(&self) -> Result<SearchParams, IntentError> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(IntentError::EmptyQuery);
        }
        if !(MIN_TOP_N..=MAX_TOP_N).contains(&self.top_n) {
            return Err(IntentError::TopNOutOfRange(self.top_n));
        }

        Ok(SearchParams {
            query: query.to_string(),
            paper_id: non_empty(&self.paper_id),
            top_n: Some(self.top_n),
        })
    }
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
