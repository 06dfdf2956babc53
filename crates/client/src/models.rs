use serde::{Deserialize, Serialize};
use std::fmt;

/// A source document available for filtering searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub paper_id: String,
    pub title: String,
    pub pmid: Option<String>,
    pub doi: Option<String>,
    pub source_url: Option<String>,
    pub chunk_count: u32,
}

/// Coarse relevance level assigned by the remote ranker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Med,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Med => "med",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ranked hit. `chunk_id` is the key for a context lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionPointer {
    pub paper_title: String,
    pub paper_id: String,
    pub pmid: Option<String>,
    pub doi: Option<String>,
    pub section_path: String,
    pub page_start: u32,
    pub page_end: u32,
    pub snippets: Vec<String>,
    pub confidence: Confidence,
    pub chunk_id: String,
    pub reranker_score: f64,
}

impl SectionPointer {
    /// `"3"` for a single page, `"3–5"` for a span.
    pub fn page_range(&self) -> String {
        page_range(self.page_start, self.page_end)
    }

    pub fn has_valid_pages(&self) -> bool {
        self.page_end >= self.page_start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<SectionPointer>,
    /// The query after server-side normalization or expansion.
    pub query_used: String,
    pub total: u32,
}

impl QueryResponse {
    /// Results paired with their 1-based rank.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &SectionPointer)> {
        self.results.iter().enumerate().map(|(i, r)| (i + 1, r))
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get_rank(&self, rank: usize) -> Option<&SectionPointer> {
        rank.checked_sub(1).and_then(|i| self.results.get(i))
    }
}

/// An atomic unit of extracted document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub paper_id: String,
    pub chunk_type: String,
    pub section_path: Vec<String>,
    pub page_start: u32,
    pub page_end: u32,
    pub text: String,
}

impl Chunk {
    pub fn page_range(&self) -> String {
        page_range(self.page_start, self.page_end)
    }
}

/// Previous/current/next passages around a chunk. `prev` and `next` are
/// `None` at document boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkContext {
    pub prev: Option<Chunk>,
    pub current: Chunk,
    pub next: Option<Chunk>,
}

impl ChunkContext {
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.prev
            .iter()
            .chain(std::iter::once(&self.current))
            .chain(self.next.iter())
    }
}

/// Body of `POST /api/query`. Unset options are omitted from the JSON so the
/// server defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_query_expansion: Option<bool>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

fn page_range(start: u32, end: u32) -> String {
    if end > start {
        format!("{}–{}", start, end)
    } else {
        start.to_string()
    }
}
