//! In-memory `SectionApi` used by the controller tests. In gated mode every
//! call parks until the test releases it, so tests decide resolution order.

use async_trait::async_trait;
use client::{
    ApiError, ApiResult, Chunk, ChunkContext, Confidence, Paper, QueryRequest, QueryResponse,
    SectionApi, SectionPointer,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::{oneshot, Notify};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query(QueryRequest),
    Papers,
    Context(String),
}

#[derive(Default)]
pub struct FakeApi {
    gated: bool,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
    gates: Mutex<HashMap<String, oneshot::Sender<()>>>,
    gate_opened: Notify,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::default()
        }
    }

    /// Calls with this key answer HTTP 500 `internal error`.
    pub fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn query_calls(&self) -> Vec<QueryRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Query(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn context_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Context(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub async fn wait_for_pending(&self, count: usize) {
        loop {
            if self.gates.lock().unwrap().len() >= count {
                return;
            }
            self.gate_opened.notified().await;
        }
    }

    pub fn release(&self, key: &str) {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .remove(key)
            .unwrap_or_else(|| panic!("no pending call for {key}"));
        let _ = gate.send(());
    }

    async fn enter(&self, call: Call, key: String) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call);

        if self.gated {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(key.clone(), tx);
            self.gate_opened.notify_one();
            let _ = rx.await;
        }

        if self.failing.lock().unwrap().contains(&key) {
            return Err(ApiError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SectionApi for FakeApi {
    async fn submit_query(&self, request: &QueryRequest) -> ApiResult<QueryResponse> {
        let key = format!("query:{}", request.query);
        self.enter(Call::Query(request.clone()), key).await?;
        Ok(response_for(&request.query))
    }

    async fn list_papers(&self) -> ApiResult<Vec<Paper>> {
        self.enter(Call::Papers, "papers".to_string()).await?;
        Ok(vec![paper("p1", "Cardiac safety of compound X"), paper("p2", "Hepatotoxicity panel")])
    }

    async fn chunk_context(&self, chunk_id: &str) -> ApiResult<ChunkContext> {
        let key = format!("context:{chunk_id}");
        self.enter(Call::Context(chunk_id.to_string()), key).await?;
        Ok(context_for(chunk_id))
    }
}

pub fn paper(id: &str, title: &str) -> Paper {
    Paper {
        paper_id: id.to_string(),
        title: title.to_string(),
        pmid: None,
        doi: None,
        source_url: None,
        chunk_count: 12,
    }
}

pub fn chunk(id: &str) -> Chunk {
    Chunk {
        chunk_id: id.to_string(),
        paper_id: "p1".to_string(),
        chunk_type: "paragraph".to_string(),
        section_path: vec!["Results".to_string()],
        page_start: 3,
        page_end: 3,
        text: format!("passage {id}"),
    }
}

pub fn context_for(chunk_id: &str) -> ChunkContext {
    ChunkContext {
        prev: Some(chunk(&format!("{chunk_id}-prev"))),
        current: chunk(chunk_id),
        next: None,
    }
}

pub fn response_for(query: &str) -> QueryResponse {
    QueryResponse {
        results: vec![SectionPointer {
            paper_title: "Cardiac safety of compound X".to_string(),
            paper_id: "p1".to_string(),
            pmid: Some("12345".to_string()),
            doi: None,
            section_path: "Results > QT".to_string(),
            page_start: 3,
            page_end: 4,
            snippets: vec![format!("about {query}")],
            confidence: Confidence::High,
            chunk_id: format!("{query}-c1"),
            reranker_score: 0.9,
        }],
        query_used: query.to_string(),
        total: 1,
    }
}
