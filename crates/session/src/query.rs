use client::{QueryRequest, QueryResponse, SectionApi};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::intent::{non_empty, SearchParams};
use crate::lifecycle::{Lifecycle, Sequencer};

/// Owns the search request lifecycle.
///
/// Out-of-order completions are resolved last-issued-wins: a response is
/// only published if no newer search was issued after it. While a newer
/// search is outstanding the state stays `Loading`.
pub struct QueryController<A> {
    api: Arc<A>,
    use_query_expansion: Option<bool>,
    sequencer: Sequencer,
    state: watch::Sender<Lifecycle<QueryResponse>>,
}

impl<A: SectionApi> QueryController<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (state, _) = watch::channel(Lifecycle::Idle);
        Self {
            api,
            use_query_expansion: None,
            sequencer: Sequencer::default(),
            state,
        }
    }

    /// Sends `use_query_expansion` with every search. Unset leaves the
    /// server default in place.
    pub fn with_query_expansion(mut self, enabled: bool) -> Self {
        self.use_query_expansion = Some(enabled);
        self
    }

    /// Issues a search. Returns `true` if this request's outcome became the
    /// visible state, `false` if a newer search superseded it.
    pub async fn search(&self, params: SearchParams) -> bool {
        let request = QueryRequest {
            query: params.query,
            paper_id: params.paper_id.as_deref().and_then(non_empty),
            top_n: params.top_n,
            use_query_expansion: self.use_query_expansion,
        };

        let mut ticket = 0;
        self.state.send_modify(|state| {
            ticket = self.sequencer.issue();
            *state = Lifecycle::Loading;
        });
        debug!(ticket, query = %request.query, paper_id = ?request.paper_id, "issuing search");

        let outcome = Lifecycle::from_result(self.api.submit_query(&request).await);

        let applied = self.state.send_if_modified(|state| {
            if !self.sequencer.is_current(ticket) {
                return false;
            }
            *state = outcome;
            true
        });

        if applied {
            debug!(ticket, state = self.state.borrow().label(), "search settled");
        } else {
            debug!(ticket, "discarding superseded search response");
        }
        applied
    }

    pub fn state(&self) -> Lifecycle<QueryResponse> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Lifecycle<QueryResponse>> {
        self.state.subscribe()
    }

    pub fn results(&self) -> Option<QueryResponse> {
        self.state.borrow().value().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error().map(str::to_string)
    }
}
