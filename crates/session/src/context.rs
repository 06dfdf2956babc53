use client::{ChunkContext, SectionApi};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::lifecycle::{Lifecycle, Sequencer};

/// Snapshot of the context viewer's state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextState {
    pub selected: Option<String>,
    pub context: Lifecycle<ChunkContext>,
}

/// Fetches the neighborhood of the selected chunk.
///
/// Every change of selection to a new identifier triggers one fetch;
/// reselecting the current identifier does nothing. Clearing the selection
/// drops any in-flight fetch, and between two selections the most recently
/// selected identifier wins regardless of resolution order.
pub struct ContextProvider<A> {
    api: Arc<A>,
    sequencer: Sequencer,
    state: watch::Sender<ContextState>,
}

impl<A: SectionApi> ContextProvider<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (state, _) = watch::channel(ContextState::default());
        Self {
            api,
            sequencer: Sequencer::default(),
            state,
        }
    }

    /// Updates the selected chunk. Returns `true` if a fetch was issued and
    /// its outcome became the visible state.
    pub async fn select(&self, chunk_id: Option<String>) -> bool {
        let Some(chunk_id) = chunk_id else {
            self.clear();
            return false;
        };

        let mut ticket = None;
        self.state.send_if_modified(|state| {
            if state.selected.as_deref() == Some(chunk_id.as_str()) {
                return false;
            }
            ticket = Some(self.sequencer.issue());
            state.selected = Some(chunk_id.clone());
            state.context = Lifecycle::Loading;
            true
        });

        let Some(ticket) = ticket else {
            debug!(chunk_id = %chunk_id, "chunk already selected");
            return false;
        };
        debug!(ticket, chunk_id = %chunk_id, "fetching chunk context");

        let outcome = Lifecycle::from_result(self.api.chunk_context(&chunk_id).await);

        let applied = self.state.send_if_modified(|state| {
            if !self.sequencer.is_current(ticket) {
                return false;
            }
            state.context = outcome;
            true
        });

        if !applied {
            debug!(ticket, chunk_id = %chunk_id, "discarding superseded context response");
        }
        applied
    }

    /// Clears the selection and context; any in-flight fetch becomes stale.
    pub fn clear(&self) {
        self.state.send_modify(|state| {
            self.sequencer.invalidate();
            *state = ContextState::default();
        });
    }

    pub fn state(&self) -> ContextState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ContextState> {
        self.state.subscribe()
    }

    pub fn selected(&self) -> Option<String> {
        self.state.borrow().selected.clone()
    }

    pub fn context(&self) -> Option<ChunkContext> {
        self.state.borrow().context.value().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().context.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().context.error().map(str::to_string)
    }
}
