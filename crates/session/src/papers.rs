use client::{Paper, SectionApi};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::lifecycle::Lifecycle;

/// Loads the list of papers for the filter control, once.
pub struct PaperDirectory<A> {
    api: Arc<A>,
    activated: AtomicBool,
    state: watch::Sender<Lifecycle<Vec<Paper>>>,
}

impl<A: SectionApi> PaperDirectory<A> {
    pub fn new(api: Arc<A>) -> Self {
        let (state, _) = watch::channel(Lifecycle::Idle);
        Self {
            api,
            activated: AtomicBool::new(false),
            state,
        }
    }

    /// Fetches the paper list on the first call. Later calls return `false`
    /// without touching the network, including after a failed fetch.
    pub async fn activate(&self) -> bool {
        if self.activated.swap(true, Ordering::SeqCst) {
            return false;
        }

        self.state.send_replace(Lifecycle::Loading);
        let result = self.api.list_papers().await;

        match &result {
            Ok(papers) => debug!(count = papers.len(), "paper directory loaded"),
            Err(e) => warn!(error = %e, "failed to load paper directory"),
        }
        self.state.send_replace(Lifecycle::from_result(result));
        true
    }

    /// Loaded papers, or an empty list until the fetch succeeds.
    pub fn papers(&self) -> Vec<Paper> {
        self.state.borrow().value().cloned().unwrap_or_default()
    }

    pub fn find(&self, paper_id: &str) -> Option<Paper> {
        self.state
            .borrow()
            .value()
            .and_then(|papers| papers.iter().find(|p| p.paper_id == paper_id).cloned())
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error().map(str::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<Lifecycle<Vec<Paper>>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeApi};

    #[tokio::test]
    async fn test_papers_empty_until_loaded() {
        let directory = PaperDirectory::new(Arc::new(FakeApi::new()));

        assert!(directory.papers().is_empty());
        assert!(directory.error().is_none());
    }

    #[tokio::test]
    async fn test_activate_fetches_exactly_once() {
        let api = Arc::new(FakeApi::new());
        let directory = PaperDirectory::new(api.clone());

        assert!(directory.activate().await);
        assert!(!directory.activate().await);

        assert_eq!(api.calls(), vec![Call::Papers]);
        assert_eq!(directory.papers().len(), 2);
        assert_eq!(directory.find("p2").unwrap().title, "Hepatotoxicity panel");
        assert!(directory.find("missing").is_none());
    }

    #[tokio::test]
    async fn test_failure_is_surfaced_without_retry() {
        let api = Arc::new(FakeApi::new());
        api.fail("papers");
        let directory = PaperDirectory::new(api.clone());

        directory.activate().await;
        directory.activate().await;

        assert_eq!(api.calls().len(), 1);
        assert!(directory.papers().is_empty());
        assert!(directory.error().unwrap().contains("500"));
    }
}
