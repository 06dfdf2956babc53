use std::sync::atomic::{AtomicU64, Ordering};

/// State of one fetch slot. A slot is in exactly one of these states, so a
/// loading flag can never disagree with the stored result or error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle<T> {
    Idle,
    Loading,
    Success(T),
    Failure(String),
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Lifecycle::Idle
    }
}

impl<T> Lifecycle<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Lifecycle::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Lifecycle::Loading)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Lifecycle::Success(_) | Lifecycle::Failure(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Lifecycle::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Lifecycle::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Lifecycle::Success(value),
            Err(e) => Lifecycle::Failure(e.to_string()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Lifecycle::Idle => "idle",
            Lifecycle::Loading => "loading",
            Lifecycle::Success(_) => "success",
            Lifecycle::Failure(_) => "failure",
        }
    }
}

/// Issues monotonically increasing request tickets. A completion may only
/// write its slot while its ticket is still the latest one issued.
#[derive(Debug, Default)]
pub(crate) struct Sequencer(AtomicU64);

impl Sequencer {
    pub(crate) fn issue(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }

    /// Makes every outstanding ticket stale.
    pub(crate) fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
