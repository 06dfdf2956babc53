pub mod context;
pub mod intent;
pub mod lifecycle;
pub mod papers;
pub mod query;

#[cfg(test)]
mod testing;

pub use context::{ContextProvider, ContextState};
pub use intent::{IntentError, SearchForm, SearchParams};
pub use lifecycle::Lifecycle;
pub use papers::PaperDirectory;
pub use query::QueryController;
