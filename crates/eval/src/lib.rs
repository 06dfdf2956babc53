pub mod benchmark;
pub mod test_set;

pub use benchmark::{EvalResults, Evaluator, QueryDetail};
pub use test_set::{load_test_set, section_match, GoldQuery};
