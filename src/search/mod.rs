pub mod backend;
pub mod context;
pub mod eval;
pub mod eval_cache;
pub mod ordering;
pub mod pesto;
pub mod picker;
pub mod see;
#[allow(clippy::module_inception)]
pub mod search;
pub mod tt;

pub use search::{Limits, SearchResult, TimeControl, search, search_with_state};
