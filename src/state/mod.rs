//! Board state: issue data, grouping and view state

mod board;
mod dependency;
mod detail_cache;
mod issue;
mod layout;
mod search;
mod selection;
mod snapshot;
mod swimlane;
mod visibility;

pub use board::*;
pub use dependency::*;
pub use detail_cache::*;
pub use issue::*;
pub use layout::*;
pub use search::*;
pub use selection::*;
pub use snapshot::*;
pub use swimlane::*;
pub use visibility::*;
