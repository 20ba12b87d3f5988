//! threadview/crates/tv-core/src/lib.rs
//!
//! Domain model, store port and the read pipeline of threadview: sanitizing
//! post bodies, scoring brightness, aggregating reaction tags, assembling
//! threads and paging author searches.

pub mod brightness;
pub mod error;
pub mod models;
pub mod sanitize;
pub mod search;
pub mod tags;
pub mod thread;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use sanitize::{SanitizePolicy, Sanitizer};
pub use search::{SearchPaginator, SearchSettings};
pub use thread::ThreadAssembler;
pub use traits::*;
