//! Expert and cause catalog for SciConnect.
//!
//! The `DirectoryStore` owns the immutable catalog; the filter engine derives
//! read-only views of it from the user's current `FilterState`.

pub mod error;
pub mod filter;
pub mod seed;
pub mod store;

pub use error::DirectoryError;
pub use filter::{apply, FilterEngine, FilterState, TagIndex};
pub use store::{CauseView, DirectoryStore};
