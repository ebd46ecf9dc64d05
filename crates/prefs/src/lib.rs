//! Durable per-client preference storage.
//!
//! A single JSON file holds every client's zip code. The whole mapping is
//! loaded at startup and rewritten after each mutation.

pub mod error;
pub mod record;
pub mod store;

pub use error::{Result, StoreError};
pub use record::{PreferenceFile, PreferenceRecord};
pub use store::PreferenceStore;
