//! Outbound client for the third-party movie metadata API.
//!
//! - [`Upstream`] is the seam the HTTP layer depends on
//! - [`TmdbClient`] is the reqwest-backed implementation
//! - [`with_credential`] attaches the API key to a path

pub mod error;
pub mod source;
pub mod tmdb;

pub use error::{Result, UpstreamError};
pub use source::{Upstream, with_credential};
pub use tmdb::{TmdbClient, TmdbConfig};
