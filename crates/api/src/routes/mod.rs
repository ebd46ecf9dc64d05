//! HTTP handlers, grouped by resource.

pub mod movies;
pub mod ops;
pub mod zipcode;

use prefs::PreferenceStore;
use upstream::Upstream;

/// Shared application state accessible from all handlers.
pub struct AppState<U: Upstream> {
    pub upstream: U,
    pub prefs: PreferenceStore,
}

impl<U: Upstream> AppState<U> {
    pub fn new(upstream: U, prefs: PreferenceStore) -> Self {
        Self { upstream, prefs }
    }
}
