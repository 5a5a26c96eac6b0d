use crate::rate_limit::SubmitRateLimiter;
use osintviz_core::{OsintVizConfig, SearchStore, SearchTracker};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<SearchTracker>,
    pub rate_limiter: Option<Arc<SubmitRateLimiter>>,
}

impl AppState {
    pub fn new(config: &OsintVizConfig) -> Self {
        let store = Arc::new(SearchStore::new());
        let tracker = Arc::new(SearchTracker::new(config.tracker.clone(), store));
        let rate_limiter =
            SubmitRateLimiter::per_minute(config.rate_limit.submits_per_minute).map(Arc::new);

        Self {
            tracker,
            rate_limiter,
        }
    }
}
