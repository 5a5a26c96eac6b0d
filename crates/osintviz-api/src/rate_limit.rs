use crate::{ApiError, ApiResult};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use tracing::warn;

/// Global limiter for search submissions.
pub struct SubmitRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    per_minute: NonZeroU32,
}

impl SubmitRateLimiter {
    /// Returns `None` when `per_minute` is zero, meaning unlimited.
    pub fn per_minute(per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(per_minute)?;
        Some(Self {
            limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
            per_minute,
        })
    }

    pub fn limit(&self) -> u32 {
        self.per_minute.get()
    }

    pub fn check(&self) -> ApiResult<()> {
        self.limiter.check().map_err(|_| {
            warn!(limit = self.limit(), "Search submission rate limit exceeded");
            ApiError::RateLimited
        })
    }
}
