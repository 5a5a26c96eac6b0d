//! Search lifecycle tracking.
//!
//! A search moves `pending -> running -> completed` as ticks add random
//! progress. A search that has not completed within the configured tick
//! budget moves to `failed`. Terminal records never change again.
//!
//! Ticks are applied by [`SearchTracker::advance_progress`], either from the
//! per-search background task spawned on submit or directly by a caller when
//! `auto_advance` is disabled.

use crate::config_manager::TrackerConfig;
use crate::generator::generate_results;
use crate::store::SearchStore;
use crate::types::{
    SearchInput, SearchQuery, SearchRecord, SearchStats, SearchStatus, SearchSummary,
    PLATFORM_COMPLETED, PLATFORM_FINALIZING, SCAN_PLATFORMS,
};
use crate::{OsintError, Result};
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Progress shown while running never exceeds this, even if the
/// accumulator is closer to 100.
const RUNNING_PROGRESS_CAP: f64 = 95.0;
const PROGRESS_PER_PLATFORM: f64 = 12.5;

/// Accepted submission as returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedSearch {
    pub search_id: String,
    pub query: SearchInput,
    pub timestamp: DateTime<Utc>,
    pub estimated_time_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced { progress: u8 },
    Completed,
    Failed,
    /// The record was already completed or failed; nothing changed.
    Unchanged(SearchStatus),
}

impl TickOutcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TickOutcome::Advanced { .. })
    }
}

pub struct SearchTracker {
    store: Arc<SearchStore>,
    config: TrackerConfig,
    rng: Mutex<StdRng>,
    tasks: DashMap<String, AbortHandle>,
}

impl SearchTracker {
    pub fn new(config: TrackerConfig, store: Arc<SearchStore>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            store,
            config,
            rng: Mutex::new(rng),
            tasks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<SearchStore> {
        &self.store
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Validates and records a new search, scheduling its progress updates
    /// when `auto_advance` is enabled.
    pub fn submit(self: &Arc<Self>, query: SearchQuery) -> Result<SubmittedSearch> {
        let input = query.sanitize()?;
        Ok(self.submit_input(input))
    }

    /// Records an already sanitized search.
    pub fn submit_input(self: &Arc<Self>, input: SearchInput) -> SubmittedSearch {
        let mut search_id = self.next_search_id();
        let mut record = SearchRecord::new(search_id.clone(), input.clone());
        while let Err(mut rejected) = self.store.insert_new(record) {
            debug!(search_id = %search_id, "Search id collision, regenerating");
            search_id = self.next_search_id();
            rejected.id = search_id.clone();
            record = rejected;
        }

        info!(
            search_id = %search_id,
            username = %input.username,
            search_type = %input.search_type,
            "Search submitted"
        );

        if self.config.auto_advance {
            self.schedule(search_id.clone());
        }

        SubmittedSearch {
            estimated_time_seconds: input.search_type.estimated_time_seconds(),
            search_id,
            query: input,
            timestamp: Utc::now(),
        }
    }

    /// Applies one progress update to the search.
    pub fn advance_progress(&self, search_id: &str) -> Result<TickOutcome> {
        let outcome = self
            .store
            .update(search_id, |record| self.apply_tick(record))
            .ok_or_else(|| OsintError::NotFound(search_id.to_string()))?;

        match outcome {
            TickOutcome::Advanced { progress } => {
                debug!(search_id, progress, "Search progress updated");
            }
            TickOutcome::Completed => info!(search_id, "Search completed"),
            TickOutcome::Failed => warn!(search_id, "Search failed: tick budget exhausted"),
            TickOutcome::Unchanged(status) => {
                debug!(search_id, %status, "Ignoring tick for finished search");
            }
        }

        Ok(outcome)
    }

    pub fn get_status(&self, search_id: &str) -> Result<SearchRecord> {
        self.store
            .get(search_id)
            .ok_or_else(|| OsintError::NotFound(search_id.to_string()))
    }

    /// History entries, newest first, optionally restricted to one status.
    pub fn list(&self, status: Option<SearchStatus>) -> Vec<SearchSummary> {
        let mut records: Vec<SearchRecord> = self
            .store
            .snapshot()
            .into_iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .collect();
        records.sort_by(|a, b| {
            b.start_time
                .cmp(&a.start_time)
                .then_with(|| b.id.cmp(&a.id))
        });
        records.iter().map(SearchRecord::summary).collect()
    }

    pub fn stats(&self) -> SearchStats {
        let mut stats = SearchStats::default();
        for record in self.store.snapshot() {
            stats.total += 1;
            match record.status {
                SearchStatus::Pending => stats.pending += 1,
                SearchStatus::Running => stats.running += 1,
                SearchStatus::Completed => stats.completed += 1,
                SearchStatus::Failed => stats.failed += 1,
            }
            if let Some(results) = &record.results {
                stats.total_results += results.accounts.len();
            }
        }
        stats
    }

    /// Searches still pending or running.
    pub fn active_count(&self) -> usize {
        self.store
            .snapshot()
            .iter()
            .filter(|r| !r.is_terminal())
            .count()
    }

    /// Cancels any scheduled updates and deletes the record.
    pub fn remove(&self, search_id: &str) -> Result<SearchRecord> {
        if let Some((_, task)) = self.tasks.remove(search_id) {
            task.abort();
        }
        let record = self
            .store
            .remove(search_id)
            .ok_or_else(|| OsintError::NotFound(search_id.to_string()))?;
        info!(search_id, "Search removed");
        Ok(record)
    }

    /// Aborts every scheduled task and empties the store.
    pub fn shutdown(&self) {
        let cancelled = self.tasks.len();
        for task in self.tasks.iter() {
            task.value().abort();
        }
        self.tasks.clear();
        self.store.clear();
        info!(cancelled, "Search tracker shut down");
    }

    /// Number of searches with a live background task.
    pub fn scheduled_count(&self) -> usize {
        self.tasks.len()
    }

    fn apply_tick(&self, record: &mut SearchRecord) -> TickOutcome {
        if record.is_terminal() {
            return TickOutcome::Unchanged(record.status);
        }

        let step = self
            .rng
            .lock()
            .random_range(self.config.min_step..self.config.max_step);
        record.ticks += 1;
        record.accumulated += step;

        if record.accumulated >= 100.0 {
            let today = Utc::now().date_naive();
            let results = generate_results(&record.input, &mut *self.rng.lock(), today);

            record.status = SearchStatus::Completed;
            record.progress = 100;
            record.current_platform = Some(PLATFORM_COMPLETED.to_string());
            record.estimated_time_remaining = Some(0);
            record.completed_at = Some(Utc::now());
            record.results = Some(results);
            return TickOutcome::Completed;
        }

        let accumulated = record.accumulated;
        record.status = SearchStatus::Running;
        record.progress = accumulated.min(RUNNING_PROGRESS_CAP).floor() as u8;
        let platform_index = (accumulated / PROGRESS_PER_PLATFORM).floor() as usize;
        record.current_platform = Some(
            SCAN_PLATFORMS
                .get(platform_index)
                .copied()
                .unwrap_or(PLATFORM_FINALIZING)
                .to_string(),
        );
        record.estimated_time_remaining =
            Some(((100.0 - accumulated) / 10.0).floor().max(0.0) as u32);

        if record.ticks >= self.config.max_ticks {
            record.status = SearchStatus::Failed;
            record.completed_at = Some(Utc::now());
            record.estimated_time_remaining = None;
            record.error = Some(format!(
                "search timed out after {} progress updates",
                record.ticks
            ));
            return TickOutcome::Failed;
        }

        TickOutcome::Advanced {
            progress: record.progress,
        }
    }

    fn schedule(self: &Arc<Self>, search_id: String) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(search_id = %search_id, "No async runtime available, progress will not advance");
            return;
        };

        let initial_delay = Duration::from_millis(self.config.initial_delay_ms);
        let interval = Duration::from_millis(self.config.tick_interval_ms.max(1));
        let tracker: Weak<Self> = Arc::downgrade(self);

        // The entry lock is held across the spawn so a task that finishes
        // immediately cannot deregister itself before it is registered.
        if let Entry::Vacant(slot) = self.tasks.entry(search_id.clone()) {
            let task = runtime.spawn(async move {
                tokio::time::sleep(initial_delay).await;
                let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    ticker.tick().await;
                    let Some(tracker) = tracker.upgrade() else {
                        break;
                    };
                    let done = match tracker.advance_progress(&search_id) {
                        Ok(outcome) => outcome.is_terminal(),
                        // Removed while the task was sleeping.
                        Err(_) => true,
                    };
                    if done {
                        tracker.tasks.remove(&search_id);
                        break;
                    }
                }
            });
            slot.insert(task.abort_handle());
        }
    }

    fn next_search_id(&self) -> String {
        let suffix = id_suffix(&mut *self.rng.lock());
        format!("search_{}_{}", Utc::now().timestamp_millis(), suffix)
    }
}

fn id_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}
