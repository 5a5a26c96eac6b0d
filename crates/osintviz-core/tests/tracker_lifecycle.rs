use osintviz_core::{
    OsintError, Platform, SearchQuery, SearchStatus, SearchStore, SearchTracker, TickOutcome,
    TrackerConfig,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn manual_tracker(seed: u64) -> Arc<SearchTracker> {
    let config = TrackerConfig {
        auto_advance: false,
        seed: Some(seed),
        ..TrackerConfig::default()
    };
    Arc::new(SearchTracker::new(config, Arc::new(SearchStore::new())))
}

fn run_to_completion(tracker: &SearchTracker, id: &str) -> Vec<u8> {
    let mut progress = Vec::new();
    for _ in 0..tracker.config().max_ticks {
        let outcome = tracker.advance_progress(id).expect("tick");
        progress.push(tracker.get_status(id).expect("status").progress);
        if outcome.is_terminal() {
            break;
        }
    }
    progress
}

#[test]
fn submit_starts_pending_at_zero() {
    let tracker = manual_tracker(1);
    let submitted = tracker.submit(SearchQuery::new("alice")).unwrap();

    assert_eq!(submitted.query.username, "alice");
    assert_eq!(submitted.estimated_time_seconds, 30);

    let record = tracker.get_status(&submitted.search_id).unwrap();
    assert_eq!(record.status, SearchStatus::Pending);
    assert_eq!(record.progress, 0);
    assert!(record.results.is_none());
    assert!(record.completed_at.is_none());
}

#[test]
fn basic_search_completes_with_three_accounts() {
    let tracker = manual_tracker(2);
    let id = tracker.submit(SearchQuery::new("alice")).unwrap().search_id;

    run_to_completion(&tracker, &id);

    let record = tracker.get_status(&id).unwrap();
    assert_eq!(record.status, SearchStatus::Completed);
    assert_eq!(record.progress, 100);
    assert_eq!(record.current_platform.as_deref(), Some("Completed"));
    assert!(record.completed_at.is_some());

    let results = record.results.expect("results");
    let platforms: Vec<Platform> = results.accounts.iter().map(|a| a.platform).collect();
    assert_eq!(
        platforms,
        vec![Platform::Twitter, Platform::GitHub, Platform::LinkedIn]
    );
}

#[test]
fn deep_search_completes_with_five_accounts() {
    let tracker = manual_tracker(3);
    let id = tracker
        .submit(SearchQuery::new("bob").with_search_type("deep"))
        .unwrap()
        .search_id;

    run_to_completion(&tracker, &id);

    let results = tracker.get_status(&id).unwrap().results.expect("results");
    assert_eq!(results.accounts.len(), 5);
    assert!(results
        .accounts
        .iter()
        .any(|a| a.platform == Platform::Reddit));
    assert!(results
        .accounts
        .iter()
        .any(|a| a.platform == Platform::Instagram));
}

#[test]
fn progress_is_monotonic_until_terminal() {
    for seed in 0..20 {
        let tracker = manual_tracker(seed);
        let id = tracker.submit(SearchQuery::new("carol")).unwrap().search_id;

        let progress = run_to_completion(&tracker, &id);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]), "{:?}", progress);
        assert_eq!(progress.last(), Some(&100));
        // Steps of at least 5 finish within 20 ticks.
        assert!(progress.len() <= 20);
    }
}

#[test]
fn ticks_after_completion_are_no_ops() {
    let tracker = manual_tracker(4);
    let id = tracker.submit(SearchQuery::new("dave")).unwrap().search_id;
    run_to_completion(&tracker, &id);

    let before = serde_json::to_value(tracker.get_status(&id).unwrap()).unwrap();
    for _ in 0..5 {
        assert_eq!(
            tracker.advance_progress(&id).unwrap(),
            TickOutcome::Unchanged(SearchStatus::Completed)
        );
    }
    let after = serde_json::to_value(tracker.get_status(&id).unwrap()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn blank_usernames_are_rejected_without_records() {
    let tracker = manual_tracker(5);
    for username in ["", "   ", "\t"] {
        let err = tracker.submit(SearchQuery::new(username)).unwrap_err();
        assert!(matches!(err, OsintError::Validation(_)));
    }
    let err = tracker.submit(SearchQuery::default()).unwrap_err();
    assert!(matches!(err, OsintError::Validation(_)));
    assert!(tracker.store().is_empty());
}

#[test]
fn submitted_ids_are_unique() {
    let tracker = manual_tracker(6);
    let mut seen = HashSet::new();
    for i in 0..500 {
        let id = tracker
            .submit(SearchQuery::new(format!("user{}", i)))
            .unwrap()
            .search_id;
        assert!(seen.insert(id));
    }
    assert_eq!(tracker.store().len(), 500);
}

#[test]
fn unknown_ids_are_not_found() {
    let tracker = manual_tracker(7);
    assert!(matches!(
        tracker.get_status("nonexistent-id"),
        Err(OsintError::NotFound(_))
    ));
    assert!(matches!(
        tracker.advance_progress("nonexistent-id"),
        Err(OsintError::NotFound(_))
    ));
    assert!(matches!(
        tracker.remove("nonexistent-id"),
        Err(OsintError::NotFound(_))
    ));
}

#[test]
fn concurrent_ticks_complete_exactly_once() {
    let tracker = manual_tracker(8);
    let id = tracker.submit(SearchQuery::new("erin")).unwrap().search_id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            let id = id.clone();
            std::thread::spawn(move || {
                (0..25)
                    .filter(|_| tracker.advance_progress(&id).unwrap() == TickOutcome::Completed)
                    .count()
            })
        })
        .collect();

    let completions: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(completions, 1);

    let record = tracker.get_status(&id).unwrap();
    assert_eq!(record.status, SearchStatus::Completed);
    assert_eq!(record.progress, 100);
}

#[test]
fn listing_filters_and_stats() {
    let tracker = manual_tracker(9);
    let done = tracker.submit(SearchQuery::new("done")).unwrap().search_id;
    let _pending = tracker.submit(SearchQuery::new("pending")).unwrap().search_id;
    run_to_completion(&tracker, &done);

    assert_eq!(tracker.list(None).len(), 2);
    let completed = tracker.list(Some(SearchStatus::Completed));
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].query, "done");
    assert_eq!(completed[0].results_count, 3);
    assert!(completed[0].risk_score.is_some());
    assert!(tracker.list(Some(SearchStatus::Failed)).is_empty());

    let stats = tracker.stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.total_results, 3);
    assert_eq!(tracker.active_count(), 1);
}

#[tokio::test]
async fn scheduled_search_completes_on_its_own() {
    let config = TrackerConfig {
        initial_delay_ms: 5,
        tick_interval_ms: 5,
        seed: Some(10),
        ..TrackerConfig::default()
    };
    let tracker = Arc::new(SearchTracker::new(config, Arc::new(SearchStore::new())));
    let id = tracker.submit(SearchQuery::new("frank")).unwrap().search_id;
    assert_eq!(tracker.get_status(&id).unwrap().status, SearchStatus::Pending);

    let mut status = SearchStatus::Pending;
    for _ in 0..300 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        status = tracker.get_status(&id).unwrap().status;
        if status.is_terminal() && tracker.scheduled_count() == 0 {
            break;
        }
    }

    assert_eq!(status, SearchStatus::Completed);
    assert_eq!(tracker.scheduled_count(), 0);
}

#[tokio::test]
async fn removing_a_search_cancels_its_task() {
    let config = TrackerConfig {
        initial_delay_ms: 60_000,
        seed: Some(11),
        ..TrackerConfig::default()
    };
    let tracker = Arc::new(SearchTracker::new(config, Arc::new(SearchStore::new())));
    let id = tracker.submit(SearchQuery::new("grace")).unwrap().search_id;
    assert_eq!(tracker.scheduled_count(), 1);

    let removed = tracker.remove(&id).unwrap();
    assert_eq!(removed.input.username, "grace");
    assert_eq!(tracker.scheduled_count(), 0);
    assert!(matches!(
        tracker.get_status(&id),
        Err(OsintError::NotFound(_))
    ));
}

#[tokio::test]
async fn shutdown_clears_everything() {
    let config = TrackerConfig {
        initial_delay_ms: 60_000,
        ..TrackerConfig::default()
    };
    let tracker = Arc::new(SearchTracker::new(config, Arc::new(SearchStore::new())));
    for name in ["a1", "b2", "c3"] {
        tracker.submit(SearchQuery::new(name)).unwrap();
    }
    assert_eq!(tracker.scheduled_count(), 3);

    tracker.shutdown();
    assert_eq!(tracker.scheduled_count(), 0);
    assert!(tracker.store().is_empty());
}
