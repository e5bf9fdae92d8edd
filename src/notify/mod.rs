//! Change notifications for passing-feature progress.
//!
//! Each workspace keeps a [`ProgressCache`] with the last passing count and
//! the ids that were passing at the time. A check compares the current count
//! against it and, when the count went up, posts a [`ProgressEvent`] listing
//! the features that started passing. The cache only ever moves up, and it
//! moves up whether or not the webhook accepted the event: a failed delivery
//! is logged and that delta is not reported again.
//!
//! Checks through one [`Notifier`] (and its clones) are serialized, so
//! overlapping callers cannot both report the same increase. Separate
//! processes checking the same workspace are not coordinated.

mod cache;
mod client;

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::NotifyConfig;
use crate::models::*;
use crate::store::FeatureSource;
use crate::workspace::Workspace;

pub use cache::{CacheError, ProgressCache};
pub use client::{DeliveryError, WebhookClient};

/// What a single check did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// No cache existed; one was written with the current state. Nothing sent.
    Bootstrapped { count: u32 },
    /// Passing count did not exceed the cached count.
    Unchanged { previous: u32 },
    /// Progress increased but no endpoint is configured. Cache left as is.
    Disabled { previous: u32, passing: u32 },
    /// The webhook accepted the event.
    Notified { event: ProgressEvent },
    /// The event could not be delivered. The cache was still advanced.
    DeliveryFailed { event: ProgressEvent, error: String },
}

/// Progress for one scope plus what the notification check did with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub phase: Option<u32>,
    pub snapshot: ProgressSnapshot,
    pub outcome: Option<CheckOutcome>,
}

impl ProgressReport {
    pub fn summary_line(&self) -> String {
        self.snapshot.summary_line(self.phase)
    }
}

/// Runs progress checks for one workspace.
#[derive(Debug, Clone)]
pub struct Notifier {
    workspace: Workspace,
    client: Option<WebhookClient>,
    check_lock: Arc<Mutex<()>>,
}

impl Notifier {
    pub fn new(workspace: Workspace, config: NotifyConfig) -> Self {
        let client = config
            .endpoint
            .map(|endpoint| WebhookClient::new(endpoint, config.timeout));
        Self {
            workspace,
            client,
            check_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Compare `passing` against the cached count and notify on an increase.
    ///
    /// Never fails: cache and delivery problems are logged and reflected in
    /// the returned outcome.
    pub async fn check_and_notify(
        &self,
        source: &impl FeatureSource,
        passing: u32,
        total: u32,
    ) -> CheckOutcome {
        // Held across load, delivery and write.
        let _guard = self.check_lock.lock().await;

        let cache_path = self.workspace.progress_cache();
        let (previous, cache_exists) = match ProgressCache::load(&cache_path) {
            Ok(Some(cache)) => (cache, true),
            Ok(None) => (ProgressCache::default(), false),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable progress cache {}: {}",
                    cache_path.display(),
                    e
                );
                (ProgressCache::default(), true)
            }
        };

        if passing <= previous.count {
            if !cache_exists {
                return self.bootstrap(source, passing);
            }
            return CheckOutcome::Unchanged {
                previous: previous.count,
            };
        }

        let Some(client) = &self.client else {
            if !cache_exists {
                return self.bootstrap(source, passing);
            }
            tracing::debug!(
                "Progress went from {} to {} but no webhook is configured",
                previous.count,
                passing
            );
            return CheckOutcome::Disabled {
                previous: previous.count,
                passing,
            };
        };

        let current = source.passing_features();
        let event = self.build_event(&previous, &current, passing, total);

        let outcome = match client.deliver(&event).await {
            Ok(()) => {
                tracing::info!(
                    "Sent progress notification for {}: {}/{} (+{})",
                    event.project,
                    passing,
                    total,
                    event.tests_completed_this_session
                );
                CheckOutcome::Notified { event }
            }
            Err(e) => {
                tracing::warn!("Webhook notification failed: {}", e);
                CheckOutcome::DeliveryFailed {
                    event,
                    error: e.to_string(),
                }
            }
        };

        let ids = current.iter().map(|f| f.id).collect();
        self.write_cache(ProgressCache::new(passing, ids));

        outcome
    }

    /// Snapshot `phase` (or everything), and run a check when it has features.
    ///
    /// The check always uses the all-phase counts so the cached count stays
    /// comparable with the cached id set across phase transitions.
    pub async fn report_progress(
        &self,
        source: &impl FeatureSource,
        phase: Option<u32>,
    ) -> ProgressReport {
        let snapshot = source.snapshot(phase);

        let outcome = if snapshot.is_empty() {
            None
        } else {
            let overall = match phase {
                Some(_) => source.snapshot(None),
                None => snapshot,
            };
            Some(
                self.check_and_notify(source, overall.passing, overall.total)
                    .await,
            )
        };

        ProgressReport {
            phase,
            snapshot,
            outcome,
        }
    }

    fn bootstrap(&self, source: &impl FeatureSource, passing: u32) -> CheckOutcome {
        let ids = source.passing_features().iter().map(|f| f.id).collect();
        self.write_cache(ProgressCache::new(passing, ids));
        tracing::debug!("Initialized progress cache at {}", passing);
        CheckOutcome::Bootstrapped { count: passing }
    }

    fn build_event(
        &self,
        previous: &ProgressCache,
        current: &[PassingFeature],
        passing: u32,
        total: u32,
    ) -> ProgressEvent {
        // A count-only cache cannot say which features are new.
        let completed_tests = if previous.is_legacy_format() {
            Vec::new()
        } else {
            let seen = previous.id_set();
            current
                .iter()
                .filter(|f| !seen.contains(&f.id))
                .map(PassingFeature::label)
                .collect()
        };

        ProgressEvent {
            event: PROGRESS_EVENT.to_string(),
            passing,
            total,
            percentage: percentage(passing, total),
            previous_passing: previous.count,
            tests_completed_this_session: passing - previous.count,
            completed_tests,
            project: self.workspace.project_name(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    fn write_cache(&self, cache: ProgressCache) {
        let path = self.workspace.progress_cache();
        if let Err(e) = cache.save(&path) {
            tracing::warn!("Failed to write progress cache {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Passing(Vec<PassingFeature>);

    impl FeatureSource for Passing {
        fn feature_count(&self, _phase: Option<u32>) -> u32 {
            self.0.len() as u32
        }

        fn passing_feature_count(&self, _phase: Option<u32>) -> u32 {
            self.0.len() as u32
        }

        fn passing_features(&self) -> Vec<PassingFeature> {
            self.0.clone()
        }

        fn has_any_features(&self, phase: u32) -> bool {
            phase == 1 && !self.0.is_empty()
        }
    }

    fn feature(id: i64, category: &str, name: &str) -> PassingFeature {
        PassingFeature {
            id,
            category: category.to_string(),
            name: name.to_string(),
        }
    }

    fn notifier(dir: &TempDir) -> Notifier {
        Notifier::new(Workspace::new(dir.path()), NotifyConfig::disabled())
    }

    #[test]
    fn event_lists_only_new_features() {
        let dir = TempDir::new().unwrap();
        let previous = ProgressCache::new(2, vec![1, 2]);
        let current = vec![
            feature(1, "Core", "Setup"),
            feature(2, "", "Routing"),
            feature(3, "UI", "Login"),
        ];

        let event = notifier(&dir).build_event(&previous, &current, 3, 4);
        assert_eq!(event.completed_tests, vec!["UI Login".to_string()]);
        assert_eq!(event.tests_completed_this_session, 1);
        assert_eq!(event.previous_passing, 2);
        assert_eq!(event.percentage, 75.0);
        assert_eq!(event.event, "test_progress");
        assert!(event.timestamp.ends_with('Z'));
    }

    #[test]
    fn legacy_cache_reports_count_without_names() {
        let dir = TempDir::new().unwrap();
        let previous = ProgressCache::new(5, vec![]);
        let current: Vec<_> = (1..=7).map(|id| feature(id, "Api", "Endpoint")).collect();

        let event = notifier(&dir).build_event(&previous, &current, 7, 10);
        assert!(event.completed_tests.is_empty());
        assert_eq!(event.tests_completed_this_session, 2);
    }

    #[tokio::test]
    async fn disabled_notifier_bootstraps_then_leaves_cache_alone() {
        let dir = TempDir::new().unwrap();
        let notifier = notifier(&dir);
        let source = Passing(vec![feature(1, "Core", "Setup")]);

        let first = notifier.check_and_notify(&source, 1, 2).await;
        assert_eq!(first, CheckOutcome::Bootstrapped { count: 1 });

        let source = Passing(vec![feature(1, "Core", "Setup"), feature(2, "Core", "Db")]);
        let second = notifier.check_and_notify(&source, 2, 2).await;
        assert_eq!(
            second,
            CheckOutcome::Disabled {
                previous: 1,
                passing: 2
            }
        );

        let cache = ProgressCache::load(&notifier.workspace().progress_cache())
            .unwrap()
            .unwrap();
        assert_eq!(cache, ProgressCache::new(1, vec![1]));
    }
}
