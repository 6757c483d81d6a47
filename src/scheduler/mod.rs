//! Scheduler - Periodic re-aggregation of every tracked room
//!
//! The task ticks on a fixed interval and stops as soon as its cancellation
//! token fires. It never persists anything; results reach the host through
//! the registry's event channel.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::room::RoomRegistry;

pub struct ReaggregationTask {
    registry: RoomRegistry,
    interval: Duration,
    cancel: CancellationToken,
}

impl ReaggregationTask {
    pub fn new(registry: RoomRegistry, interval: Duration) -> Self {
        Self {
            registry,
            interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Interval taken from the registry's room configuration
    pub fn from_registry(registry: RoomRegistry) -> Self {
        let interval = Duration::from_secs(registry.config().analysis_interval_secs);
        Self::new(registry, interval)
    }

    /// Token that stops the task when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one re-aggregation pass
    pub async fn tick_once(&self) -> usize {
        let analyses = self.registry.analyze_all().await;
        let changed = analyses.iter().filter(|a| a.transition.is_some()).count();
        debug!(
            analyzed_rooms = analyses.len(),
            changed_rooms = changed,
            "Re-aggregation pass completed"
        );
        analyses.len()
    }

    /// Run until cancelled
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "Re-aggregation task started");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; skip it so a pass waits a full interval
        interval.tick().await;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.tick_once().await;
                }
            }
        }

        info!("Re-aggregation task stopped");
    }

    pub fn spawn(self) -> (CancellationToken, JoinHandle<()>) {
        let token = self.cancellation_token();
        let handle = tokio::spawn(self.run());
        (token, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ConversationAggregator;
    use crate::classifier::MessageClassifier;
    use crate::clock::ManualClock;
    use crate::config::RoomConfig;
    use crate::events::IntentEvent;
    use crate::intent::Intent;
    use crate::rules::IntentRuleSet;
    use crate::taxonomy::Taxonomy;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn registry(clock: ManualClock) -> RoomRegistry {
        let rules = Arc::new(IntentRuleSet::new(&Taxonomy::engagement_mentoring()).unwrap());
        let aggregator = ConversationAggregator::with_defaults(MessageClassifier::new(rules));
        RoomRegistry::new(Arc::new(aggregator), RoomConfig::default(), Arc::new(clock))
    }

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_tick_once_analyzes_rooms() {
        let registry = registry(clock());
        registry
            .process_message("mentors", "u1", "meera", "Here's how I approach cold outreach")
            .await;

        let task = ReaggregationTask::from_registry(registry.clone());
        assert_eq!(task.tick_once().await, 1);
        assert_eq!(registry.room_intent("mentors").await, Some(Intent::from("engaging")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_pass_then_cancel() {
        let registry = registry(clock());
        let mut events = registry.subscribe();
        registry
            .process_message(
                "mentors",
                "u1",
                "meera",
                "I'm struggling with getting responses, no one replies",
            )
            .await;
        assert!(matches!(
            events.recv().await.unwrap(),
            IntentEvent::MessageClassified { .. }
        ));

        let (token, handle) =
            ReaggregationTask::new(registry.clone(), Duration::from_secs(120)).spawn();

        // Paused time auto-advances to the first real tick
        match events.recv().await.unwrap() {
            IntentEvent::RoomAnalyzed { dominant_intent, .. } => {
                assert_eq!(dominant_intent, "problematic");
            }
            other => panic!("Expected RoomAnalyzed, got {:?}", other),
        }

        token.cancel();
        handle.await.unwrap();
        assert_eq!(registry.room_intent("mentors").await, Some(Intent::from("problematic")));
    }

    #[tokio::test]
    async fn test_cancel_before_first_tick() {
        let task = ReaggregationTask::new(registry(clock()), Duration::from_secs(3600));
        let token = task.cancellation_token();
        let handle = tokio::spawn(task.run());

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("task stops promptly")
            .unwrap();
    }
}
