//! Rooms - Rolling per-room intent tracking
//!
//! Each room keeps:
//! - A bounded buffer of recent messages
//! - The last dominant intent and its weights
//! - A bounded log of dominant-intent transitions
//!
//! Rooms are created lazily on their first message and live until the host
//! calls [`RoomRegistry::evict_idle`]. Mutations of a room happen under the
//! registry's write lock, so each room has a single writer at a time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

use crate::aggregate::{ConversationAggregator, ConversationSummary, IntentWeights};
use crate::clock::Clock;
use crate::config::RoomConfig;
use crate::events::IntentEvent;
use crate::intent::Intent;

/// Capacity of the event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// `now - span`, saturating at the earliest representable instant
fn cutoff(now: DateTime<Utc>, span: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(span)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A chat message as the host hands it over
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub user_id: String,
    pub username: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            content: content.into(),
            timestamp,
        }
    }
}

/// A change of a room's dominant intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentTransition {
    pub timestamp: DateTime<Utc>,
    pub previous: Option<Intent>,
    pub new: Intent,
    /// Start of the analysed conversation text
    pub sample: String,
}

/// Outcome of one room analysis
#[derive(Debug, Clone)]
pub struct RoomAnalysis {
    pub room_id: String,
    pub analyzed_at: DateTime<Utc>,
    pub summary: ConversationSummary,
    pub transition: Option<IntentTransition>,
}

/// Intent state of a single room
#[derive(Debug, Clone)]
pub struct RoomIntentTracker {
    room_id: String,
    config: RoomConfig,
    messages: VecDeque<ChatMessage>,
    current_intent: Option<Intent>,
    current_weights: Option<IntentWeights>,
    history: VecDeque<IntentTransition>,
    last_analysis: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl RoomIntentTracker {
    pub fn new(room_id: &str, config: RoomConfig, now: DateTime<Utc>) -> Self {
        Self {
            room_id: room_id.to_string(),
            config,
            messages: VecDeque::new(),
            current_intent: None,
            current_weights: None,
            history: VecDeque::new(),
            last_analysis: now,
            last_activity: now,
        }
    }

    /// Buffer a message; analyze if the analysis interval has elapsed
    pub fn add_message(
        &mut self,
        message: ChatMessage,
        aggregator: &ConversationAggregator,
        now: DateTime<Utc>,
    ) -> Option<RoomAnalysis> {
        self.messages.push_back(message);
        while self.messages.len() > self.config.max_buffered_messages {
            self.messages.pop_front();
        }
        self.last_activity = now;

        if now - self.last_analysis >= self.config.analysis_interval() {
            self.analyze(aggregator, now)
        } else {
            None
        }
    }

    /// Aggregate the recent messages and record a transition if the
    /// dominant intent changed. Returns `None` when nothing recent is buffered.
    pub fn analyze(
        &mut self,
        aggregator: &ConversationAggregator,
        now: DateTime<Utc>,
    ) -> Option<RoomAnalysis> {
        let cutoff = cutoff(now, self.config.recent_messages());
        let recent: Vec<&ChatMessage> = self
            .messages
            .iter()
            .filter(|m| m.timestamp >= cutoff)
            .collect();

        if recent.is_empty() {
            debug!(room_id = %self.room_id, "No recent messages to analyze");
            return None;
        }

        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        let summary = aggregator.aggregate(&contents);

        let transition = if self.current_intent.as_ref() != Some(&summary.dominant_intent) {
            let transition = IntentTransition {
                timestamp: now,
                previous: self.current_intent.clone(),
                new: summary.dominant_intent.clone(),
                sample: self.sample(&recent),
            };
            info!(
                room_id = %self.room_id,
                previous = ?transition.previous,
                new = %transition.new,
                "Room intent changed"
            );

            self.history.push_back(transition.clone());
            while self.history.len() > self.config.max_history {
                self.history.pop_front();
            }
            self.current_intent = Some(summary.dominant_intent.clone());
            Some(transition)
        } else {
            None
        };

        self.current_weights = Some(summary.intent_weights.clone());
        self.last_analysis = now;

        Some(RoomAnalysis {
            room_id: self.room_id.clone(),
            analyzed_at: now,
            summary,
            transition,
        })
    }

    /// `username: message` lines as written, truncated to the configured
    /// sample length
    fn sample(&self, recent: &[&ChatMessage]) -> String {
        let text = recent
            .iter()
            .map(|m| format!("{}: {}", m.username, m.content))
            .collect::<Vec<_>>()
            .join("\n");
        text.chars().take(self.config.sample_chars).collect()
    }

    /// Transitions recorded at or after `cutoff`
    pub fn history_since(&self, cutoff: DateTime<Utc>) -> Vec<IntentTransition> {
        self.history
            .iter()
            .filter(|t| t.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn current_intent(&self) -> Option<&Intent> {
        self.current_intent.as_ref()
    }

    pub fn current_weights(&self) -> Option<&IntentWeights> {
        self.current_weights.as_ref()
    }

    pub fn buffered_messages(&self) -> usize {
        self.messages.len()
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }
}

/// All rooms of one engine, plus the event channel the host listens on
#[derive(Clone)]
pub struct RoomRegistry {
    aggregator: Arc<ConversationAggregator>,
    config: RoomConfig,
    clock: Arc<dyn Clock>,
    rooms: Arc<RwLock<HashMap<String, RoomIntentTracker>>>,
    events: broadcast::Sender<IntentEvent>,
}

impl RoomRegistry {
    pub fn new(
        aggregator: Arc<ConversationAggregator>,
        config: RoomConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            aggregator,
            config,
            clock,
            rooms: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IntentEvent> {
        self.events.subscribe()
    }

    /// Ingest a message stamped with the current clock time
    pub async fn process_message(
        &self,
        room_id: &str,
        user_id: &str,
        username: &str,
        content: &str,
    ) -> Option<RoomAnalysis> {
        let message = ChatMessage::new(user_id, username, content, self.clock.now());
        self.ingest(room_id, message).await
    }

    /// Ingest a message that already carries its timestamp
    pub async fn ingest(&self, room_id: &str, message: ChatMessage) -> Option<RoomAnalysis> {
        let now = self.clock.now();
        let intent = self.aggregator.classifier().label(&message.content);
        let user_id = message.user_id.clone();

        let analysis = {
            let mut rooms = self.rooms.write().await;
            let room = rooms.entry(room_id.to_string()).or_insert_with(|| {
                debug!(room_id, "Tracking new room");
                RoomIntentTracker::new(room_id, self.config.clone(), now)
            });
            room.add_message(message, &self.aggregator, now)
        };

        self.publish(IntentEvent::MessageClassified {
            room_id: room_id.to_string(),
            user_id,
            intent,
            at: now,
        });
        if let Some(analysis) = &analysis {
            self.publish_analysis(analysis);
        }

        analysis
    }

    /// Analyze one room now, regardless of its interval
    pub async fn analyze_room(&self, room_id: &str) -> Option<RoomAnalysis> {
        let now = self.clock.now();
        let analysis = {
            let mut rooms = self.rooms.write().await;
            rooms
                .get_mut(room_id)
                .and_then(|room| room.analyze(&self.aggregator, now))
        };
        if let Some(analysis) = &analysis {
            self.publish_analysis(analysis);
        }
        analysis
    }

    /// Analyze every room with recent messages
    pub async fn analyze_all(&self) -> Vec<RoomAnalysis> {
        let now = self.clock.now();
        let analyses: Vec<RoomAnalysis> = {
            let mut rooms = self.rooms.write().await;
            rooms
                .values_mut()
                .filter_map(|room| room.analyze(&self.aggregator, now))
                .collect()
        };

        for analysis in &analyses {
            self.publish_analysis(analysis);
        }
        debug!(rooms = analyses.len(), "Analyzed rooms");
        analyses
    }

    pub async fn room_intent(&self, room_id: &str) -> Option<Intent> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).and_then(|r| r.current_intent().cloned())
    }

    pub async fn room_weights(&self, room_id: &str) -> Option<IntentWeights> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).and_then(|r| r.current_weights().cloned())
    }

    /// Transitions in the last `hours` hours; empty for unknown rooms.
    /// Spans beyond the representable range return the whole history.
    pub async fn room_history(&self, room_id: &str, hours: i64) -> Vec<IntentTransition> {
        let cutoff = match Duration::try_hours(hours) {
            Some(span) => cutoff(self.clock.now(), span),
            None => DateTime::<Utc>::MIN_UTC,
        };
        let rooms = self.rooms.read().await;
        rooms
            .get(room_id)
            .map(|r| r.history_since(cutoff))
            .unwrap_or_default()
    }

    /// Drop rooms without activity within `ttl`
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let cutoff = cutoff(self.clock.now(), ttl);

        let mut rooms = self.rooms.write().await;
        let before_count = rooms.len();
        rooms.retain(|_id, room| {
            let keep = room.last_activity() > cutoff;
            if !keep {
                debug!(room_id = room.room_id(), "Evicting idle room");
            }
            keep
        });

        let removed = before_count - rooms.len();
        if removed > 0 {
            info!(
                removed_rooms = removed,
                remaining_rooms = rooms.len(),
                "Evicted idle rooms"
            );
        }
        removed
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    fn publish_analysis(&self, analysis: &RoomAnalysis) {
        self.publish(IntentEvent::RoomAnalyzed {
            room_id: analysis.room_id.clone(),
            dominant_intent: analysis.summary.dominant_intent.clone(),
            intent_weights: analysis.summary.intent_weights.clone(),
            at: analysis.analyzed_at,
        });
        if let Some(transition) = &analysis.transition {
            self.publish(IntentEvent::IntentChanged {
                room_id: analysis.room_id.clone(),
                previous: transition.previous.clone(),
                new: transition.new.clone(),
                sample: transition.sample.clone(),
                at: transition.timestamp,
            });
        }
    }

    fn publish(&self, event: IntentEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
