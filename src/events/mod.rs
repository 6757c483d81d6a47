use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::IntentWeights;
use crate::intent::Intent;

/// Events published for the host to persist or display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IntentEvent {
    /// Fired for every ingested message
    MessageClassified {
        room_id: String,
        user_id: String,
        intent: Option<Intent>,
        at: DateTime<Utc>,
    },
    /// Fired after a room's conversation window was aggregated
    RoomAnalyzed {
        room_id: String,
        dominant_intent: Intent,
        intent_weights: IntentWeights,
        at: DateTime<Utc>,
    },
    /// Fired when a room's dominant intent changes
    IntentChanged {
        room_id: String,
        previous: Option<Intent>,
        new: Intent,
        sample: String,
        at: DateTime<Utc>,
    },
}

impl IntentEvent {
    pub fn room_id(&self) -> &str {
        match self {
            Self::MessageClassified { room_id, .. }
            | Self::RoomAnalyzed { room_id, .. }
            | Self::IntentChanged { room_id, .. } => room_id,
        }
    }
}
