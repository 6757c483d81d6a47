//! Conversation aggregation - Distribution and dominant intent for a window
//!
//! Each message is classified on its own. Messages with no match count
//! toward the taxonomy default. The last `recent_window_size` messages get a
//! flat bonus of two extra counts each (three in total), which lets the
//! dominant intent follow topic drift without a decay curve.
//!
//! The dominant intent is the first intent in priority order whose share
//! reaches the dominance threshold, or the default when none does.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::classifier::{json_kind, MessageClassifier};
use crate::error::{IntentError, Result};
use crate::intent::Intent;

/// Default number of trailing messages that receive the recency bonus
pub const DEFAULT_RECENT_WINDOW: usize = 5;

/// Default minimum share for an intent to be dominant
pub const DEFAULT_DOMINANCE_THRESHOLD: f64 = 0.20;

/// Extra counts per message inside the recent window
const RECENCY_BONUS: u64 = 2;

/// Normalized intent shares, summing to 1.0 over the intents present
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentWeights(BTreeMap<Intent, f64>);

impl IntentWeights {
    pub fn get(&self, intent: &str) -> Option<f64> {
        self.0.get(intent).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Intent, f64)> {
        self.0.iter().map(|(intent, weight)| (intent, *weight))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// JSON object form, as stored alongside a room's current intent
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn from_json(blob: &str) -> Result<Self> {
        serde_json::from_str(blob).map_err(|e| IntentError::Parse {
            path: "<intent_weights>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Result of aggregating one conversation window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub dominant_intent: Intent,
    pub intent_weights: IntentWeights,
}

/// Summarizes message sequences into a distribution and a dominant intent
#[derive(Debug, Clone)]
pub struct ConversationAggregator {
    classifier: MessageClassifier,
    recent_window_size: usize,
    dominance_threshold: f64,
}

impl ConversationAggregator {
    pub fn new(
        classifier: MessageClassifier,
        recent_window_size: usize,
        dominance_threshold: f64,
    ) -> Result<Self> {
        if recent_window_size < 1 {
            return Err(IntentError::configuration(
                "recent_window_size must be at least 1",
            ));
        }
        if !(dominance_threshold > 0.0 && dominance_threshold <= 1.0) {
            return Err(IntentError::configuration(format!(
                "dominance_threshold must be in (0, 1], got {}",
                dominance_threshold
            )));
        }

        Ok(Self {
            classifier,
            recent_window_size,
            dominance_threshold,
        })
    }

    /// Aggregator with the default window and threshold
    pub fn with_defaults(classifier: MessageClassifier) -> Self {
        Self {
            classifier,
            recent_window_size: DEFAULT_RECENT_WINDOW,
            dominance_threshold: DEFAULT_DOMINANCE_THRESHOLD,
        }
    }

    /// Aggregate chronologically ordered messages with the configured window
    pub fn aggregate<S: AsRef<str>>(&self, messages: &[S]) -> ConversationSummary {
        let intents: Vec<Intent> = messages
            .iter()
            .map(|m| self.classifier.classify_or_default(m.as_ref()))
            .collect();
        self.summarize(&intents, self.recent_window_size)
    }

    /// Aggregate with an explicit window. A window of zero is a caller error.
    pub fn aggregate_with_window<S: AsRef<str>>(
        &self,
        messages: &[S],
        recent_window_size: usize,
    ) -> Result<ConversationSummary> {
        if recent_window_size < 1 {
            return Err(IntentError::invalid_input(
                "recent window size must be at least 1",
            ));
        }
        let intents: Vec<Intent> = messages
            .iter()
            .map(|m| self.classifier.classify_or_default(m.as_ref()))
            .collect();
        Ok(self.summarize(&intents, recent_window_size))
    }

    /// Aggregate host-supplied JSON values; every element must be a string
    pub fn aggregate_values(&self, messages: &[Value]) -> Result<ConversationSummary> {
        let texts = messages
            .iter()
            .enumerate()
            .map(|(index, value)| {
                value.as_str().ok_or_else(|| {
                    IntentError::invalid_input(format!(
                        "message {} is {}, expected text",
                        index,
                        json_kind(value)
                    ))
                })
            })
            .collect::<Result<Vec<&str>>>()?;
        Ok(self.aggregate(&texts))
    }

    fn summarize(&self, intents: &[Intent], window: usize) -> ConversationSummary {
        let rules = self.classifier.rules();
        let default_intent = rules.default_intent();

        if intents.is_empty() {
            return ConversationSummary {
                dominant_intent: default_intent.clone(),
                intent_weights: IntentWeights(BTreeMap::from([(default_intent.clone(), 1.0)])),
            };
        }

        let mut counts: BTreeMap<Intent, u64> = BTreeMap::new();
        for intent in intents {
            *counts.entry(intent.clone()).or_insert(0) += 1;
        }

        if intents.len() >= window {
            for intent in &intents[intents.len() - window..] {
                *counts.entry(intent.clone()).or_insert(0) += RECENCY_BONUS;
            }
        }

        let total: u64 = counts.values().sum();
        let weights: BTreeMap<Intent, f64> = counts
            .into_iter()
            .map(|(intent, count)| (intent, count as f64 / total as f64))
            .collect();

        let dominant_intent = rules
            .priority()
            .iter()
            .find(|intent| {
                weights
                    .get(*intent)
                    .map_or(false, |weight| *weight >= self.dominance_threshold)
            })
            .unwrap_or(default_intent)
            .clone();

        debug!(
            taxonomy = %rules.name(),
            messages = intents.len(),
            dominant = %dominant_intent,
            "Aggregated conversation"
        );

        ConversationSummary {
            dominant_intent,
            intent_weights: IntentWeights(weights),
        }
    }

    pub fn classifier(&self) -> &MessageClassifier {
        &self.classifier
    }

    pub fn recent_window_size(&self) -> usize {
        self.recent_window_size
    }

    pub fn dominance_threshold(&self) -> f64 {
        self.dominance_threshold
    }
}
