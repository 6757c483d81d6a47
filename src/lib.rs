//! Convo Intent - Rule-based intent tagging for chat conversations
//!
//! Tags each chat message with a sales or engagement intent and summarizes
//! conversations into an intent distribution with a single dominant intent.
//!
//! The engine is made of:
//! - Taxonomies (intents, regex patterns, priority order, default intent)
//! - A compiled, immutable rule set
//! - A per-message classifier
//! - A recency-weighted conversation aggregator
//! - Optional per-room tracking with a periodic re-aggregation task
//!
//! Everything except the room registry is immutable and safe to share
//! across threads without locking.

pub mod aggregate;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod intent;
pub mod room;
pub mod rules;
pub mod scheduler;
pub mod taxonomy;

pub use aggregate::{ConversationAggregator, ConversationSummary, IntentWeights};
pub use classifier::MessageClassifier;
pub use config::IntentConfig;
pub use engine::IntentEngine;
pub use error::{IntentError, Result};
pub use intent::{Intent, NullBehavior};
pub use rules::IntentRuleSet;
pub use taxonomy::{Taxonomy, TaxonomyKind};
