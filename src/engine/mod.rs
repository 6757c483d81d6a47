//! Engine - A caller-owned bundle of rule set, classifier and aggregator
//!
//! Engines hold no global state. Build as many as needed side by side,
//! e.g. one per taxonomy when comparing them.

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::aggregate::{ConversationAggregator, ConversationSummary};
use crate::classifier::MessageClassifier;
use crate::clock::Clock;
use crate::config::IntentConfig;
use crate::error::{IntentError, Result};
use crate::intent::Intent;
use crate::room::RoomRegistry;
use crate::rules::IntentRuleSet;
use crate::taxonomy::{Taxonomy, TaxonomyKind};

#[derive(Debug, Clone)]
pub struct IntentEngine {
    rules: Arc<IntentRuleSet>,
    aggregator: Arc<ConversationAggregator>,
}

impl IntentEngine {
    /// Resolve the configured taxonomy and build the engine around it
    pub fn from_config(config: &IntentConfig) -> Result<Self> {
        let taxonomy = resolve_taxonomy(config)?;
        Self::build(&taxonomy, config)
    }

    /// Build from an explicit taxonomy; taxonomy selection in `config` is ignored
    pub fn build(taxonomy: &Taxonomy, config: &IntentConfig) -> Result<Self> {
        let taxonomy = match &config.default_intent {
            Some(default_intent) => taxonomy.clone().with_default_intent(default_intent.clone()),
            None => taxonomy.clone(),
        };

        let rules = Arc::new(IntentRuleSet::new(&taxonomy)?);
        let classifier =
            MessageClassifier::new(rules.clone()).with_null_behavior(config.null_behavior);
        let aggregator = ConversationAggregator::new(
            classifier,
            config.recent_window_size,
            config.dominance_threshold,
        )?;

        info!(
            taxonomy = %rules.name(),
            default_intent = %rules.default_intent(),
            window = config.recent_window_size,
            threshold = config.dominance_threshold,
            "Intent engine ready"
        );

        Ok(Self {
            rules,
            aggregator: Arc::new(aggregator),
        })
    }

    pub fn classify(&self, text: &str) -> Option<Intent> {
        self.aggregator.classifier().classify(text)
    }

    /// Classify with the configured null behavior applied
    pub fn label(&self, text: &str) -> Option<Intent> {
        self.aggregator.classifier().label(text)
    }

    pub fn aggregate<S: AsRef<str>>(&self, messages: &[S]) -> ConversationSummary {
        self.aggregator.aggregate(messages)
    }

    pub fn aggregate_with_window<S: AsRef<str>>(
        &self,
        messages: &[S],
        recent_window_size: usize,
    ) -> Result<ConversationSummary> {
        self.aggregator
            .aggregate_with_window(messages, recent_window_size)
    }

    /// A room registry sharing this engine's aggregator
    pub fn room_registry(&self, config: &IntentConfig, clock: Arc<dyn Clock>) -> RoomRegistry {
        RoomRegistry::new(self.aggregator.clone(), config.room.clone(), clock)
    }

    pub fn rules(&self) -> &Arc<IntentRuleSet> {
        &self.rules
    }

    pub fn classifier(&self) -> &MessageClassifier {
        self.aggregator.classifier()
    }

    pub fn aggregator(&self) -> &Arc<ConversationAggregator> {
        &self.aggregator
    }
}

/// The taxonomy value a configuration points at
pub fn resolve_taxonomy(config: &IntentConfig) -> Result<Taxonomy> {
    match (config.taxonomy, &config.taxonomy_path) {
        (TaxonomyKind::Custom, Some(path)) => Taxonomy::load(Path::new(path)),
        (TaxonomyKind::Custom, None) => Err(IntentError::configuration(
            "taxonomy = \"custom\" requires taxonomy_path",
        )),
        (kind, _) => Taxonomy::builtin(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::NullBehavior;

    #[test]
    fn test_engines_side_by_side() {
        let financial = IntentEngine::from_config(&IntentConfig::default()).unwrap();
        let mentoring = IntentEngine::from_config(&IntentConfig {
            taxonomy: TaxonomyKind::EngagementMentoring,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            financial.classify("I just made my first sale!"),
            Some(Intent::from("activated"))
        );
        assert_eq!(
            mentoring.classify("Here's how I approach cold outreach"),
            Some(Intent::from("engaging"))
        );
        assert_eq!(financial.rules().name(), "financial_funnel");
        assert_eq!(mentoring.rules().name(), "engagement_mentoring");
    }

    #[test]
    fn test_default_intent_override() {
        let engine = IntentEngine::from_config(&IntentConfig {
            default_intent: Some("followed_up".to_string()),
            null_behavior: NullBehavior::SubstituteDefault,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(engine.label("nice weather"), Some(Intent::from("followed_up")));
        assert_eq!(engine.aggregate::<&str>(&[]).dominant_intent, "followed_up");
    }

    #[test]
    fn test_unknown_default_intent_is_fatal() {
        let err = IntentEngine::from_config(&IntentConfig {
            default_intent: Some("bored".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_custom_taxonomy_from_file() {
        let dir = std::env::temp_dir().join(format!("convo-intent-engine-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("desk.json");
        std::fs::write(
            &path,
            r#"{
                "name": "desk",
                "default_intent": "other",
                "priority": ["urgent"],
                "intent": [
                    {"name": "urgent", "patterns": ["asap", "urgent"]},
                    {"name": "other", "patterns": []}
                ]
            }"#,
        )
        .unwrap();

        let engine = IntentEngine::from_config(&IntentConfig {
            taxonomy: TaxonomyKind::Custom,
            taxonomy_path: Some(path.to_string_lossy().to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(engine.classify("Need this ASAP"), Some(Intent::from("urgent")));
        assert_eq!(engine.classify("whenever"), None);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_custom_without_path() {
        let config = IntentConfig {
            taxonomy: TaxonomyKind::Custom,
            ..Default::default()
        };
        assert!(resolve_taxonomy(&config).is_err());
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_parts_are_send_sync() {
        assert_send_sync::<IntentRuleSet>();
        assert_send_sync::<MessageClassifier>();
        assert_send_sync::<ConversationAggregator>();
        assert_send_sync::<IntentEngine>();
    }

    #[test]
    fn test_shared_engine_across_threads() {
        let engine = Arc::new(IntentEngine::from_config(&IntentConfig::default()).unwrap());
        let messages = vec![
            "What is this platform about?".to_string(),
            "I just made my first sale!".to_string(),
            "completely unrelated text about weather".to_string(),
            "I'm not interested anymore, please remove me".to_string(),
            "Following up on our previous discussion".to_string(),
            String::new(),
        ];

        let expected_labels: Vec<Option<Intent>> =
            messages.iter().map(|m| engine.classify(m)).collect();
        let expected_summary = engine.aggregate(&messages);

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let engine = engine.clone();
                let messages = messages.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| {
                            let labels: Vec<Option<Intent>> =
                                messages.iter().map(|m| engine.classify(m)).collect();
                            (labels, engine.aggregate(&messages))
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for worker in workers {
            for (labels, summary) in worker.join().unwrap() {
                assert_eq!(labels, expected_labels);
                assert_eq!(summary.dominant_intent, expected_summary.dominant_intent);
                let bits = |s: &ConversationSummary| {
                    s.intent_weights
                        .iter()
                        .map(|(intent, weight)| (intent.clone(), weight.to_bits()))
                        .collect::<Vec<_>>()
                };
                assert_eq!(bits(&summary), bits(&expected_summary));
            }
        }
    }

    #[test]
    fn test_explicit_window() {
        let engine = IntentEngine::from_config(&IntentConfig::default()).unwrap();
        assert!(engine.aggregate_with_window(&["hi"], 0).is_err());
        assert!(engine.aggregate_with_window(&["hi"], 1).is_ok());
    }
}
