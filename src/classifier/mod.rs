//! Message classifier - One message in, one intent (or none) out

use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

use crate::error::{IntentError, Result};
use crate::intent::{Intent, NullBehavior};
use crate::rules::IntentRuleSet;

/// Picks the single best intent for a message
#[derive(Debug, Clone)]
pub struct MessageClassifier {
    rules: Arc<IntentRuleSet>,
    null_behavior: NullBehavior,
}

impl MessageClassifier {
    pub fn new(rules: Arc<IntentRuleSet>) -> Self {
        Self {
            rules,
            null_behavior: NullBehavior::default(),
        }
    }

    pub fn with_null_behavior(mut self, null_behavior: NullBehavior) -> Self {
        self.null_behavior = null_behavior;
        self
    }

    /// Classify a message.
    ///
    /// Returns `None` for blank text and for text that matches no pattern.
    /// Ties on the best score go to the intent with the lowest priority rank.
    pub fn classify(&self, text: &str) -> Option<Intent> {
        if text.trim().is_empty() {
            return None;
        }

        let scores = self.rules.score_by_index(text);
        let max_score = scores.iter().copied().max().unwrap_or(0);
        if max_score == 0 {
            trace!(taxonomy = %self.rules.name(), "No intent pattern matched");
            return None;
        }

        self.rules
            .intents()
            .iter()
            .zip(scores)
            .filter(|(_, score)| *score == max_score)
            .map(|(intent, _)| intent)
            .min_by(|a, b| self.rules.tie_break_key(a).cmp(&self.rules.tie_break_key(b)))
            .cloned()
    }

    /// Classify a host-supplied JSON value. Anything but a string is rejected.
    pub fn classify_value(&self, value: &Value) -> Result<Option<Intent>> {
        match value {
            Value::String(text) => Ok(self.classify(text)),
            other => Err(IntentError::invalid_input(format!(
                "expected message text, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Classify, then apply the configured [`NullBehavior`]
    pub fn label(&self, text: &str) -> Option<Intent> {
        match (self.classify(text), self.null_behavior) {
            (Some(intent), _) => Some(intent),
            (None, NullBehavior::ReturnNull) => None,
            (None, NullBehavior::SubstituteDefault) => Some(self.rules.default_intent().clone()),
        }
    }

    /// [`label`](Self::label) for a host-supplied JSON value
    pub fn label_value(&self, value: &Value) -> Result<Option<Intent>> {
        match value {
            Value::String(text) => Ok(self.label(text)),
            other => self.classify_value(other),
        }
    }

    /// Classify, substituting the taxonomy default for no match
    pub fn classify_or_default(&self, text: &str) -> Intent {
        self.classify(text)
            .unwrap_or_else(|| self.rules.default_intent().clone())
    }

    pub fn rules(&self) -> &Arc<IntentRuleSet> {
        &self.rules
    }

    pub fn null_behavior(&self) -> NullBehavior {
        self.null_behavior
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{IntentPatterns, Taxonomy};
    use serde_json::json;

    fn classifier_for(taxonomy: Taxonomy) -> MessageClassifier {
        MessageClassifier::new(Arc::new(IntentRuleSet::new(&taxonomy).unwrap()))
    }

    fn financial() -> MessageClassifier {
        classifier_for(Taxonomy::financial_funnel())
    }

    fn mentoring() -> MessageClassifier {
        classifier_for(Taxonomy::engagement_mentoring())
    }

    /// Two intents with one pattern each, both hit by "tie"
    fn tied(priority: &[&str]) -> MessageClassifier {
        classifier_for(Taxonomy {
            name: "tied".to_string(),
            default_intent: "x".to_string(),
            priority: priority.iter().map(|p| p.to_string()).collect(),
            intents: vec![
                IntentPatterns {
                    name: "x".to_string(),
                    patterns: vec!["tie".to_string(), "only_x".to_string()],
                },
                IntentPatterns {
                    name: "y".to_string(),
                    patterns: vec!["tie".to_string(), "only_y".to_string()],
                },
                IntentPatterns {
                    name: "w".to_string(),
                    patterns: vec!["tie".to_string()],
                },
            ],
        })
    }

    #[test]
    fn test_blank_text_is_unclassified() {
        for classifier in [financial(), mentoring()] {
            assert_eq!(classifier.classify(""), None);
            assert_eq!(classifier.classify("   "), None);
            assert_eq!(classifier.classify("\n\t"), None);
        }
    }

    #[test]
    fn test_no_match_is_unclassified() {
        assert_eq!(financial().classify("completely unrelated text about weather"), None);
    }

    #[test]
    fn test_single_intent_match() {
        let classifier = tied(&["x", "y"]);
        assert_eq!(classifier.classify("only_y here"), Some(Intent::from("y")));
    }

    #[test]
    fn test_tie_goes_to_higher_priority() {
        assert_eq!(tied(&["x", "y"]).classify("a tie"), Some(Intent::from("x")));
        assert_eq!(tied(&["y", "x"]).classify("a tie"), Some(Intent::from("y")));
    }

    #[test]
    fn test_higher_score_beats_priority() {
        // y scores 2, x scores 1 even though x ranks first
        assert_eq!(
            tied(&["x", "y"]).classify("tie only_y"),
            Some(Intent::from("y"))
        );
    }

    #[test]
    fn test_listed_intent_beats_unlisted_on_tie() {
        assert_eq!(tied(&["y"]).classify("tie"), Some(Intent::from("y")));
    }

    #[test]
    fn test_unlisted_ties_break_lexically() {
        // w, x, y all unlisted and tied: "w" sorts first
        assert_eq!(tied(&[]).classify("tie"), Some(Intent::from("w")));
    }

    #[test]
    fn test_financial_scenarios() {
        let classifier = financial();
        assert_eq!(
            classifier.classify("I'm not interested anymore, please remove me"),
            Some(Intent::from("dropped_off"))
        );
        assert_eq!(
            classifier.classify("What is this platform about?"),
            Some(Intent::from("exploring"))
        );
        assert_eq!(
            classifier.classify("I just made my first sale!"),
            Some(Intent::from("activated"))
        );
        assert_eq!(
            classifier.classify("Following up on our previous discussion"),
            Some(Intent::from("followed_up"))
        );
    }

    #[test]
    fn test_mentoring_scenarios() {
        let classifier = mentoring();
        assert_eq!(
            classifier.classify("I'm struggling with getting responses, no one replies"),
            Some(Intent::from("problematic"))
        );
        assert_eq!(
            classifier.classify("Here's how I approach cold outreach"),
            Some(Intent::from("engaging"))
        );
        assert_eq!(
            classifier.classify("Congrats, well done on that!"),
            Some(Intent::from("supportive"))
        );
    }

    #[test]
    fn test_result_is_member_of_taxonomy() {
        let classifier = financial();
        let samples = [
            "I need help with my loan application",
            "The premium is too high and I can't afford it",
            "Sign me up now",
            "I'm confused by the fine print",
        ];
        for sample in samples {
            if let Some(intent) = classifier.classify(sample) {
                assert!(classifier.rules().contains(intent.as_str()));
            }
        }
    }

    #[test]
    fn test_classify_value_rejects_non_text() {
        let classifier = financial();
        assert_eq!(
            classifier.classify_value(&json!("I just made my first sale!")).unwrap(),
            Some(Intent::from("activated"))
        );

        for value in [json!(42), json!(null), json!({"content": "hi"}), json!(["a"])] {
            match classifier.classify_value(&value) {
                Err(IntentError::InvalidInput(_)) => {}
                other => panic!("Expected InvalidInput, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_label_respects_null_behavior() {
        let text = "completely unrelated text about weather";

        assert_eq!(financial().label(text), None);

        let substituting = financial().with_null_behavior(NullBehavior::SubstituteDefault);
        assert_eq!(substituting.label(text), Some(Intent::from("exploring")));
        assert_eq!(
            substituting.label("I just made my first sale!"),
            Some(Intent::from("activated"))
        );
        assert_eq!(
            substituting.label_value(&json!(text)).unwrap(),
            Some(Intent::from("exploring"))
        );
        assert!(substituting.label_value(&json!(3.5)).is_err());
    }
}
