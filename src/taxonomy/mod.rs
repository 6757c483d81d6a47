//! Taxonomy - The classification vocabulary as data
//!
//! A taxonomy names its intents, the raw regex patterns for each, the
//! priority order used to break ties and the default (neutral) intent.
//! Two taxonomies ship built in; custom ones load from TOML or JSON.
//!
//! Taxonomies are plain values. Validation and regex compilation happen
//! when an [`IntentRuleSet`](crate::rules::IntentRuleSet) is built from one.

mod financial;
mod mentoring;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{IntentError, Result};

/// Which taxonomy an engine should use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    /// Insurance / financial-product sales funnel
    #[default]
    FinancialFunnel,
    /// Peer-mentoring and engagement conversations
    EngagementMentoring,
    /// Loaded from a file given in configuration
    Custom,
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FinancialFunnel => "financial_funnel",
            Self::EngagementMentoring => "engagement_mentoring",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl FromStr for TaxonomyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "financial_funnel" | "financial" | "sales" => Ok(Self::FinancialFunnel),
            "engagement_mentoring" | "mentoring" | "engagement" => Ok(Self::EngagementMentoring),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown taxonomy '{}'", other)),
        }
    }
}

/// Raw patterns for one intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentPatterns {
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// A complete, uncompiled taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub name: String,

    /// Intent used for empty conversations and for messages with no match
    pub default_intent: String,

    /// Highest priority first
    #[serde(default)]
    pub priority: Vec<String>,

    /// Intents in declaration order
    #[serde(rename = "intent", alias = "intents")]
    pub intents: Vec<IntentPatterns>,
}

impl Taxonomy {
    /// Get a built-in taxonomy. `Custom` has no built-in form.
    pub fn builtin(kind: TaxonomyKind) -> Result<Self> {
        match kind {
            TaxonomyKind::FinancialFunnel => Ok(Self::financial_funnel()),
            TaxonomyKind::EngagementMentoring => Ok(Self::engagement_mentoring()),
            TaxonomyKind::Custom => Err(IntentError::configuration(
                "custom taxonomy requires a taxonomy_path",
            )),
        }
    }

    pub fn financial_funnel() -> Self {
        Self::from_tables(
            "financial_funnel",
            financial::DEFAULT_INTENT,
            financial::PRIORITY,
            financial::PATTERNS,
        )
    }

    pub fn engagement_mentoring() -> Self {
        Self::from_tables(
            "engagement_mentoring",
            mentoring::DEFAULT_INTENT,
            mentoring::PRIORITY,
            mentoring::PATTERNS,
        )
    }

    fn from_tables(
        name: &str,
        default_intent: &str,
        priority: &[&str],
        patterns: &[(&str, &[&str])],
    ) -> Self {
        Self {
            name: name.to_string(),
            default_intent: default_intent.to_string(),
            priority: priority.iter().map(|p| p.to_string()).collect(),
            intents: patterns
                .iter()
                .map(|(intent, raw)| IntentPatterns {
                    name: intent.to_string(),
                    patterns: raw.iter().map(|p| p.to_string()).collect(),
                })
                .collect(),
        }
    }

    /// Load a taxonomy file, picking the format from the extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| IntentError::Io {
            path: display.clone(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };

        parsed.map_err(|err| match err {
            IntentError::Parse { message, .. } => IntentError::Parse {
                path: display,
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| IntentError::Parse {
            path: "<toml>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| IntentError::Parse {
            path: "<json>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| IntentError::Parse {
            path: self.name.clone(),
            message: e.to_string(),
        })
    }

    /// Replace the default intent (e.g. from a host override)
    pub fn with_default_intent(mut self, intent: impl Into<String>) -> Self {
        self.default_intent = intent.into();
        self
    }

    pub fn intent_names(&self) -> impl Iterator<Item = &str> {
        self.intents.iter().map(|i| i.name.as_str())
    }

    pub fn pattern_count(&self) -> usize {
        self.intents.iter().map(|i| i.patterns.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_financial_taxonomy_shape() {
        let taxonomy = Taxonomy::financial_funnel();
        let names: Vec<_> = taxonomy.intent_names().collect();

        assert_eq!(names.len(), 10);
        for expected in [
            "exploring",
            "interested",
            "confused",
            "needs_support",
            "facing_issues",
            "activated",
            "inactive",
            "ready_to_onboard",
            "followed_up",
            "dropped_off",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
        assert_eq!(taxonomy.default_intent, "exploring");
        assert_eq!(taxonomy.priority.first().map(String::as_str), Some("dropped_off"));
    }

    #[test]
    fn test_mentoring_taxonomy_shape() {
        let taxonomy = Taxonomy::engagement_mentoring();
        let names: Vec<_> = taxonomy.intent_names().collect();

        assert_eq!(names.len(), 8);
        assert!(names.contains(&"progress_oriented"));
        assert!(names.contains(&"reflective"));
        assert!(names.contains(&taxonomy.default_intent.as_str()));
    }

    #[test]
    fn test_builtin_custom_requires_path() {
        assert!(Taxonomy::builtin(TaxonomyKind::Custom).is_err());
        assert!(Taxonomy::builtin(TaxonomyKind::EngagementMentoring).is_ok());
    }

    #[test]
    fn test_kind_parse_and_display() {
        assert_eq!("mentoring".parse::<TaxonomyKind>().unwrap(), TaxonomyKind::EngagementMentoring);
        assert_eq!(
            "financial-funnel".parse::<TaxonomyKind>().unwrap(),
            TaxonomyKind::FinancialFunnel
        );
        assert_eq!(TaxonomyKind::EngagementMentoring.to_string(), "engagement_mentoring");
        assert!("weather".parse::<TaxonomyKind>().is_err());
    }

    #[test]
    fn test_toml_round_trip_of_custom_taxonomy() {
        let content = r#"
name = "support_desk"
default_intent = "other"
priority = ["angry", "question"]

[[intent]]
name = "angry"
patterns = ["furious", "unacceptable"]

[[intent]]
name = "question"
patterns = ['\?$']

[[intent]]
name = "other"
"#;

        let taxonomy = Taxonomy::from_toml_str(content).unwrap();
        assert_eq!(taxonomy.name, "support_desk");
        assert_eq!(taxonomy.intents.len(), 3);
        assert!(taxonomy.intents[2].patterns.is_empty());
        assert_eq!(taxonomy.pattern_count(), 3);

        let rendered = taxonomy.to_toml().unwrap();
        assert_eq!(Taxonomy::from_toml_str(&rendered).unwrap(), taxonomy);
    }

    #[test]
    fn test_json_accepts_intents_alias() {
        let content = r#"{
            "name": "tiny",
            "default_intent": "a",
            "intents": [{"name": "a", "patterns": ["alpha"]}]
        }"#;

        let taxonomy = Taxonomy::from_json_str(content).unwrap();
        assert!(taxonomy.priority.is_empty());
        assert_eq!(taxonomy.intents[0].patterns, vec!["alpha".to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        match Taxonomy::load("/nonexistent/taxonomy.toml") {
            Err(IntentError::Io { path, .. }) => assert!(path.contains("taxonomy.toml")),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_with_default_intent() {
        let taxonomy = Taxonomy::financial_funnel().with_default_intent("followed_up");
        assert_eq!(taxonomy.default_intent, "followed_up");
    }
}
