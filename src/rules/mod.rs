//! Rule set - A taxonomy compiled for matching
//!
//! Every raw pattern is compiled exactly once, into a single case-insensitive
//! `RegexSet`, so scoring a message is one pass over the text no matter how
//! many patterns the taxonomy carries.
//!
//! Priority policy: intents missing from the priority order rank after every
//! listed intent. When several unlisted intents tie, the lexically smallest
//! name wins.

use regex::{RegexBuilder, RegexSet, RegexSetBuilder};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::error::{IntentError, Result};
use crate::intent::Intent;
use crate::taxonomy::Taxonomy;

/// Compiled program limit for the whole pattern set
const SET_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// Per-intent match counts, one entry per intent in the taxonomy
pub type IntentScores = BTreeMap<Intent, u32>;

/// Immutable, compiled classification vocabulary
#[derive(Debug, Clone)]
pub struct IntentRuleSet {
    name: String,
    /// Declaration order
    intents: Vec<Intent>,
    default_intent: Intent,
    priority: Vec<Intent>,
    ranks: HashMap<Intent, usize>,
    patterns: RegexSet,
    /// `pattern_owner[i]` is the index in `intents` that pattern `i` belongs to
    pattern_owner: Vec<usize>,
}

impl IntentRuleSet {
    /// Validate and compile a taxonomy
    pub fn new(taxonomy: &Taxonomy) -> Result<Self> {
        if taxonomy.intents.is_empty() {
            return Err(IntentError::configuration(format!(
                "taxonomy '{}' declares no intents",
                taxonomy.name
            )));
        }

        let mut intents = Vec::with_capacity(taxonomy.intents.len());
        let mut seen = HashSet::new();
        let mut raw_patterns = Vec::new();
        let mut pattern_owner = Vec::new();

        for (index, entry) in taxonomy.intents.iter().enumerate() {
            if !Intent::is_valid_name(&entry.name) {
                return Err(IntentError::configuration(format!(
                    "invalid intent name {:?} in taxonomy '{}'",
                    entry.name, taxonomy.name
                )));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(IntentError::configuration(format!(
                    "intent '{}' is declared twice in taxonomy '{}'",
                    entry.name, taxonomy.name
                )));
            }
            if entry.patterns.is_empty() {
                warn!(intent = %entry.name, "Intent has no patterns and can only be reached as a default");
            }

            for raw in &entry.patterns {
                raw_patterns.push(raw.as_str());
                pattern_owner.push(index);
            }

            intents.push(Intent::new(entry.name.clone()));
        }

        let mut priority = Vec::with_capacity(taxonomy.priority.len());
        let mut ranks = HashMap::with_capacity(taxonomy.priority.len());
        for name in &taxonomy.priority {
            if !seen.contains(name.as_str()) {
                return Err(IntentError::configuration(format!(
                    "priority references unknown intent '{}' in taxonomy '{}'",
                    name, taxonomy.name
                )));
            }
            let intent = Intent::new(name.clone());
            if ranks.insert(intent.clone(), priority.len()).is_some() {
                return Err(IntentError::configuration(format!(
                    "intent '{}' appears twice in the priority order of taxonomy '{}'",
                    name, taxonomy.name
                )));
            }
            priority.push(intent);
        }

        if !seen.contains(taxonomy.default_intent.as_str()) {
            return Err(IntentError::configuration(format!(
                "default intent '{}' is not part of taxonomy '{}'",
                taxonomy.default_intent, taxonomy.name
            )));
        }

        let patterns = RegexSetBuilder::new(&raw_patterns)
            .case_insensitive(true)
            .size_limit(SET_SIZE_LIMIT)
            .build()
            .map_err(|e| Self::pattern_error(taxonomy, &raw_patterns, &pattern_owner, e))?;

        info!(
            taxonomy = %taxonomy.name,
            intents = intents.len(),
            patterns = raw_patterns.len(),
            "Compiled intent rule set"
        );

        Ok(Self {
            name: taxonomy.name.clone(),
            intents,
            default_intent: Intent::new(taxonomy.default_intent.clone()),
            priority,
            ranks,
            patterns,
            pattern_owner,
        })
    }

    /// Name the pattern that broke the set. Patterns are only compiled one by
    /// one here, after the combined build has already failed.
    fn pattern_error(
        taxonomy: &Taxonomy,
        raw_patterns: &[&str],
        pattern_owner: &[usize],
        set_error: regex::Error,
    ) -> IntentError {
        for (raw, owner) in raw_patterns.iter().zip(pattern_owner) {
            if let Err(source) = RegexBuilder::new(raw).case_insensitive(true).build() {
                return IntentError::InvalidPattern {
                    intent: taxonomy.intents[*owner].name.clone(),
                    pattern: raw.to_string(),
                    source,
                };
            }
        }
        IntentError::configuration(format!(
            "failed to compile pattern set for taxonomy '{}': {}",
            taxonomy.name, set_error
        ))
    }

    /// Count, per intent, how many of its patterns occur in `text`.
    ///
    /// A pattern contributes at most one no matter how often it matches.
    pub fn score(&self, text: &str) -> IntentScores {
        let counts = self.score_by_index(text);
        self.intents
            .iter()
            .cloned()
            .zip(counts)
            .collect()
    }

    /// Scores aligned with [`intents`](Self::intents)
    pub(crate) fn score_by_index(&self, text: &str) -> Vec<u32> {
        let mut counts = vec![0u32; self.intents.len()];
        for pattern in self.patterns.matches(text).iter() {
            counts[self.pattern_owner[pattern]] += 1;
        }
        debug!(
            taxonomy = %self.name,
            matched = counts.iter().sum::<u32>(),
            "Scored text"
        );
        counts
    }

    /// Position in the priority order; lower wins ties.
    /// Unlisted intents share the lowest rank.
    pub fn priority_rank(&self, intent: &Intent) -> usize {
        self.ranks
            .get(intent)
            .copied()
            .unwrap_or(self.priority.len())
    }

    /// Ordering key for tie-breaks: rank first, then name for unlisted intents
    pub(crate) fn tie_break_key<'a>(&self, intent: &'a Intent) -> (usize, &'a str) {
        (self.priority_rank(intent), intent.as_str())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn intents(&self) -> &[Intent] {
        &self.intents
    }

    pub fn default_intent(&self) -> &Intent {
        &self.default_intent
    }

    /// Highest priority first
    pub fn priority(&self) -> &[Intent] {
        &self.priority
    }

    pub fn pattern_count(&self) -> usize {
        self.pattern_owner.len()
    }

    pub fn contains(&self, intent: &str) -> bool {
        self.intents.iter().any(|i| i.as_str() == intent)
    }
}
