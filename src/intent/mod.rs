//! Intent - The label attached to a message or a conversation
//!
//! Intents are plain names drawn from the active taxonomy. The engine never
//! invents one: every `Intent` it hands back was declared by a taxonomy.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A single intent label, e.g. `dropped_off` or `engaging`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intent(String);

impl Intent {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Intent names must be non-empty and free of whitespace
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty() && !name.chars().any(char::is_whitespace)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Intent {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Intent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Intent {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl PartialEq<str> for Intent {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Intent {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// What a call site does when a message matches no pattern at all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullBehavior {
    /// Leave the message untagged
    #[default]
    ReturnNull,
    /// Tag the message with the taxonomy's default intent
    SubstituteDefault,
}

impl std::str::FromStr for NullBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "return_null" | "null" => Ok(Self::ReturnNull),
            "substitute_default" | "default" => Ok(Self::SubstituteDefault),
            other => Err(format!("unknown null behavior '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_borrow_lookup() {
        let mut counts: HashMap<Intent, u32> = HashMap::new();
        counts.insert(Intent::from("activated"), 3);
        assert_eq!(counts.get("activated"), Some(&3));
    }

    #[test]
    fn test_name_validation() {
        assert!(Intent::is_valid_name("ready_to_onboard"));
        assert!(!Intent::is_valid_name(""));
        assert!(!Intent::is_valid_name("ready to onboard"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Intent::from("confused")).unwrap();
        assert_eq!(json, "\"confused\"");
    }

    #[test]
    fn test_null_behavior_parse() {
        assert_eq!(
            "substitute-default".parse::<NullBehavior>().unwrap(),
            NullBehavior::SubstituteDefault
        );
        assert_eq!("return_null".parse::<NullBehavior>().unwrap(), NullBehavior::ReturnNull);
        assert!("sometimes".parse::<NullBehavior>().is_err());
    }
}
