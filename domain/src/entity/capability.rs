//! Entity capabilities
//!
//! Capabilities are set-valued tags on an entity, indexed by the registry.
//! There is no participant subclass hierarchy: a moderator is simply an
//! entity carrying the `moderate` tag.

use serde::{Deserialize, Serialize};

/// What a participant is able to do in a circle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCapability {
    /// Produce proposals, responses, and observations
    Generate,
    /// Cast votes in consensus rounds
    Vote,
    /// Condense a finished transcript into a summary
    Summarize,
    /// Steer turn-taking via control messages
    Moderate,
}

impl EntityCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCapability::Generate => "generate",
            EntityCapability::Vote => "vote",
            EntityCapability::Summarize => "summarize",
            EntityCapability::Moderate => "moderate",
        }
    }

    /// All defined capabilities, in a stable order
    pub fn all() -> [EntityCapability; 4] {
        [
            EntityCapability::Generate,
            EntityCapability::Vote,
            EntityCapability::Summarize,
            EntityCapability::Moderate,
        ]
    }
}

impl std::fmt::Display for EntityCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityCapability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "generate" => Ok(EntityCapability::Generate),
            "vote" => Ok(EntityCapability::Vote),
            "summarize" => Ok(EntityCapability::Summarize),
            "moderate" => Ok(EntityCapability::Moderate),
            _ => Err(format!(
                "Unknown capability: {}. Valid: generate, vote, summarize, moderate",
                s
            )),
        }
    }
}
