//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the config file. They are
//! deserialized directly; policy and capability strings are parsed into
//! domain types at bootstrap, not here.

use circle_domain::{CircleRequest, EntityId, PolicySpec};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Session defaults
    pub circle: FileCircleConfig,
    /// Participant roster (`[[entity]]` tables)
    pub entity: Vec<FileEntityConfig>,
    /// Logging settings
    pub logging: FileLoggingConfig,
}

/// Session defaults (`[circle]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCircleConfig {
    /// Turn-taking policy: `round_robin`, `consensus`, or `moderator_led`
    pub policy: String,
    /// Approval ratio for the consensus policy
    pub threshold: Option<f64>,
    /// Moderator entity id for the moderator_led policy
    pub moderator: Option<String>,
    pub max_turns: usize,
    pub per_turn_timeout_secs: u64,
    pub session_timeout_secs: u64,
    pub min_quorum: usize,
    pub max_invoke_retries: usize,
    /// Close orderly sessions with a summarization turn
    pub summary: bool,
}

impl Default for FileCircleConfig {
    fn default() -> Self {
        Self {
            policy: "round_robin".to_string(),
            threshold: None,
            moderator: None,
            max_turns: 8,
            per_turn_timeout_secs: 30,
            session_timeout_secs: 300,
            min_quorum: 1,
            max_invoke_retries: 2,
            summary: false,
        }
    }
}

impl FileCircleConfig {
    /// The configured policy as a spec; unknown names and missing
    /// parameters surface later through request validation.
    pub fn policy_spec(&self) -> PolicySpec {
        PolicySpec {
            name: self.policy.clone(),
            threshold: self.threshold.or_else(|| {
                (self.policy == "consensus").then_some(0.5)
            }),
            moderator: self
                .moderator
                .as_deref()
                .and_then(EntityId::try_new),
        }
    }

    /// Build a request for the given topic from the configured roster and
    /// session defaults.
    pub fn to_request(
        &self,
        participants: impl IntoIterator<Item = EntityId>,
        topic: impl Into<String>,
    ) -> CircleRequest {
        let mut request = CircleRequest::new(participants, self.policy_spec(), topic)
            .with_max_turns(self.max_turns)
            .with_per_turn_timeout(Duration::from_secs(self.per_turn_timeout_secs))
            .with_session_timeout(Duration::from_secs(self.session_timeout_secs))
            .with_min_quorum(self.min_quorum)
            .with_max_invoke_retries(self.max_invoke_retries);
        if self.summary {
            request = request.with_summary();
        }
        request
    }
}

/// One configured participant (`[[entity]]` table)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEntityConfig {
    pub id: String,
    /// Display name; defaults to the id
    pub name: Option<String>,
    /// Capability tags; empty means all capabilities
    pub capabilities: Vec<String>,
    /// Adapter binding
    pub adapter: String,
}

impl Default for FileEntityConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: None,
            capabilities: Vec::new(),
            adapter: "loopback".to_string(),
        }
    }
}

/// Logging settings (`[logging]` section)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript output path; unset disables transcript persistence
    pub transcript_file: Option<PathBuf>,
    /// Diagnostic log file path; unset logs to stderr only
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_runnable() {
        let config = FileConfig::default();
        assert_eq!(config.circle.policy, "round_robin");
        assert_eq!(config.circle.max_turns, 8);
        assert!(config.entity.is_empty());
        assert!(config.logging.transcript_file.is_none());
    }

    #[test]
    fn test_consensus_gets_default_threshold() {
        let circle = FileCircleConfig {
            policy: "consensus".to_string(),
            ..Default::default()
        };
        let spec = circle.policy_spec();
        assert_eq!(spec.threshold, Some(0.5));
    }

    #[test]
    fn test_to_request_carries_session_defaults() {
        let circle = FileCircleConfig {
            max_turns: 3,
            summary: true,
            ..Default::default()
        };
        let request = circle.to_request([EntityId::new("ember")], "topic");
        assert_eq!(request.max_turns, 3);
        assert!(request.want_summary);
        assert_eq!(request.per_turn_timeout, Duration::from_secs(30));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_toml_shape() {
        let config: FileConfig = toml::from_str(
            r#"
            [circle]
            policy = "consensus"
            threshold = 0.66
            max_turns = 4

            [[entity]]
            id = "ember"
            capabilities = ["generate", "vote"]

            [[entity]]
            id = "oak"
            adapter = "scripted"

            [logging]
            transcript_file = "circle.jsonl"
            "#,
        )
        .unwrap();

        assert_eq!(config.circle.policy, "consensus");
        assert_eq!(config.circle.threshold, Some(0.66));
        assert_eq!(config.entity.len(), 2);
        assert_eq!(config.entity[1].adapter, "scripted");
        assert_eq!(
            config.logging.transcript_file,
            Some(PathBuf::from("circle.jsonl"))
        );
    }
}
