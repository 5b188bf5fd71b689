//! Console output formatter for circle results

use circle_domain::{CircleResponse, ControlDirective, Message, MessageBody};
use colored::Colorize;

/// Formats circle results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete transcript
    pub fn format(response: &CircleResponse, topic: &str) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Fire Circle"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Topic:".cyan().bold(), topic));
        output.push_str(&format!(
            "{} {}\n",
            "Circle:".cyan().bold(),
            response.circle_id
        ));

        output.push_str(&Self::section_header("Transcript"));
        for message in &response.transcript {
            output.push_str(&Self::format_message(message));
        }

        output.push_str(&Self::section_header("Outcome"));
        output.push_str(&format!(
            "\n{} after {} rounds, {} messages\n",
            response.reason.to_string().bold(),
            response.rounds_completed,
            response.transcript.len(),
        ));

        if let Some(summary) = &response.summary {
            output.push_str(&format!("\n{}\n{}\n", "Summary:".green().bold(), summary));
        }

        output.push_str(&Self::footer());
        output
    }

    /// One line per message plus the outcome
    pub fn format_compact(response: &CircleResponse, topic: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("{} {}\n", "Q:".bold(), topic));
        for message in &response.transcript {
            output.push_str(&format!(
                "  {} {} {}\n",
                message.id.to_string().dimmed(),
                format!("{:<10}", message.sender).yellow(),
                Self::payload_line(message),
            ));
        }
        output.push_str(&format!(
            "{} {} ({} rounds)\n",
            "=>".cyan(),
            response.reason,
            response.rounds_completed,
        ));
        if let Some(summary) = &response.summary {
            output.push_str(&format!("{} {}\n", "Summary:".green().bold(), summary));
        }
        output
    }

    /// Format as JSON
    pub fn format_json(response: &CircleResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_message(message: &Message) -> String {
        let banner = format!("── {} ({}) ──", message.sender, message.kind());
        match &message.body {
            MessageBody::Proposal { content }
            | MessageBody::Response { content }
            | MessageBody::Observation { content } => {
                format!("\n{}\n{}\n", banner.yellow().bold(), content)
            }
            MessageBody::Vote { approve, rationale } => {
                let verdict = if *approve {
                    "approves".green()
                } else {
                    "rejects".red()
                };
                let rationale = if rationale.is_empty() {
                    String::new()
                } else {
                    format!(": {}", rationale)
                };
                format!("\n{}\n{}{}\n", banner.yellow().bold(), verdict, rationale)
            }
            MessageBody::Silence => {
                format!("\n{}\n{}\n", banner.dimmed(), "(silent)".dimmed())
            }
            MessageBody::Control { directive } => {
                format!(
                    "\n{}\n{}\n",
                    banner.magenta().bold(),
                    Self::directive_line(directive)
                )
            }
        }
    }

    fn payload_line(message: &Message) -> String {
        match &message.body {
            MessageBody::Vote { approve, .. } => {
                format!("vote: {}", if *approve { "yes" } else { "no" })
            }
            MessageBody::Silence => "(silent)".to_string(),
            MessageBody::Control { directive } => Self::directive_line(directive),
            body => body.content().unwrap_or_default().to_string(),
        }
    }

    fn directive_line(directive: &ControlDirective) -> String {
        match directive {
            ControlDirective::NameSpeakers { speakers } => {
                let names: Vec<&str> = speakers.iter().map(|s| s.as_str()).collect();
                format!("names speakers: {}", names.join(", "))
            }
            ControlDirective::Conclude => "concludes the circle".to_string(),
            ControlDirective::ExcludeEntity { entity, reason } => {
                format!("excludes {}: {}", entity, reason)
            }
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use circle_domain::{
        CircleId, DraftMessage, EntityId, TerminationReason, Transcript,
    };

    fn response() -> CircleResponse {
        let circle_id = CircleId::new("circle-test");
        let mut transcript = Transcript::new(circle_id.clone());
        transcript.append(DraftMessage::new(
            EntityId::new("ember"),
            MessageBody::proposal("ship it this week").unwrap(),
        ));
        transcript.append(DraftMessage::new(
            EntityId::new("oak"),
            MessageBody::vote(false, "tests are red"),
        ));
        transcript.append(DraftMessage::silence(EntityId::new("sage")));

        CircleResponse {
            circle_id,
            transcript: transcript.into_messages(),
            reason: TerminationReason::MaxTurnsReached,
            rounds_completed: 1,
            summary: Some("no agreement yet".to_string()),
        }
    }

    #[test]
    fn test_full_format_shows_all_turns() {
        let text = ConsoleFormatter::format(&response(), "ship this week?");
        assert!(text.contains("ship this week?"));
        assert!(text.contains("ship it this week"));
        assert!(text.contains("rejects"));
        assert!(text.contains("(silent)"));
        assert!(text.contains("no agreement yet"));
    }

    #[test]
    fn test_compact_format_is_one_line_per_message() {
        let text = ConsoleFormatter::format_compact(&response(), "ship this week?");
        assert!(text.contains("vote: no"));
        assert!(text.contains("max_turns_reached"));
    }

    #[test]
    fn test_json_format_round_trips() {
        let text = ConsoleFormatter::format_json(&response());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["transcript"].as_array().unwrap().len(), 3);
        assert_eq!(value["reason"], "max_turns_reached");
    }
}
