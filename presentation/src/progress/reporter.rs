//! Progress reporting for a running circle

use circle_application::CircleProgress;
use circle_domain::{CircleId, EntityId, MessageKind, TerminationReason};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports circle progress with a per-round progress bar
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-")
    }

    fn kind_glyph(kind: MessageKind) -> &'static str {
        match kind {
            MessageKind::Silence => "·",
            MessageKind::Control => "!",
            _ => "v",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CircleProgress for ProgressReporter {
    fn on_session_start(&self, circle_id: &CircleId, participants: usize) {
        let _ = self.multi.println(format!(
            "{} {} ({} participants)",
            "Circle".cyan().bold(),
            circle_id,
            participants
        ));
    }

    fn on_round_start(&self, round: usize, speakers: usize) {
        let pb = self.multi.add(ProgressBar::new(speakers as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(format!("Round {}", round + 1));
        pb.set_message("Dispatching...");
        *self.round_bar.lock().unwrap() = Some(pb);
    }

    fn on_turn_complete(&self, _round: usize, entity: &EntityId, kind: MessageKind) {
        if let Some(pb) = self.round_bar.lock().unwrap().as_ref() {
            pb.set_message(format!("{} {}", Self::kind_glyph(kind), entity));
            // Exclusion notices are appended beyond the round's own turns
            if pb.position() < pb.length().unwrap_or(0) {
                pb.inc(1);
            }
        }
    }

    fn on_round_complete(&self, round: usize) {
        if let Some(pb) = self.round_bar.lock().unwrap().take() {
            pb.finish_with_message(format!("Round {} complete", round));
        }
    }

    fn on_entity_degraded(&self, entity: &EntityId) {
        let _ = self
            .multi
            .println(format!("  {} {} degraded", "x".red(), entity));
    }

    fn on_session_end(&self, reason: &TerminationReason, messages: usize) {
        if let Some(pb) = self.round_bar.lock().unwrap().take() {
            pb.abandon();
        }
        let _ = self.multi.println(format!(
            "{} {} ({} messages)",
            "Done:".green().bold(),
            reason,
            messages
        ));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl CircleProgress for SimpleProgress {
    fn on_session_start(&self, circle_id: &CircleId, participants: usize) {
        println!(
            "{} {} ({} participants)",
            "->".cyan(),
            circle_id,
            participants
        );
    }

    fn on_round_start(&self, round: usize, speakers: usize) {
        println!(
            "{} {} ({} speakers)",
            "->".cyan(),
            format!("Round {}", round + 1).bold(),
            speakers
        );
    }

    fn on_turn_complete(&self, _round: usize, entity: &EntityId, kind: MessageKind) {
        match kind {
            MessageKind::Silence => println!("  {} {} (silent)", "·".dimmed(), entity),
            MessageKind::Control => println!("  {} {}", "!".yellow(), entity),
            _ => println!("  {} {} ({})", "v".green(), entity, kind),
        }
    }

    fn on_round_complete(&self, _round: usize) {
        println!();
    }

    fn on_entity_degraded(&self, entity: &EntityId) {
        println!("  {} {} degraded", "x".red(), entity);
    }

    fn on_session_end(&self, reason: &TerminationReason, messages: usize) {
        println!("{} {} ({} messages)", "=>".green(), reason, messages);
    }
}
