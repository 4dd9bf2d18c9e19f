//! Terminal spinner that follows the diagnosis stages

use crate::orchestrator::{ProgressSink, Stage};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Braille spinner frames
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct StageSpinner {
    bar: ProgressBar,
}

impl StageSpinner {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_strings(SPINNER_FRAMES)
            .template("{spinner:.magenta} {msg}")
        {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    /// Spinner that draws nothing, for --json output
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for StageSpinner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for StageSpinner {
    fn stage(&self, stage: Stage) {
        self.bar.set_message(format!(
            "{} {}",
            format!("[{}/{}]", stage.position(), Stage::ALL.len()).dimmed(),
            stage.label()
        ));
    }
}

impl Drop for StageSpinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_spinner_accepts_all_stages() {
        let spinner = StageSpinner::hidden();
        for stage in Stage::ALL {
            spinner.stage(stage);
        }
        spinner.finish();
    }
}
