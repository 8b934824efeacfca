//! Spinner shown while a send waits for the model's reply

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

pub struct ReplySpinner {
    bar: ProgressBar,
}

impl ReplySpinner {
    /// Start a spinner labelled with the answering model; `quiet` yields a
    /// hidden bar that draws nothing
    pub fn start(label: &str, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(Self::style());
            bar.enable_steady_tick(TICK);
            bar
        };
        bar.set_prefix(label.to_string());
        bar.set_message("waiting for reply...");
        Self { bar }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }

    pub fn fail(self, reason: &str) {
        self.bar.abandon_with_message(format!("{} {}", "x".red(), reason));
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}
