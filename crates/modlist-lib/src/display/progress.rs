//! Progress display for long-running operations
//!
//! Progress bars and spinners using indicatif. Bars are hidden when stdout
//! is not a terminal so scripted runs only see the final status lines.

use super::styling::StyleManager;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const UNICODE_TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const ASCII_TICKS: &[&str] = &["-", "\\", "|", "/"];

/// Progress display manager for long-running operations
pub struct ProgressDisplay<'a> {
    styling: &'a StyleManager,
    visible: bool,
}

impl<'a> ProgressDisplay<'a> {
    pub(crate) fn new(styling: &'a StyleManager, visible: bool) -> Self {
        Self { styling, visible }
    }

    /// Create a progress bar for operations with known total
    ///
    /// Example:
    /// ```ignore
    /// let progress = Display::progress().bar(records.len() as u64);
    /// for record in &records {
    ///     progress.tick(&record.id);
    ///     // ... resolve record
    ///     progress.inc();
    /// }
    /// progress.finish("Resolved 25 records");
    /// ```
    pub fn bar(&self, total: u64) -> ProgressTracker<'a> {
        let pb = ProgressBar::new(total);

        let style = if self.styling.is_unicode() {
            ProgressStyle::with_template(
                "{spinner:.green} {msg} [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
            )
            .map(|s| s.tick_strings(UNICODE_TICKS).progress_chars("█▉▊▋▌▍▎▏  "))
        } else {
            ProgressStyle::with_template("{spinner} {msg} [{wide_bar}] {pos}/{len} ({eta})")
                .map(|s| s.tick_strings(ASCII_TICKS).progress_chars("##-"))
        };

        pb.set_style(style.unwrap_or_else(|_| ProgressStyle::default_bar()));
        self.attach(pb)
    }

    /// Create a spinner for operations with unknown duration
    pub fn spinner(&self, message: &str) -> ProgressTracker<'a> {
        let pb = ProgressBar::new_spinner();

        let ticks = if self.styling.is_unicode() {
            UNICODE_TICKS
        } else {
            ASCII_TICKS
        };
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .map(|s| s.tick_strings(ticks))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        pb.set_style(style);
        pb.set_message(message.to_string());
        self.attach(pb)
    }

    fn attach(&self, pb: ProgressBar) -> ProgressTracker<'a> {
        if self.visible {
            pb.enable_steady_tick(Duration::from_millis(100));
        } else {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        ProgressTracker::new(pb, self.styling)
    }
}

/// Individual progress tracker
pub struct ProgressTracker<'a> {
    bar: ProgressBar,
    styling: &'a StyleManager,
}

impl<'a> ProgressTracker<'a> {
    fn new(bar: ProgressBar, styling: &'a StyleManager) -> Self {
        Self { bar, styling }
    }

    /// Increment position by 1
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Update message with current item info
    pub fn tick(&self, item: &str) {
        self.bar.tick();
        self.bar.set_message(item.to_string());
    }

    /// Finish with success message
    pub fn finish(&self, message: &str) {
        self.bar
            .finish_with_message(self.styling.format_success(message));
    }

    /// Abandon with error message
    pub fn abandon(&self, message: &str) {
        self.bar.abandon_with_message(self.styling.format_error(message));
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

#[cfg(test)]
mod tests {
    include!("progress.test.rs");
}
