use crate::output::Output;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;

/// Progress bar over the reference titles. Disabled when not attached to a terminal.
pub struct SearchUI {
    bar: ProgressBar,
    interactive: bool,
}

impl SearchUI {
    pub fn new(total: usize, output: &Output) -> Self {
        let interactive = is_interactive() && !output.is_quiet();
        let bar = if interactive {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::hidden())
        };

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }

        if !interactive {
            tracing::debug!(
                operation = "ui_init",
                mode = "non_interactive",
                "Progress bar disabled"
            );
        }

        Self { bar, interactive }
    }

    pub fn searching(&self, title: &str) {
        if self.interactive {
            self.bar.set_message(format!("Searching '{}'", title));
        } else {
            tracing::debug!(operation = "progress", title, "Searching");
        }
    }

    /// Print a report line without tearing the bar
    pub fn println(&self, f: impl FnOnce()) {
        self.bar.suspend(f);
    }

    pub fn advance(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
