//! Progress indicators with CI fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            eprintln!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else {
            eprintln!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else {
            eprintln!("{} {}", style("[FAIL]").red(), message);
        }
    }

    /// Stop with the outcome of `result`
    pub fn finish<T, E>(&mut self, result: &Result<T, E>, ok: &str, failed: &str) {
        match result {
            Ok(_) => self.stop(ok),
            Err(_) => self.stop_error(failed),
        }
    }
}

/// Counted progress over a list of items (e.g. volumes being removed)
pub struct CountProgress {
    bar: Option<ProgressBar>,
    label: String,
    total: u64,
    done: u64,
}

impl CountProgress {
    pub fn new(ctx: &UiContext, label: &str, total: usize) -> Self {
        let total = total as u64;
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total);
            if let Ok(bar_style) = ProgressStyle::default_bar()
                .template("  {spinner:.cyan} {prefix} {bar:20.cyan/dim} {pos}/{len} {msg:.dim}")
            {
                bar.set_style(bar_style.progress_chars("━╸─"));
            }
            bar.set_prefix(label.to_string());
            Some(bar)
        } else {
            None
        };

        Self {
            bar,
            label: label.to_string(),
            total,
            done: 0,
        }
    }

    /// Mark one item as finished
    pub fn inc(&mut self, item: &str) {
        self.done += 1;
        match &self.bar {
            Some(bar) => {
                bar.set_message(item.to_string());
                bar.inc(1);
            }
            None => eprintln!("  {} {}/{}: {}", self.label, self.done, self.total, item),
        }
    }

    pub fn position(&self) -> u64 {
        self.done
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
