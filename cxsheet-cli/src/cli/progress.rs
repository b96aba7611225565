//! Terminal progress for batch runs

use std::io;

use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;

use crate::api::ResourceKind;
use crate::batch::{LogProgress, ProgressReporter};

const TEMPLATE: &str = "{prefix:.cyan} [{bar:40.green/white}] {pos}/{len} {msg}";

/// An indicatif bar on stderr
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        Self { bar }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarProgress {
    fn start(&self, kind: ResourceKind, total: usize) {
        self.bar.set_prefix(kind.to_string());
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, _kind: ResourceKind, current: usize, _total: usize, display_name: &str) {
        self.bar.set_position(current as u64);
        self.bar.set_message(display_name.to_string());
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// A bar when stderr is a terminal, log lines otherwise
pub fn reporter() -> Box<dyn ProgressReporter> {
    if io::stderr().is_terminal() {
        Box::new(BarProgress::new())
    } else {
        Box::new(LogProgress)
    }
}
