//! Progress bar over the dependency edges of a planning pass

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const EDGE_TEMPLATE: &str = "{spinner:.cyan} Checking {msg} [{bar:30.cyan/blue}] {pos}/{len}";

/// Shows which consumer → dependency edge is being looked up.
///
/// Hidden when disabled or when there are no edges to check.
pub struct EdgeProgress {
    bar: Option<ProgressBar>,
}

impl EdgeProgress {
    pub fn new(enabled: bool, edges: usize) -> Self {
        if !enabled || edges == 0 {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(edges as u64);
        bar.set_style(
            ProgressStyle::with_template(EDGE_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_message("dependencies");
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar: Some(bar) }
    }

    pub fn checking(&self, consumer: &str, dependency: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(edge_label(consumer, dependency));
        }
    }

    pub fn checked(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for EdgeProgress {
    fn drop(&mut self) {
        self.finish();
    }
}

fn edge_label(consumer: &str, dependency: &str) -> String {
    format!("{} → {}", consumer, dependency)
}
