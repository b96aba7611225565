//! Per-item progress reporting

use crate::api::ResourceKind;

const BAR_WIDTH: usize = 50;

/// Receives one event per processed display name
pub trait ProgressReporter: Send + Sync {
    fn start(&self, _kind: ResourceKind, _total: usize) {}

    /// `current` is 1-based
    fn advance(&self, kind: ResourceKind, current: usize, total: usize, display_name: &str);

    fn finish(&self) {}
}

/// Writes a text progress bar to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn advance(&self, kind: ResourceKind, current: usize, total: usize, display_name: &str) {
        log::info!("{} {}", render_bar(&kind.to_string(), current, total, BAR_WIDTH), display_name);
    }
}

/// Discards progress events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn advance(&self, _kind: ResourceKind, _current: usize, _total: usize, _display_name: &str) {}
}

/// `label(current/total)[----->    ] NN %`
pub fn render_bar(label: &str, current: usize, total: usize, width: usize) -> String {
    let fraction = if total == 0 {
        1.0
    } else {
        current.min(total) as f64 / total as f64
    };
    let dashes = ((fraction * width as f64) as usize).saturating_sub(1);
    let arrow = format!("{}>", "-".repeat(dashes));
    let spaces = " ".repeat(width.saturating_sub(arrow.len()));
    format!(
        "{}({}/{})[{}{}] {} %",
        label,
        current,
        total,
        arrow,
        spaces,
        (fraction * 100.0) as u32
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bar_half() {
        let bar = render_bar("intent", 5, 10, 10);
        assert_eq!(bar, "intent(5/10)[---->     ] 50 %");
    }

    #[test]
    fn test_render_bar_bounds() {
        assert_eq!(render_bar("x", 0, 4, 4), "x(0/4)[>   ] 0 %");
        assert_eq!(render_bar("x", 4, 4, 4), "x(4/4)[--->] 100 %");
        assert_eq!(render_bar("x", 0, 0, 4), "x(0/0)[--->] 100 %");
    }
}
