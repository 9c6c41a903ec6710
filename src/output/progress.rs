//! Per-item progress lines for the conversion loop.

use crate::utils::percent;
use colored::Colorize;

/// Position of one item within a run, reported before the item is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// 1-based index of the current item.
    pub index: usize,
    /// Total number of items.
    pub total: usize,
    /// `index / total` as a whole percentage.
    pub percent: u8,
}

/// Counts through a fixed number of items, printing one git-style line per
/// item:
///
/// ```text
/// Converting: 33% (1/3) sub/b.kra
/// ```
///
/// Unlike an in-place bar, every line stays in the scrollback so a failing
/// card is visible right above the error.
pub struct Progress {
    /// Title displayed before each line
    title: String,
    /// Total number of items to process
    total: usize,
    /// Number of items started so far
    current: usize,
    /// Whether lines are printed at all
    visible: bool,
}

impl Progress {
    /// Creates a progress counter with the given title and total items.
    #[must_use]
    pub fn new(title: &str, total: usize, visible: bool) -> Self {
        Self {
            title: title.to_string(),
            total,
            current: 0,
            visible,
        }
    }

    /// Moves to the next item and prints its line.
    pub fn advance(&mut self, label: &str) -> ProgressEvent {
        self.current = (self.current + 1).min(self.total.max(1));
        let event = ProgressEvent {
            index: self.current,
            total: self.total,
            percent: percent(self.current, self.total),
        };

        if self.visible {
            eprintln!(
                "{}: {}% ({}/{}) {}",
                self.title.dimmed(),
                event.percent.to_string().dimmed(),
                event.index,
                event.total,
                label
            );
        }
        event
    }

    /// Prints the final "done" line. Consumes self to prevent further updates.
    pub fn finish(self) {
        if self.visible && self.total > 0 {
            eprintln!(
                "{}: 100% ({}/{}), done.",
                self.title.dimmed(),
                self.total,
                self.total
            );
        }
    }
}
