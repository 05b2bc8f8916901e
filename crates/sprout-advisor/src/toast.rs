//! Transient guidance-note toast.

use std::time::{Duration, Instant};

/// How long a toast stays visible.
pub const TOAST_DURATION: Duration = Duration::from_secs(4);

/// A transient notification that the backend appended guidance notes to
/// the child's record as a byproduct of an advisor exchange.
#[derive(Debug, Clone)]
pub struct NotesToast {
    count: usize,
    shown_at: Instant,
}

impl NotesToast {
    pub(crate) fn new(count: usize) -> Self {
        Self::new_at(count, Instant::now())
    }

    fn new_at(count: usize, shown_at: Instant) -> Self {
        Self { count, shown_at }
    }

    /// How many guidance notes were appended.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The user-facing toast text.
    pub fn text(&self) -> String {
        if self.count == 1 {
            "Saved 1 guidance note for future sessions.".to_string()
        } else {
            format!("Saved {} guidance notes for future sessions.", self.count)
        }
    }

    /// True until the 4-second display window has elapsed.
    pub fn is_active(&self) -> bool {
        self.shown_at.elapsed() < TOAST_DURATION
    }
}
