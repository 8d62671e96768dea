//! Poller state for completion sync.

use std::fmt;

/// State of the completion poller.
///
/// A cycle may only start from [`PollerState::Idle`]. The poller returns to
/// idle when the cycle ends, whatever its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PollerState {
    /// No cycle is running.
    #[default]
    Idle,
    /// A cycle is running.
    Polling,
}

impl PollerState {
    /// Returns `true` while a cycle is running.
    #[must_use]
    pub const fn is_polling(self) -> bool {
        matches!(self, Self::Polling)
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Polling => "polling",
        }
    }
}

impl From<bool> for PollerState {
    fn from(polling: bool) -> Self {
        if polling { Self::Polling } else { Self::Idle }
    }
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
