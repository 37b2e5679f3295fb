//! Forwarding-loop vocabulary: the link states and their timing.
//!
//! ```text
//!            open ok              grab ok
//! AwaitingLink ──────► Acquiring ──────► Relaying
//!      ▲    │ open fails  │ grab fails       │ read fails / fault
//!      │    └─ poll ──┘   │                  │
//!      └──── backoff ─────┴──────────────────┘
//! ```
//!
//! There is no terminal state.  Only process termination ends the loop.

use std::fmt;
use std::time::Duration;

/// Current state of the physical link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    /// Polling the configured path until it exists and opens.
    AwaitingLink,
    /// Handle open; requesting exclusive access.
    Acquiring,
    /// Grabbed; draining events into the virtual device.
    Relaying,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingLink => "awaiting-link",
            Self::Acquiring => "acquiring",
            Self::Relaying => "relaying",
        };
        f.write_str(name)
    }
}

/// Delays used by the forwarding loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTiming {
    /// Sleep between probes while awaiting the link.
    pub poll_interval: Duration,
    /// Sleep after a lost link, refused grab, or relay fault.
    pub backoff: Duration,
}

impl LinkTiming {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
    pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

    /// Zero delays, for tests that drive many cycles.
    pub const fn immediate() -> Self {
        Self {
            poll_interval: Duration::ZERO,
            backoff: Duration::ZERO,
        }
    }
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            backoff: Self::DEFAULT_BACKOFF,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing_is_one_second() {
        let timing = LinkTiming::default();
        assert_eq!(timing.poll_interval, Duration::from_secs(1));
        assert_eq!(timing.backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_link_state_display() {
        assert_eq!(LinkState::AwaitingLink.to_string(), "awaiting-link");
        assert_eq!(LinkState::Acquiring.to_string(), "acquiring");
        assert_eq!(LinkState::Relaying.to_string(), "relaying");
    }
}
