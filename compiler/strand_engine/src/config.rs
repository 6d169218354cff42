//! Per-session configuration.

/// What a repeat does to the read position when it falls short of its
/// minimum count.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ShortfallPolicy {
    /// Restore the position the repeat started at.
    #[default]
    Rewind,
    /// Leave the position where the last successful repetition ended.
    KeepPartial,
}

/// Limits and policies for one [`ScanSession`](crate::ScanSession).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Ceiling on nested state scans. `None` is unbounded.
    pub max_depth: Option<usize>,
    /// Ceiling on total state scans in the session. `None` is unbounded.
    pub max_steps: Option<u64>,
    pub shortfall: ShortfallPolicy,
}

impl SessionConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 10_000;

    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: Option<u64>) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub fn with_shortfall(mut self, shortfall: ShortfallPolicy) -> Self {
        self.shortfall = shortfall;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_depth: Some(Self::DEFAULT_MAX_DEPTH),
            max_steps: None,
            shortfall: ShortfallPolicy::Rewind,
        }
    }
}
