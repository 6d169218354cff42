//! Observation hook for scan sessions.
//!
//! A [`ScanObserver`] is injected once per session and sees [`ScanEvent`]s
//! at fixed points of the repeat and emission logic. Observers receive a
//! shared reference and return nothing, so they cannot steer a scan.

use strand_ir::Token;
use tracing::trace;

use crate::StateId;

/// Named lifecycle points of a scan.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScanEvent {
    EnterRepeat {
        state: StateId,
        min: u32,
        max: Option<u32>,
    },
    BeforeChildScan {
        state: StateId,
        iteration: u32,
    },
    AfterChildScan {
        state: StateId,
        iteration: u32,
        /// Tokens in the speculative frame after the child ran.
        produced: usize,
    },
    BeforeClear {
        state: StateId,
    },
    AfterClear {
        state: StateId,
        repeats: u32,
    },
    BeforePop {
        state: StateId,
    },
    AfterPop {
        state: StateId,
    },
    ExitRepeat {
        state: StateId,
        repeats: u32,
        satisfied: bool,
    },
    TokenEmitted {
        state: StateId,
        token: Token,
    },
}

pub trait ScanObserver {
    fn observe(&mut self, event: &ScanEvent);
}

/// Ignores every event. The default.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {
    #[inline]
    fn observe(&mut self, _event: &ScanEvent) {}
}

/// Forwards every event to `tracing` at trace level.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingObserver;

impl ScanObserver for TracingObserver {
    fn observe(&mut self, event: &ScanEvent) {
        trace!(target: "strand_engine::scan", ?event);
    }
}

impl<F: FnMut(&ScanEvent)> ScanObserver for F {
    fn observe(&mut self, event: &ScanEvent) {
        self(event);
    }
}
