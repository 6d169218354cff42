//! Bounded repetition.

use tracing::trace;

use super::ScanSession;
use crate::{
    MatchCache, ScanError, ScanEvent, ScanObserver, ShortfallPolicy, StateId, StateNode,
};

impl<'g, C: MatchCache, O: ScanObserver> ScanSession<'g, '_, C, O> {
    /// Run `child` greedily inside a speculative frame, then emit one token
    /// for the whole run.
    ///
    /// An iteration counts only when the child produced at least one token
    /// and the position strictly advanced. The loop stops at `max`, at the
    /// end of input, or at the first iteration that does not count. Below
    /// `min` the node fails and, under [`ShortfallPolicy::Rewind`], the
    /// position goes back to where the repeat started. A satisfied repeat
    /// tries its branches even after zero repetitions.
    pub(super) fn scan_repeat(
        &mut self,
        id: StateId,
        node: &'g StateNode,
        child: StateId,
        min: u32,
        max: Option<u32>,
    ) -> Result<bool, ScanError> {
        self.observer
            .observe(&ScanEvent::EnterRepeat { state: id, min, max });
        let entry = self.position();
        self.push_context();

        let mut repeats = 0u32;
        while max.map_or(true, |max| repeats < max) && !self.scanner.is_at_end() {
            let before = self.position();
            self.observer.observe(&ScanEvent::BeforeChildScan {
                state: id,
                iteration: repeats,
            });
            if let Err(err) = self.scan(child) {
                self.pop_context(false);
                return Err(err);
            }
            let produced = self.context().tokens.len();
            self.observer.observe(&ScanEvent::AfterChildScan {
                state: id,
                iteration: repeats,
                produced,
            });
            if produced == 0 || self.position() <= before {
                break;
            }

            repeats += 1;
            self.observer.observe(&ScanEvent::BeforeClear { state: id });
            self.context_mut().tokens.clear();
            self.observer.observe(&ScanEvent::AfterClear {
                state: id,
                repeats,
            });
        }

        self.observer.observe(&ScanEvent::BeforePop { state: id });
        self.pop_context(false);
        self.observer.observe(&ScanEvent::AfterPop { state: id });

        let satisfied = repeats >= min;
        self.observer.observe(&ScanEvent::ExitRepeat {
            state: id,
            repeats,
            satisfied,
        });
        trace!(?id, repeats, min, ?max, satisfied, "repeat finished");

        if !satisfied {
            if self.config.shortfall == ShortfallPolicy::Rewind {
                self.reset_position(entry);
            }
            return Ok(false);
        }

        if let Some(token) = node.token {
            self.emit(id, token);
        }
        self.scan_continuations(node)?;
        Ok(true)
    }
}
