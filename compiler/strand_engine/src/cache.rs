//! Packrat result cache.
//!
//! Every rule evaluation consults the cache first and reports its outcome
//! afterwards, so each distinct `(rule, position)` pair is scanned at most
//! once per session. That bounds backtracking work to roughly
//! `rules × input length` even for recursive, ambiguous grammars.
//!
//! Entries are write-once and never invalidated: grammar and input are both
//! immutable for the lifetime of a session.

use rustc_hash::FxHashMap;

use crate::{MatchResult, RuleId};

/// The boundary a rule talks to before and after scanning.
pub trait MatchCache {
    /// A prior result for `rule` at `at`, or `None` if it has not been
    /// evaluated there yet.
    fn will_evaluate(&mut self, rule: RuleId, at: u32) -> Option<MatchResult>;

    /// Record the outcome of evaluating `rule`. The position is
    /// [`MatchResult::position`].
    fn did_evaluate(&mut self, rule: RuleId, result: &MatchResult);
}

/// Hit/miss counters for a [`ResultCache`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Append-only `(rule, position) -> result` map owned by one session.
#[derive(Clone, Debug, Default)]
pub struct ResultCache {
    entries: FxHashMap<(RuleId, u32), MatchResult>,
    hits: u64,
    misses: u64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry without touching the counters.
    pub fn get(&self, rule: RuleId, at: u32) -> Option<&MatchResult> {
        self.entries.get(&(rule, at))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

impl MatchCache for ResultCache {
    fn will_evaluate(&mut self, rule: RuleId, at: u32) -> Option<MatchResult> {
        let known = self.entries.get(&(rule, at)).copied();
        if known.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        known
    }

    fn did_evaluate(&mut self, rule: RuleId, result: &MatchResult) {
        let existing = *self
            .entries
            .entry((rule, result.position()))
            .or_insert(*result);
        debug_assert_eq!(existing, *result, "result cache entries are write-once");
    }
}

/// A cache that remembers nothing; every evaluation scans.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoCache;

impl MatchCache for NoCache {
    fn will_evaluate(&mut self, _rule: RuleId, _at: u32) -> Option<MatchResult> {
        None
    }

    fn did_evaluate(&mut self, _rule: RuleId, _result: &MatchResult) {}
}

#[cfg(test)]
mod tests;
