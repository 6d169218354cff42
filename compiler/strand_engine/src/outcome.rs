//! Outcome of evaluating one rule at one position.
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | `Success` | Matched; the scanner now sits at `span.end` |
//! | `Failure` | Nothing matched; the scanner was left where it started |
//!
//! "Not yet evaluated" is never a `MatchResult`: the cache reports it as
//! `None` from [`MatchCache::will_evaluate`](crate::MatchCache::will_evaluate).

use strand_ir::Span;

/// What a successful match consumed.
///
/// `span.start` is always the position evaluation began at, and
/// `span.end >= span.start` (zero-width matches are legal).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MatchContext {
    pub span: Span,
}

impl MatchContext {
    #[inline]
    pub const fn new(span: Span) -> Self {
        MatchContext { span }
    }
}

/// Result of one rule evaluation at one position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MatchResult {
    Success(MatchContext),
    /// Nothing matched. `at` is the position matching was abandoned at.
    Failure { at: u32 },
}

impl MatchResult {
    /// Position the evaluation started at; the memoization key.
    #[inline]
    pub const fn position(&self) -> u32 {
        match self {
            MatchResult::Success(ctx) => ctx.span.start,
            MatchResult::Failure { at } => *at,
        }
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, MatchResult::Success(_))
    }

    /// Consumed span, if the match succeeded.
    #[inline]
    pub const fn span(&self) -> Option<Span> {
        match self {
            MatchResult::Success(ctx) => Some(ctx.span),
            MatchResult::Failure { .. } => None,
        }
    }
}
