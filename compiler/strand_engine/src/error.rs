//! Error types.
//!
//! - [`ScanError`]: hard stops during a scan. Ordinary non-matches are not
//!   errors; see [`MatchResult::Failure`](crate::MatchResult::Failure).
//! - [`GrammarError`]: a state graph or rule table is malformed.
//! - [`ReadError`]: serialized grammar text could not be read back.

use strand_ir::TokenId;
use strand_stack::DepthExceeded;

use crate::{RuleId, StateId};

/// A scan could not continue.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// Input ran out while a match was required.
    #[error("unexpected end of input at offset {at}")]
    UnexpectedEndOfFile { at: u32 },

    /// A whole pass could not make progress. `at` is the furthest offset
    /// any rule failed at.
    #[error("nothing matched; furthest failure at offset {at}")]
    NothingMatched { at: u32 },

    #[error("scan nesting exceeded the depth limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("scan exceeded the step limit of {limit}")]
    StepLimitExceeded { limit: u64 },

    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

impl From<DepthExceeded> for ScanError {
    fn from(e: DepthExceeded) -> Self {
        ScanError::DepthLimitExceeded { limit: e.limit }
    }
}

/// A grammar graph refers to something that does not exist, or cannot be
/// represented.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("state {0:?} is not in the arena")]
    UnknownState(StateId),

    #[error("rule {0:?} is not in the rule table")]
    UnknownRule(RuleId),

    #[error("token {0:?} is not in the token table")]
    UnknownToken(TokenId),

    #[error("repeat bounds are inverted: min {min} > max {max}")]
    InvalidRepeatBounds { min: u32, max: u32 },

    #[error("state {0:?} is reachable from itself and cannot be serialized")]
    CyclicGraph(StateId),

    #[error("grammar has no root state")]
    NoRoot,

    #[error("a terminal needs at least one literal")]
    EmptyTerminal,
}

/// Serialized grammar text is malformed. Offsets are byte offsets into the
/// text being read.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("expected {expected} at offset {at}")]
    Expected { expected: &'static str, at: usize },

    #[error("unknown annotation `@{name}` at offset {at}")]
    UnknownAnnotation { name: String, at: usize },

    #[error("invalid repeat count at offset {at}")]
    InvalidCount { at: usize },

    #[error("unterminated string starting at offset {at}")]
    UnterminatedString { at: usize },

    #[error("invalid escape sequence at offset {at}")]
    InvalidEscape { at: usize },

    #[error("terminal at offset {at} has no `->token`")]
    MissingToken { at: usize },

    #[error("unexpected trailing input at offset {at}")]
    TrailingInput { at: usize },

    #[error(transparent)]
    Grammar(#[from] GrammarError),
}
