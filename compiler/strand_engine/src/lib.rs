//! Strand matching engine.
//!
//! Turns a stream of characters into a stream of typed tokens by running a
//! graph of matching rules against a backtracking scanner.
//!
//! # Layers
//!
//! - **Terminal rules** ([`TerminalRule`]) consume literal text. Every
//!   evaluation is memoized per `(rule, position)` through a [`MatchCache`].
//! - **State nodes** ([`StateArena`], [`StateKind`]) compose rules into
//!   sequences (branch continuations), alternations ([`StateKind::Branch`])
//!   and bounded repetition ([`StateKind::Repeat`]).
//! - **Scan sessions** ([`ScanSession`]) own the scanner, the result cache and
//!   the context stack for exactly one pass over one input.
//!
//! # Failure signalling
//!
//! Ordinary non-matches are values: [`MatchResult::Failure`] from a rule,
//! `Ok(false)` from [`ScanSession::scan`]. Hard stops are [`ScanError`]s and
//! propagate with `?` until a caller treats them as a stopping point.
//!
//! # Sharing
//!
//! A [`Grammar`] is immutable while scanning and is `Send + Sync`; every
//! session brings its own scanner, cache and context stack, so independent
//! inputs can be tokenized in parallel ([`Grammar::tokenize_all`]).

mod annotation;
mod cache;
mod config;
mod error;
mod grammar;
mod observer;
mod outcome;
mod quote;
mod reader;
mod rule;
mod session;
mod state;
mod tracing_setup;

pub use annotation::{AnnotationFlags, RuleAnnotations};
pub use cache::{CacheStats, MatchCache, NoCache, ResultCache};
pub use config::{SessionConfig, ShortfallPolicy};
pub use error::{GrammarError, ReadError, ScanError};
pub use grammar::{Grammar, TokenStream};
pub use observer::{NoopObserver, ScanEvent, ScanObserver, TracingObserver};
pub use outcome::{MatchContext, MatchResult};
pub use rule::{Rule, RuleId, RuleTable, TerminalRule};
pub use session::{Context, ScanSession};
pub use state::{StateArena, StateId, StateKind, StateNode};
pub use tracing_setup::init_tracing;

pub use strand_ir::{Span, Token, TokenId, TokenTable};
pub use strand_scanner::Scanner;
