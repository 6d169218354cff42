//! Backtracking scanner for the Strand matching engine.
//!
//! The scanner owns a read position over the input text and a stack of
//! marks. It knows how to consume exact literal text and how to undo
//! speculative consumption; it knows nothing about grammar structure.
//!
//! # Mark discipline
//!
//! Every [`Scanner::mark`] is closed by exactly one of:
//! - [`Scanner::proceed`]: commit, returning the span consumed since the mark
//! - [`Scanner::rewind`]: abandon, restoring the position at the mark
//!
//! Marks nest, so a literal match inside a repetition inside an alternation
//! composes without the layers knowing about each other.

mod scanner;

pub use scanner::{NoMatch, Scanner};
