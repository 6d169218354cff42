//! Strand IR - shared vocabulary for the matching engine.
//!
//! This crate holds the small value types every other Strand crate speaks:
//! - Spans for consumed input ranges
//! - Token identities and the table that names them
//! - Emitted tokens (an identity labelling a span)
//!
//! Everything here is `Copy` or cheaply cloneable, and nothing here knows
//! about scanning or grammar structure.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod span;
mod token;

pub use span::Span;
pub use token::{Token, TokenId, TokenTable};
