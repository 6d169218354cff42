//! Token identities and emitted tokens.
//!
//! A token carries no payload of its own. `TokenId` names a lexical category;
//! [`Token`] pairs that category with the span of input it labels.

use rustc_hash::FxHashMap;
use std::fmt;

use crate::Span;

/// Index into a [`TokenTable`].
///
/// Layout: 4 bytes. Equality is an integer compare, so ids are used as
/// memoization and emission keys directly.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TokenId(u32);

impl TokenId {
    /// Create from a raw table index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        TokenId(index)
    }

    /// Get the index into the table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", self.0)
    }
}

/// A token emitted by a scan: a category labelling a span of consumed input.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub id: TokenId,
    pub span: Span,
}

impl Token {
    #[inline]
    pub const fn new(id: TokenId, span: Span) -> Self {
        Token { id, span }
    }
}

/// Interner mapping token names to dense [`TokenId`]s.
///
/// Built once alongside the grammar and read-only during scanning.
#[derive(Clone, Debug, Default)]
pub struct TokenTable {
    names: Vec<Box<str>>,
    index: FxHashMap<Box<str>, TokenId>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning the existing id if it is already known.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` distinct tokens are interned.
    pub fn intern(&mut self, name: &str) -> TokenId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let raw = u32::try_from(self.names.len())
            .unwrap_or_else(|_| panic!("token table exceeded {} entries", u32::MAX));
        let id = TokenId(raw);
        self.names.push(name.into());
        self.index.insert(name.into(), id);
        id
    }

    /// Look up an already-interned name.
    pub fn get(&self, name: &str) -> Option<TokenId> {
        self.index.get(name).copied()
    }

    /// The name an id was interned under.
    pub fn name(&self, id: TokenId) -> Option<&str> {
        self.names.get(id.index()).map(|name| &**name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(id, name)` pairs in interning order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (TokenId(i as u32), name.as_ref()))
    }
}
