//! Rules: the atomic units of forward progress.
//!
//! A [`Rule`] evaluates itself against a [`Scanner`] through a
//! [`MatchCache`]. The only rule kind the engine ships is [`TerminalRule`],
//! which matches one of an ordered list of literal strings.

use smallvec::SmallVec;
use std::fmt;
use strand_ir::TokenId;
use strand_scanner::Scanner;
use tracing::trace;

use crate::quote::write_quoted;
use crate::{GrammarError, MatchCache, MatchContext, MatchResult, RuleAnnotations, ScanError};

/// Index into a [`RuleTable`]; together with a position, the memoization key.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct RuleId(u32);

impl RuleId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        RuleId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleId({})", self.0)
    }
}

/// Capability every rule provides to the engine.
///
/// Implementations must leave the scanner where it started whenever they
/// return `Ok(MatchResult::Failure { .. })`, and must report every real
/// evaluation to the cache.
pub trait Rule: fmt::Debug + Send + Sync {
    /// Evaluate at the scanner's current position. `id` is this rule's own
    /// identity in the cache.
    fn evaluate(
        &self,
        id: RuleId,
        scanner: &mut Scanner<'_>,
        cache: &mut dyn MatchCache,
    ) -> Result<MatchResult, ScanError>;

    /// Token emitted for a match.
    fn produces(&self) -> TokenId;

    fn annotations(&self) -> &RuleAnnotations;

    /// Human-readable description; for terminal rules this is also the
    /// serialized form.
    fn describe(&self) -> String;

    /// Derive a copy overriding the token and/or the annotations.
    fn instance(
        &self,
        token: Option<TokenId>,
        annotations: Option<RuleAnnotations>,
    ) -> Box<dyn Rule>;
}

/// Matches the first of an ordered list of literals.
///
/// Candidate order is significant: once a literal matches, later ones are
/// never tried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerminalRule {
    token: TokenId,
    choices: SmallVec<[Box<str>; 4]>,
    annotations: RuleAnnotations,
}

impl TerminalRule {
    /// A rule matching the first of `choices`, which must not be empty.
    pub fn one_of<I, S>(token: TokenId, choices: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Box<str>>,
    {
        let choices: SmallVec<[Box<str>; 4]> = choices.into_iter().map(Into::into).collect();
        if choices.is_empty() {
            return Err(GrammarError::EmptyTerminal);
        }
        Ok(TerminalRule {
            token,
            choices,
            annotations: RuleAnnotations::default(),
        })
    }

    #[must_use]
    pub fn with_annotations(mut self, annotations: RuleAnnotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn choices(&self) -> impl Iterator<Item = &str> {
        self.choices.iter().map(|choice| &**choice)
    }
}

impl Rule for TerminalRule {
    fn evaluate(
        &self,
        id: RuleId,
        scanner: &mut Scanner<'_>,
        cache: &mut dyn MatchCache,
    ) -> Result<MatchResult, ScanError> {
        let at = scanner.position();
        if scanner.is_at_end() {
            return Err(ScanError::UnexpectedEndOfFile { at });
        }

        if let Some(known) = cache.will_evaluate(id, at) {
            trace!(?id, at, ?known, "terminal served from cache");
            if let MatchResult::Success(ctx) = known {
                scanner.set_position(ctx.span.end);
            }
            return Ok(known);
        }

        scanner.mark();
        let matched = self.choices.iter().any(|choice| scanner.scan(choice).is_ok());
        let result = if matched {
            MatchResult::Success(MatchContext::new(scanner.proceed()))
        } else {
            scanner.rewind();
            MatchResult::Failure { at }
        };
        trace!(?id, at, ?result, "terminal evaluated");

        cache.did_evaluate(id, &result);
        Ok(result)
    }

    fn produces(&self) -> TokenId {
        self.token
    }

    fn annotations(&self) -> &RuleAnnotations {
        &self.annotations
    }

    fn describe(&self) -> String {
        let mut out = self.annotations.prefix();
        out.push('(');
        for (i, choice) in self.choices.iter().enumerate() {
            if i > 0 {
                out.push_str(" | ");
            }
            write_quoted(&mut out, choice);
        }
        out.push(')');
        out
    }

    fn instance(
        &self,
        token: Option<TokenId>,
        annotations: Option<RuleAnnotations>,
    ) -> Box<dyn Rule> {
        Box::new(TerminalRule {
            token: token.unwrap_or(self.token),
            choices: self.choices.clone(),
            annotations: annotations.unwrap_or_else(|| self.annotations.clone()),
        })
    }
}

impl fmt::Display for TerminalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Owns the rules of one grammar, addressed by [`RuleId`].
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if more than `u32::MAX` rules are added.
    pub fn push(&mut self, rule: Box<dyn Rule>) -> RuleId {
        let raw = u32::try_from(self.rules.len())
            .unwrap_or_else(|_| panic!("rule table exceeded {} entries", u32::MAX));
        self.rules.push(rule);
        RuleId(raw)
    }

    pub fn get(&self, id: RuleId) -> Option<&dyn Rule> {
        self.rules.get(id.index()).map(|rule| &**rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Clone for RuleTable {
    fn clone(&self) -> Self {
        RuleTable {
            rules: self.rules.iter().map(|r| r.instance(None, None)).collect(),
        }
    }
}

#[cfg(test)]
mod tests;
