//! Grammars: the immutable, shareable half of the engine.
//!
//! A [`Grammar`] bundles the token table, the rule table and the state
//! arena, plus the root state that [`Grammar::tokenize`] starts from. Every
//! builder method takes `&mut self`; once built, a grammar is only ever
//! borrowed, by any number of [`ScanSession`]s at once.

use rayon::prelude::*;
use std::fmt;
use strand_ir::{Token, TokenId, TokenTable};
use tracing::debug;

use crate::reader::read_state;
use crate::state::serialize_state;
use crate::{
    GrammarError, ReadError, RuleAnnotations, RuleId, RuleTable, ScanError, ScanSession,
    SessionConfig, StateArena, StateId, StateKind, TerminalRule,
};

#[derive(Clone, Debug, Default)]
pub struct Grammar {
    tokens: TokenTable,
    rules: RuleTable,
    states: StateArena,
    root: Option<StateId>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &TokenTable {
        &self.tokens
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn states(&self) -> &StateArena {
        &self.states
    }

    pub fn root(&self) -> Option<StateId> {
        self.root
    }

    pub fn set_root(&mut self, root: StateId) -> Result<(), GrammarError> {
        self.states.node(root)?;
        self.root = Some(root);
        Ok(())
    }

    /// Intern a token name.
    pub fn token(&mut self, name: &str) -> TokenId {
        self.tokens.intern(name)
    }

    pub fn add_rule(&mut self, rule: TerminalRule) -> RuleId {
        self.rules.push(Box::new(rule))
    }

    /// A terminal state matching the first of `choices`, producing `token`.
    pub fn one_of<I, S>(&mut self, token: &str, choices: I) -> Result<StateId, GrammarError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Box<str>>,
    {
        let token = self.token(token);
        let rule = self.add_rule(TerminalRule::one_of(token, choices)?);
        Ok(self.states.terminal(rule))
    }

    /// A state evaluating an existing rule.
    pub fn terminal(&mut self, rule: RuleId) -> Result<StateId, GrammarError> {
        self.rules.get(rule).ok_or(GrammarError::UnknownRule(rule))?;
        Ok(self.states.terminal(rule))
    }

    pub fn repeat(
        &mut self,
        child: StateId,
        min: u32,
        max: Option<u32>,
    ) -> Result<StateId, GrammarError> {
        self.states.repeat(child, min, max)
    }

    /// An ordered alternation over `branches`.
    pub fn alternation(
        &mut self,
        branches: impl IntoIterator<Item = StateId>,
    ) -> Result<StateId, GrammarError> {
        self.states.branch(branches)
    }

    /// Append `to` as a continuation of `from`.
    pub fn link(&mut self, from: StateId, to: StateId) -> Result<(), GrammarError> {
        self.states.link(from, to)
    }

    /// Chain `states` into a sequence and return the first.
    pub fn sequence(&mut self, states: &[StateId]) -> Result<Option<StateId>, GrammarError> {
        for pair in states.windows(2) {
            self.link(pair[0], pair[1])?;
        }
        Ok(states.first().copied())
    }

    /// Set the token a state emits for its own match. On a terminal, `None`
    /// falls back to the rule's token.
    pub fn retoken(&mut self, state: StateId, token: Option<&str>) -> Result<(), GrammarError> {
        let token = token.map(|name| self.tokens.intern(name));
        self.states.set_token(state, token)
    }

    /// Add `annotations` to a state.
    ///
    /// A terminal gets a derived rule carrying the union of the rule's and
    /// the new annotations, so other states sharing the original rule are
    /// unaffected.
    pub fn annotate(
        &mut self,
        state: StateId,
        annotations: &RuleAnnotations,
    ) -> Result<(), GrammarError> {
        match self.states.node(state)?.kind {
            StateKind::Terminal { rule } => {
                let original = self.rules.get(rule).ok_or(GrammarError::UnknownRule(rule))?;
                let merged = original.annotations().merged(annotations);
                let derived = original.instance(None, Some(merged));
                let derived = self.rules.push(derived);
                self.states.node_mut(state)?.kind = StateKind::Terminal { rule: derived };
            }
            StateKind::Repeat { .. } | StateKind::Branch => {
                let node = self.states.node_mut(state)?;
                node.annotations = node.annotations.merged(annotations);
            }
        }
        Ok(())
    }

    /// Deep-copy the subgraph rooted at `state`; see
    /// [`StateArena::instantiate`].
    pub fn instantiate(&mut self, state: StateId) -> Result<StateId, GrammarError> {
        self.states.instantiate(state)
    }

    /// Render `state` and everything reachable from it.
    pub fn serialize(&self, state: StateId) -> Result<String, GrammarError> {
        serialize_state(&self.states, &self.rules, &self.tokens, state, "")
    }

    /// Read serialized text into this grammar, returning the new root.
    pub fn read(&mut self, text: &str) -> Result<StateId, ReadError> {
        read_state(text, &mut self.tokens, &mut self.rules, &mut self.states)
    }

    /// Build a grammar from serialized text, rooted at what was read.
    pub fn parse(text: &str) -> Result<Self, ReadError> {
        let mut grammar = Grammar::new();
        let root = grammar.read(text)?;
        grammar.set_root(root)?;
        Ok(grammar)
    }

    pub fn session<'src>(&self, source: &'src str) -> ScanSession<'_, 'src> {
        ScanSession::new(self, source)
    }

    /// Tokenize `source` from the root state with the default configuration.
    pub fn tokenize<'src>(&self, source: &'src str) -> Result<TokenStream<'src>, ScanError> {
        self.tokenize_with(source, SessionConfig::default())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn tokenize_with<'src>(
        &self,
        source: &'src str,
        config: SessionConfig,
    ) -> Result<TokenStream<'src>, ScanError> {
        let root = self.root.ok_or(GrammarError::NoRoot)?;
        let mut session = ScanSession::with_config(self, source, config);
        session.run(root)?;
        debug!(
            tokens = session.tokens().len(),
            steps = session.steps(),
            cache = ?session.cache().stats(),
            scans = session.scanner().scan_count(),
            "tokenized"
        );
        Ok(TokenStream {
            source,
            tokens: session.into_tokens(),
        })
    }

    /// Tokenize independent inputs in parallel, one session per input.
    pub fn tokenize_all<'src>(
        &self,
        sources: &[&'src str],
    ) -> Vec<Result<TokenStream<'src>, ScanError>> {
        sources
            .par_iter()
            .map(|&source| self.tokenize(source))
            .collect()
    }
}

/// Tokens produced from one input, with the input they index into.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenStream<'src> {
    source: &'src str,
    tokens: Vec<Token>,
}

impl<'src> TokenStream<'src> {
    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Each token paired with the text it covers.
    pub fn texts(&self) -> impl Iterator<Item = (TokenId, &'src str)> + '_ {
        let source = self.source;
        self.tokens
            .iter()
            .map(move |token| (token.id, token.span.slice(source).unwrap_or_default()))
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

impl fmt::Debug for TokenStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.texts()).finish()
    }
}

impl<'a> IntoIterator for &'a TokenStream<'_> {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests;
