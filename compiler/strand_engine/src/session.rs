//! Scan sessions: one matching pass over one input.
//!
//! A session owns everything mutable about a pass:
//! - the [`Scanner`] (read position and mark stack)
//! - the [`MatchCache`] (packrat results for this input)
//! - the context stack (token frames)
//! - the injected [`ScanObserver`]
//!
//! The grammar is only borrowed, so any number of sessions can share one.
//!
//! # Contexts
//!
//! Each [`Context`] frame records where the current unemitted span starts,
//! how far scanning has got, and the tokens emitted inside the frame. A frame
//! pushed for speculative work is either published into its parent on pop
//! or discarded, which is how backtracked work vanishes without trace.
//!
//! # Emission
//!
//! A node emits a token only when the frame's position has advanced past the
//! frame's start; the token spans exactly that range and the frame's start
//! then moves up to the current position. Zero-width matches emit nothing.

mod repeat;

use smallvec::SmallVec;
use strand_ir::{Span, Token, TokenId};
use strand_scanner::Scanner;
use strand_stack::DepthGuard;
use tracing::{debug, trace};

use crate::{
    Grammar, GrammarError, MatchCache, MatchResult, NoopObserver, ResultCache, RuleId,
    ScanError, ScanEvent, ScanObserver, SessionConfig, StateId, StateKind, StateNode,
};

/// A scanning frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    start: u32,
    current: u32,
    tokens: SmallVec<[Token; 8]>,
}

impl Context {
    fn at(position: u32) -> Self {
        Context {
            start: position,
            current: position,
            tokens: SmallVec::new(),
        }
    }

    /// Start of the span not yet covered by an emitted token.
    #[inline]
    pub fn start_position(&self) -> u32 {
        self.start
    }

    #[inline]
    pub fn current_position(&self) -> u32 {
        self.current
    }

    /// Tokens emitted within this frame, in order.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

/// One in-flight matching pass.
pub struct ScanSession<'g, 'src, C = ResultCache, O = NoopObserver> {
    grammar: &'g Grammar,
    scanner: Scanner<'src>,
    cache: C,
    observer: O,
    config: SessionConfig,
    /// Never empty; the bottom frame collects the session's output.
    contexts: Vec<Context>,
    depth: DepthGuard,
    steps: u64,
    furthest_failure: Option<u32>,
}

impl<'g, 'src> ScanSession<'g, 'src> {
    pub fn new(grammar: &'g Grammar, source: &'src str) -> Self {
        Self::with_config(grammar, source, SessionConfig::default())
    }

    pub fn with_config(grammar: &'g Grammar, source: &'src str, config: SessionConfig) -> Self {
        ScanSession {
            grammar,
            scanner: Scanner::new(source),
            cache: ResultCache::new(),
            observer: NoopObserver,
            config,
            contexts: vec![Context::at(0)],
            depth: DepthGuard::new(config.max_depth),
            steps: 0,
            furthest_failure: None,
        }
    }
}

impl<'g, 'src, C: MatchCache, O: ScanObserver> ScanSession<'g, 'src, C, O> {
    /// Replace the observer. Intended before the first scan.
    pub fn with_observer<O2: ScanObserver>(self, observer: O2) -> ScanSession<'g, 'src, C, O2> {
        ScanSession {
            grammar: self.grammar,
            scanner: self.scanner,
            cache: self.cache,
            observer,
            config: self.config,
            contexts: self.contexts,
            depth: self.depth,
            steps: self.steps,
            furthest_failure: self.furthest_failure,
        }
    }

    /// Replace the result cache. Intended before the first scan.
    pub fn with_cache<C2: MatchCache>(self, cache: C2) -> ScanSession<'g, 'src, C2, O> {
        ScanSession {
            grammar: self.grammar,
            scanner: self.scanner,
            cache,
            observer: self.observer,
            config: self.config,
            contexts: self.contexts,
            depth: self.depth,
            steps: self.steps,
            furthest_failure: self.furthest_failure,
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn scanner(&self) -> &Scanner<'src> {
        &self.scanner
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Read position of the active frame.
    #[inline]
    pub fn position(&self) -> u32 {
        self.context().current
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.scanner.is_at_end()
    }

    /// Greatest offset any rule failed at so far.
    pub fn furthest_failure(&self) -> Option<u32> {
        self.furthest_failure
    }

    /// Total state scans performed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The active (innermost) frame.
    pub fn context(&self) -> &Context {
        // `contexts` is never empty: the root frame is created in the
        // constructor and `pop_context` refuses to remove it.
        &self.contexts[self.contexts.len() - 1]
    }

    fn context_mut(&mut self) -> &mut Context {
        let last = self.contexts.len() - 1;
        &mut self.contexts[last]
    }

    /// Number of frames on the stack, including the root frame.
    pub fn context_depth(&self) -> usize {
        self.contexts.len()
    }

    /// Push a fresh frame starting at the current position.
    pub fn push_context(&mut self) {
        let position = self.position();
        self.contexts.push(Context::at(position));
    }

    /// Pop the active frame. Its position always carries into the parent;
    /// its tokens are appended to the parent only when `publish` is set.
    ///
    /// The root frame is never popped.
    pub fn pop_context(&mut self, publish: bool) {
        if self.contexts.len() < 2 {
            debug_assert!(false, "attempted to pop the root context");
            return;
        }
        let Some(frame) = self.contexts.pop() else {
            return;
        };
        let parent = self.context_mut();
        parent.current = frame.current;
        if publish {
            parent.tokens.extend(frame.tokens);
        }
    }

    /// Scan `state` at the current position.
    ///
    /// `Ok(true)` means the state's own match succeeded (its continuations
    /// have already been tried); `Ok(false)` is an ordinary non-match.
    pub fn scan(&mut self, state: StateId) -> Result<bool, ScanError> {
        self.steps += 1;
        if let Some(limit) = self.config.max_steps {
            if self.steps > limit {
                return Err(ScanError::StepLimitExceeded { limit });
            }
        }
        DepthGuard::nested(self, |s| &mut s.depth, |s| s.scan_node(state))
    }

    fn scan_node(&mut self, id: StateId) -> Result<bool, ScanError> {
        let grammar = self.grammar;
        let node = grammar.states().node(id)?;
        trace!(?id, kind = ?node.kind, at = self.position(), "scan");
        match node.kind {
            StateKind::Terminal { rule } => self.scan_terminal(id, node, rule),
            StateKind::Repeat { child, min, max } => self.scan_repeat(id, node, child, min, max),
            StateKind::Branch => self.scan_branch(id, node),
        }
    }

    /// An alternation. A token on the branch node labels whatever its
    /// chosen alternative left pending.
    fn scan_branch(&mut self, id: StateId, node: &StateNode) -> Result<bool, ScanError> {
        if !self.scan_alternatives(&node.branches)? {
            return Ok(false);
        }
        if let Some(token) = node.token {
            self.emit(id, token);
        }
        Ok(true)
    }

    fn scan_terminal(
        &mut self,
        id: StateId,
        node: &'g StateNode,
        rule_id: RuleId,
    ) -> Result<bool, ScanError> {
        let grammar = self.grammar;
        let rule = grammar
            .rules()
            .get(rule_id)
            .ok_or(GrammarError::UnknownRule(rule_id))?;
        debug_assert_eq!(self.scanner.position(), self.position());

        match rule.evaluate(rule_id, &mut self.scanner, &mut self.cache)? {
            MatchResult::Success(ctx) => {
                self.context_mut().current = ctx.span.end;
                self.emit(id, node.token.unwrap_or_else(|| rule.produces()));
                self.scan_continuations(node)?;
                Ok(true)
            }
            MatchResult::Failure { at } => {
                self.furthest_failure = Some(self.furthest_failure.map_or(at, |f| f.max(at)));
                Ok(false)
            }
        }
    }

    /// Try `branches` in order; the first that succeeds ends the search.
    fn scan_alternatives(&mut self, branches: &[StateId]) -> Result<bool, ScanError> {
        for &branch in branches {
            if self.scan(branch)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Run a node's continuations after its own match. Reaching the end of
    /// input, or no branch matching, ends the node's match where it is.
    fn scan_continuations(&mut self, node: &StateNode) -> Result<(), ScanError> {
        if self.scanner.is_at_end() {
            return Ok(());
        }
        self.scan_alternatives(&node.branches)?;
        Ok(())
    }

    /// Emit `token` over the active frame's pending span, if it is non-empty.
    fn emit(&mut self, state: StateId, token: TokenId) {
        let frame = self.context_mut();
        if frame.current <= frame.start {
            return;
        }
        let token = Token::new(token, Span::new(frame.start, frame.current));
        frame.tokens.push(token);
        frame.start = frame.current;
        self.observer.observe(&ScanEvent::TokenEmitted { state, token });
    }

    /// Move both the scanner and the active frame to `position`.
    fn reset_position(&mut self, position: u32) {
        self.scanner.set_position(position);
        self.context_mut().current = position;
    }

    /// Scan `root` repeatedly until the input is exhausted.
    ///
    /// Each pass must advance; a pass that cannot reports
    /// [`ScanError::NothingMatched`] at the furthest failure seen.
    pub fn run(&mut self, root: StateId) -> Result<(), ScanError> {
        while !self.scanner.is_at_end() {
            let before = self.position();
            self.scan(root)?;
            if self.position() <= before {
                let at = self.furthest_failure.map_or(before, |f| f.max(before));
                debug!(at, "no progress");
                return Err(ScanError::NothingMatched { at });
            }
        }
        debug_assert_eq!(self.contexts.len(), 1, "unbalanced context stack");
        debug_assert_eq!(self.scanner.mark_depth(), 0, "unbalanced scanner marks");
        Ok(())
    }

    /// Tokens collected in the root frame.
    pub fn tokens(&self) -> &[Token] {
        &self.contexts[0].tokens
    }

    /// Consume the session, returning the root frame's tokens.
    pub fn into_tokens(mut self) -> Vec<Token> {
        self.contexts.truncate(1);
        self.contexts
            .pop()
            .map(|frame| frame.tokens.into_vec())
            .unwrap_or_default()
    }

    /// Consume the session, returning its observer.
    pub fn into_observer(self) -> O {
        self.observer
    }
}
