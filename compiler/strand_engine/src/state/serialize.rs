//! Textual rendering of a state graph.
//!
//! ```text
//! node      := annotations? body ('->' name)? branches
//! body      := '(' quoted ('|' quoted)* ')'          terminal
//!            | '(' node (',' min (',' max)?)? ')'    repeat
//!            | '(' ')'                               branch
//! branches  := ''
//!            | '.' node
//!            | '.{' node (',' node)* '}'             one per line, indented
//! ```
//!
//! Repeat bounds are omitted when they are the defaults (`min` 1, no
//! `max`). A terminal always names its token, folding any per-node token
//! or annotations into the rule it renders. The output is read back by
//! [`Grammar::read`](crate::Grammar::read).

use rustc_hash::FxHashSet;
use std::fmt::Write;
use strand_ir::{TokenId, TokenTable};
use strand_stack::ensure_sufficient_stack;

use super::{StateArena, StateId, StateKind};
use crate::quote::write_name;
use crate::{GrammarError, RuleTable};

/// Render the graph rooted at `root`. Nested lines are indented by `indent`
/// plus one tab per level.
pub(crate) fn serialize_state(
    states: &StateArena,
    rules: &RuleTable,
    tokens: &TokenTable,
    root: StateId,
    indent: &str,
) -> Result<String, GrammarError> {
    let mut serializer = Serializer {
        states,
        rules,
        tokens,
        indent,
        path: FxHashSet::default(),
        out: String::new(),
    };
    serializer.node(root, 0)?;
    Ok(serializer.out)
}

struct Serializer<'a> {
    states: &'a StateArena,
    rules: &'a RuleTable,
    tokens: &'a TokenTable,
    indent: &'a str,
    /// States on the current path; shared subgraphs are expanded, cycles
    /// are rejected.
    path: FxHashSet<StateId>,
    out: String,
}

impl Serializer<'_> {
    fn node(&mut self, id: StateId, depth: usize) -> Result<(), GrammarError> {
        ensure_sufficient_stack(|| self.write_node(id, depth))
    }

    fn write_node(&mut self, id: StateId, depth: usize) -> Result<(), GrammarError> {
        if !self.path.insert(id) {
            return Err(GrammarError::CyclicGraph(id));
        }
        let node = self.states.node(id)?;

        match node.kind {
            StateKind::Terminal { rule } => {
                let rule_ref = self.rules.get(rule).ok_or(GrammarError::UnknownRule(rule))?;
                let description = if node.annotations.is_empty() {
                    rule_ref.describe()
                } else {
                    let merged = rule_ref.annotations().merged(&node.annotations);
                    rule_ref.instance(None, Some(merged)).describe()
                };
                self.out.push_str(&description);
                self.token(node.token.unwrap_or_else(|| rule_ref.produces()))?;
            }
            StateKind::Repeat { child, min, max } => {
                self.out.push_str(&node.annotations.prefix());
                self.out.push('(');
                self.node(child, depth + 1)?;
                if min != 1 || max.is_some() {
                    let _ = write!(self.out, ",{min}");
                    if let Some(max) = max {
                        let _ = write!(self.out, ",{max}");
                    }
                }
                self.out.push(')');
                if let Some(token) = node.token {
                    self.token(token)?;
                }
            }
            StateKind::Branch => {
                self.out.push_str(&node.annotations.prefix());
                self.out.push_str("()");
                if let Some(token) = node.token {
                    self.token(token)?;
                }
            }
        }

        match node.branches.as_slice() {
            [] => {}
            [only] => {
                self.out.push('.');
                self.node(*only, depth)?;
            }
            many => {
                self.out.push_str(".{");
                for (i, &branch) in many.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.line(depth + 1);
                    self.node(branch, depth + 1)?;
                }
                self.line(depth);
                self.out.push('}');
            }
        }

        self.path.remove(&id);
        Ok(())
    }

    /// Start a new line indented `depth` levels past the base indent.
    fn line(&mut self, depth: usize) {
        self.out.push('\n');
        self.out.push_str(self.indent);
        self.out.extend(std::iter::repeat('\t').take(depth));
    }

    fn token(&mut self, token: TokenId) -> Result<(), GrammarError> {
        let name = self
            .tokens
            .name(token)
            .ok_or(GrammarError::UnknownToken(token))?;
        self.out.push_str("->");
        write_name(&mut self.out, name);
        Ok(())
    }
}
