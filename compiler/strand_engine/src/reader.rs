//! Reads serialized state graphs back into an arena.
//!
//! Accepts exactly the format written by the serializer (see
//! `state::serialize`), with any amount of whitespace between lexemes.
//! Every terminal read creates a fresh [`TerminalRule`]; tokens are
//! interned by name.

use strand_ir::{TokenId, TokenTable};
use strand_stack::ensure_sufficient_stack;

use crate::{
    ReadError, RuleAnnotations, RuleTable, StateArena, StateId, StateNode, StateKind, TerminalRule,
};

pub(crate) fn read_state(
    text: &str,
    tokens: &mut TokenTable,
    rules: &mut RuleTable,
    states: &mut StateArena,
) -> Result<StateId, ReadError> {
    let mut reader = Reader {
        text,
        pos: 0,
        tokens,
        rules,
        states,
    };
    let root = reader.node()?;
    reader.skip_ws();
    if reader.pos < text.len() {
        return Err(ReadError::TrailingInput { at: reader.pos });
    }
    Ok(root)
}

struct Reader<'t, 'g> {
    text: &'t str,
    pos: usize,
    tokens: &'g mut TokenTable,
    rules: &'g mut RuleTable,
    states: &'g mut StateArena,
}

impl<'t> Reader<'t, '_> {
    /// Every nesting level passes through here, so this is where the stack
    /// is grown.
    fn node(&mut self) -> Result<StateId, ReadError> {
        ensure_sufficient_stack(|| self.read_node())
    }

    fn read_node(&mut self) -> Result<StateId, ReadError> {
        let annotations = self.annotations()?;
        let body_at = self.pos;
        self.expect('(')?;
        self.skip_ws();

        let id = match self.peek() {
            Some('"') => self.terminal(annotations, body_at)?,
            Some(')') => {
                self.bump();
                let token = self.optional_token()?;
                let mut node = StateNode::new(StateKind::Branch).with_annotations(annotations);
                node.token = token;
                self.states.alloc(node)
            }
            _ => self.repeat(annotations)?,
        };

        self.branches(id)?;
        Ok(id)
    }

    fn terminal(
        &mut self,
        annotations: RuleAnnotations,
        body_at: usize,
    ) -> Result<StateId, ReadError> {
        let mut choices = vec![self.string()?];
        loop {
            self.skip_ws();
            if self.eat('|') {
                self.skip_ws();
                choices.push(self.string()?);
            } else {
                break;
            }
        }
        self.expect(')')?;
        let token = self
            .optional_token()?
            .ok_or(ReadError::MissingToken { at: body_at })?;
        let rule = TerminalRule::one_of(token, choices)?.with_annotations(annotations);
        let rule = self.rules.push(Box::new(rule));
        Ok(self.states.terminal(rule))
    }

    fn repeat(&mut self, annotations: RuleAnnotations) -> Result<StateId, ReadError> {
        let child = self.node()?;
        self.skip_ws();
        let mut min = 1;
        let mut max = None;
        if self.eat(',') {
            min = self.count()?;
            self.skip_ws();
            if self.eat(',') {
                max = Some(self.count()?);
            }
        }
        self.expect(')')?;
        let id = self.states.repeat(child, min, max)?;
        let token = self.optional_token()?;
        let node = self.states.node_mut(id)?;
        node.annotations = annotations;
        node.token = token;
        Ok(id)
    }

    fn branches(&mut self, from: StateId) -> Result<(), ReadError> {
        self.skip_ws();
        if !self.eat('.') {
            return Ok(());
        }
        self.skip_ws();
        if self.eat('{') {
            loop {
                self.skip_ws();
                let to = self.node()?;
                self.states.link(from, to)?;
                self.skip_ws();
                if self.eat(',') {
                    continue;
                }
                self.expect('}')?;
                return Ok(());
            }
        }
        let to = self.node()?;
        self.states.link(from, to)?;
        Ok(())
    }

    fn annotations(&mut self) -> Result<RuleAnnotations, ReadError> {
        let mut annotations = RuleAnnotations::new();
        loop {
            self.skip_ws();
            let at = self.pos;
            if !self.eat('@') {
                return Ok(annotations);
            }
            let name = self.bare_name();
            if name == "error" {
                self.expect('(')?;
                let message = self.string()?;
                self.expect(')')?;
                annotations = annotations.with_error(message);
            } else if let Some(flag) = RuleAnnotations::flag_named(name) {
                annotations = annotations.with(flag);
            } else {
                return Err(ReadError::UnknownAnnotation {
                    name: name.to_string(),
                    at,
                });
            }
        }
    }

    fn optional_token(&mut self) -> Result<Option<TokenId>, ReadError> {
        self.skip_ws();
        if !self.text[self.pos..].starts_with("->") {
            return Ok(None);
        }
        self.pos += 2;
        self.skip_ws();
        let name = if self.peek() == Some('"') {
            self.string()?
        } else {
            let at = self.pos;
            let name = self.bare_name();
            if name.is_empty() {
                return Err(ReadError::Expected {
                    expected: "token name",
                    at,
                });
            }
            name.to_string()
        };
        Ok(Some(self.tokens.intern(&name)))
    }

    fn count(&mut self) -> Result<u32, ReadError> {
        self.skip_ws();
        let at = self.pos;
        let digits = self.take_while(|c| c.is_ascii_digit());
        digits
            .parse()
            .map_err(|_| ReadError::InvalidCount { at })
    }

    fn string(&mut self) -> Result<String, ReadError> {
        let at = self.pos;
        self.expect('"')?;
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(ReadError::UnterminatedString { at });
            };
            match c {
                '"' => return Ok(out),
                '\\' => out.push(self.escape()?),
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char, ReadError> {
        let at = self.pos - 1;
        match self.bump() {
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => {
                if !self.eat('{') {
                    return Err(ReadError::InvalidEscape { at });
                }
                let hex = self.take_while(|c| c.is_ascii_hexdigit());
                let c = u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(ReadError::InvalidEscape { at })?;
                if !self.eat('}') {
                    return Err(ReadError::InvalidEscape { at });
                }
                Ok(c)
            }
            _ => Err(ReadError::InvalidEscape { at }),
        }
    }

    fn bare_name(&mut self) -> &'t str {
        self.take_while(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'t str {
        let text = self.text;
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &text[start..self.pos]
    }

    fn expect(&mut self, c: char) -> Result<(), ReadError> {
        self.skip_ws();
        if self.eat(c) {
            Ok(())
        } else {
            Err(ReadError::Expected {
                expected: expected_name(c),
                at: self.pos,
            })
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }
}

fn expected_name(c: char) -> &'static str {
    match c {
        '(' => "`(`",
        ')' => "`)`",
        '}' => "`}`",
        '"' => "a quoted string",
        _ => "a delimiter",
    }
}
