//! Read position, mark stack, and literal matching.

use smallvec::SmallVec;
use strand_ir::Span;

/// A literal did not match at the current position.
///
/// This is the ordinary, expected outcome of trying an alternative; the
/// position is left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("literal did not match at offset {at}")]
pub struct NoMatch {
    pub at: u32,
}

/// Scanner over a borrowed source string.
///
/// Owned exclusively by one in-flight scan. Positions are byte offsets and
/// only ever land on character boundaries: they start at zero and move by
/// whole literal lengths or to offsets previously produced by this scanner.
#[derive(Clone, Debug)]
pub struct Scanner<'src> {
    source: &'src str,
    pos: u32,
    len: u32,
    marks: SmallVec<[u32; 16]>,
    /// Number of literal comparisons performed.
    scans: u64,
}

impl<'src> Scanner<'src> {
    /// Create a scanner at offset zero.
    ///
    /// # Panics
    ///
    /// Panics if the source is longer than `u32::MAX` bytes.
    pub fn new(source: &'src str) -> Self {
        let len = u32::try_from(source.len()).unwrap_or_else(|_| {
            panic!(
                "source of {} bytes exceeds the {} byte scanner limit",
                source.len(),
                u32::MAX
            )
        });
        Scanner {
            source,
            pos: 0,
            len,
            marks: SmallVec::new(),
            scans: 0,
        }
    }

    /// The full source text.
    #[inline]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Current read position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Move the read position directly.
    ///
    /// Used to fast-forward over a memoized match. The target must be an
    /// offset this scanner could have reached itself.
    pub fn set_position(&mut self, pos: u32) {
        debug_assert!(
            pos <= self.len,
            "scanner position {pos} out of bounds (len {})",
            self.len
        );
        debug_assert!(
            self.source.is_char_boundary(pos as usize),
            "scanner position {pos} splits a character"
        );
        self.pos = pos.min(self.len);
    }

    /// True once every byte of the source has been consumed.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.len
    }

    /// Unconsumed input.
    #[inline]
    pub fn remaining(&self) -> &'src str {
        self.source.get(self.pos as usize..).unwrap_or_default()
    }

    /// Push a restore point at the current position.
    #[inline]
    pub fn mark(&mut self) {
        self.marks.push(self.pos);
    }

    /// Pop the most recent mark and restore the position it recorded.
    ///
    /// Only used on failure paths. Returns the restored position.
    pub fn rewind(&mut self) -> u32 {
        debug_assert!(!self.marks.is_empty(), "rewind without a matching mark");
        if let Some(pos) = self.marks.pop() {
            self.pos = pos;
        }
        self.pos
    }

    /// Pop the most recent mark, keeping everything consumed since it.
    ///
    /// Returns the span from the mark to the current position.
    pub fn proceed(&mut self) -> Span {
        debug_assert!(!self.marks.is_empty(), "proceed without a matching mark");
        let start = self.marks.pop().unwrap_or(self.pos);
        Span::new(start, self.pos)
    }

    /// Number of marks currently open.
    #[inline]
    pub fn mark_depth(&self) -> usize {
        self.marks.len()
    }

    /// Consume `terminal` if the input at the current position starts with it.
    ///
    /// On a miss the position is unchanged. An empty terminal always matches
    /// and consumes nothing.
    pub fn scan(&mut self, terminal: &str) -> Result<(), NoMatch> {
        self.scans += 1;
        if self.remaining().starts_with(terminal) {
            // `terminal.len()` fits: it is no longer than the remaining input.
            self.pos += terminal.len() as u32;
            Ok(())
        } else {
            Err(NoMatch { at: self.pos })
        }
    }

    /// Number of literal comparisons performed so far.
    #[inline]
    pub fn scan_count(&self) -> u64 {
        self.scans
    }
}

#[cfg(test)]
mod tests;
