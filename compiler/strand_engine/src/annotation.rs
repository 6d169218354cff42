//! Rule and state annotations.
//!
//! Annotations are descriptive metadata carried alongside a rule or state
//! and rendered in front of its description:
//!
//! ```text
//! @void @error("expected a keyword") ("if" | "else")
//! ```
//!
//! Marker annotations are a bitflag set, so rendering order is fixed and
//! equality is structural.

use bitflags::bitflags;
use std::fmt;

use crate::quote::quoted;

bitflags! {
    /// Marker annotations without a value.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct AnnotationFlags: u8 {
        /// The match is consumed but not meant to appear in output.
        const VOID = 1 << 0;
        /// The match is folded into its parent.
        const TRANSIENT = 1 << 1;
        /// Once entered, the match should not be backtracked out of.
        const PINNED = 1 << 2;
    }
}

/// Rendering order and spelling of the marker annotations.
const FLAG_NAMES: [(AnnotationFlags, &str); 3] = [
    (AnnotationFlags::VOID, "void"),
    (AnnotationFlags::TRANSIENT, "transient"),
    (AnnotationFlags::PINNED, "pinned"),
];

/// Annotation set for a rule or state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RuleAnnotations {
    flags: AnnotationFlags,
    error: Option<Box<str>>,
}

impl RuleAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, flag: AnnotationFlags) -> Self {
        self.flags |= flag;
        self
    }

    /// Attach an `@error("...")` message.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<Box<str>>) -> Self {
        self.error = Some(message.into());
        self
    }

    #[inline]
    pub fn has(&self, flag: AnnotationFlags) -> bool {
        self.flags.contains(flag)
    }

    #[inline]
    pub fn flags(&self) -> AnnotationFlags {
        self.flags
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.error.is_none()
    }

    /// Union of both sets; `other`'s error message wins when both have one.
    #[must_use]
    pub fn merged(&self, other: &RuleAnnotations) -> Self {
        RuleAnnotations {
            flags: self.flags | other.flags,
            error: other.error.clone().or_else(|| self.error.clone()),
        }
    }

    /// Look up a marker annotation by its rendered name.
    pub fn flag_named(name: &str) -> Option<AnnotationFlags> {
        FLAG_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }

    /// Prefix used in descriptions: the rendered set plus a trailing space,
    /// or nothing when empty.
    pub fn prefix(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("{self} ")
        }
    }
}

impl fmt::Display for RuleAnnotations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in FLAG_NAMES {
            if self.flags.contains(flag) {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "@{name}")?;
                first = false;
            }
        }
        if let Some(message) = &self.error {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "@error({})", quoted(message))?;
        }
        Ok(())
    }
}
