//! # Error Types
//!
//! Structured errors for failed parses, plus source-location recovery.
//!
//! ## Overview
//!
//! A failed parse delivers exactly one [`ParseError`]: the first failure
//! of a committed body, carried unchanged through the continuation chain
//! to the root. Failures of *uncommitted* branch tests never surface;
//! they only drive the choice machinery to the next alternative.
//!
//! Every error carries the [`Cursor`] position it was raised at. Mapping
//! a position back to a line, column, and source-line context is a
//! separate, optional pass; see [`location`].

use crate::input::Cursor;
use compact_str::CompactString;
use thiserror::Error;

pub mod location;

pub use location::{locate, ErrorLocation};

/// An error raised while running a grammar against an input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A literal rule did not match.
    #[error("expected literal `{expected}`")]
    ExpectedLiteral {
        /// Where the literal was expected.
        at: Cursor,
        /// The literal text that was expected.
        expected: CompactString,
    },

    /// A predicate or character-class rule did not match.
    #[error("expected {name}")]
    ExpectedCharClass {
        /// Where the class was expected.
        at: Cursor,
        /// The class's display name.
        name: CompactString,
    },

    /// An `eof` rule ran before the end of input.
    #[error("expected end of input")]
    ExpectedEof {
        /// Where trailing input starts.
        at: Cursor,
    },

    /// No choice operand's branch condition held.
    #[error("exhausted choice")]
    ExhaustedChoice {
        /// Where the choice gave up.
        at: Cursor,
    },

    /// No alternative-set member matched.
    #[error("exhausted alternatives")]
    ExhaustedAlternatives {
        /// Where the set gave up.
        at: Cursor,
    },

    /// A `context_pop` or `context_top` comparator failed.
    #[error("context mismatch: expected `{expected}`")]
    ContextMismatch {
        /// Where the mismatching lexeme starts.
        at: Cursor,
        /// The top slot's contents (lossily decoded).
        expected: CompactString,
    },

    /// A `peek_not` condition was violated.
    #[error("unexpected input")]
    Unexpected {
        /// Start of the offending input.
        begin: Cursor,
        /// End of the offending input.
        end: Cursor,
    },

    /// A combination rule saw the same member match twice.
    #[error("combination duplicate")]
    CombinationDuplicate {
        /// Start of the duplicate match.
        begin: Cursor,
        /// End of the duplicate match.
        end: Cursor,
    },

    /// A grammar-author-defined error raised by an `error` rule.
    #[error("{tag}")]
    Custom {
        /// Where the error was raised.
        at: Cursor,
        /// The author's display string.
        tag: CompactString,
    },
}

impl ParseError {
    /// The position the error was raised at.
    ///
    /// For errors covering a range this is the range's start.
    #[must_use]
    pub fn position(&self) -> Cursor {
        match self {
            Self::ExpectedLiteral { at, .. }
            | Self::ExpectedCharClass { at, .. }
            | Self::ExpectedEof { at }
            | Self::ExhaustedChoice { at }
            | Self::ExhaustedAlternatives { at }
            | Self::ContextMismatch { at, .. }
            | Self::Custom { at, .. } => *at,
            Self::Unexpected { begin, .. } | Self::CombinationDuplicate { begin, .. } => *begin,
        }
    }
}
