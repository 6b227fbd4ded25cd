//! # Input Module
//!
//! The byte source the engine consumes: a snapshot-able cursor over code
//! units.
//!
//! ## Overview
//!
//! The engine never touches input directly; it goes through a [`Reader`],
//! which exposes exactly the operations backtracking needs:
//!
//! - `peek`/`bump` over individual code units (bytes)
//! - [`Reader::cur`] to take a [`Cursor`] snapshot
//! - [`Reader::set`] to restore a snapshot in O(1), with no side effects
//!   on the underlying bytes
//! - [`Reader::slice`] to recover the lexeme between two snapshots
//!
//! Code-point decoding ([`Reader::peek_code_point`]) exists only for
//! code-point-aware atomic rules and for diagnostics; everything else is
//! byte-oriented, so arbitrary (non-UTF-8) input is accepted.

/// An opaque position in a [`Reader`].
///
/// Cursors are cheap to copy and compare; restoring one via
/// [`Reader::set`] is O(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(usize);

impl Cursor {
    /// Byte offset from the start of input.
    #[must_use]
    pub fn offset(self) -> usize {
        self.0
    }
}

/// A borrowed view over input bytes with a current position.
///
/// `Reader` is `Copy`: taking a probe copy before a speculative match and
/// throwing the copy away is the engine's entire backtracking mechanism.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'i> {
    bytes: &'i [u8],
    pos: usize,
}

impl<'i> Reader<'i> {
    /// Creates a reader over raw bytes.
    #[must_use]
    pub fn new(bytes: &'i [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// The code unit at the current position, or `None` at end of input.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Whether the reader is at end of input.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Advances past the current code unit. No-op at end of input.
    pub fn bump(&mut self) {
        if self.pos < self.bytes.len() {
            self.pos += 1;
        }
    }

    /// Advances by `n` code units, saturating at end of input.
    pub fn bump_by(&mut self, n: usize) {
        self.pos = usize::min(self.pos + n, self.bytes.len());
    }

    /// Takes a snapshot of the current position.
    #[must_use]
    pub fn cur(&self) -> Cursor {
        Cursor(self.pos)
    }

    /// Restores a snapshot previously taken with [`Reader::cur`].
    pub fn set(&mut self, cursor: Cursor) {
        debug_assert!(cursor.0 <= self.bytes.len());
        self.pos = cursor.0;
    }

    /// The bytes between two snapshots.
    #[must_use]
    pub fn slice(&self, from: Cursor, to: Cursor) -> &'i [u8] {
        &self.bytes[from.0..to.0]
    }

    /// Decodes the UTF-8 code point at the current position.
    ///
    /// Returns the scalar value and its encoded length, or `None` at end
    /// of input or if the bytes at the current position are not valid
    /// UTF-8. The reader is not advanced.
    #[must_use]
    pub fn peek_code_point(&self) -> Option<(char, usize)> {
        let rest = &self.bytes[self.pos.min(self.bytes.len())..];
        let first = *rest.first()?;
        let len = match first {
            0x00..=0x7F => 1,
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return None,
        };
        if rest.len() < len {
            return None;
        }
        let decoded = core::str::from_utf8(&rest[..len]).ok()?;
        let ch = decoded.chars().next()?;
        Some((ch, len))
    }
}

impl<'i> From<&'i str> for Reader<'i> {
    fn from(s: &'i str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl<'i> From<&'i [u8]> for Reader<'i> {
    fn from(bytes: &'i [u8]) -> Self {
        Self::new(bytes)
    }
}
