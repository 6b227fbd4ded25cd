//! Source-location recovery for error positions.
//!
//! Given the cursor an error was raised at, rescan the input from the
//! start, counting code points and newlines, to recover a (line, column)
//! pair and the full source line as context. This is deliberately a
//! separate pass: it costs a scan of the input prefix and is only worth
//! paying once a parse has already failed.

use crate::input::{Cursor, Reader};

/// A recovered source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLocation {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number, counted in code points.
    pub column: usize,
    /// The entire source line the position falls on (lossily decoded).
    pub context: String,
}

/// Matches a newline (`\r\n` or `\n`) at the reader's position,
/// consuming it on success.
fn try_match_newline(reader: &mut Reader<'_>) -> bool {
    match reader.peek() {
        Some(b'\r') => {
            let save = reader.cur();
            reader.bump();
            if reader.peek() == Some(b'\n') {
                reader.bump();
                true
            } else {
                reader.set(save);
                false
            }
        }
        Some(b'\n') => {
            reader.bump();
            true
        }
        _ => false,
    }
}

/// Recovers the line, column, and source-line context for a position.
///
/// Columns count decoded code points, not code units. An invalid code
/// unit is stepped past without incrementing the column counter; that
/// quirk is inherited deliberately, so positions inside undecodable
/// input still land on the right line. A position at or beyond end of
/// input reports the last counted line and column with the trailing
/// context up to end of input.
#[must_use]
pub fn locate(input: &[u8], at: Cursor) -> ErrorLocation {
    let mut reader = Reader::new(input);
    let mut line = 1usize;
    let mut column = 1usize;
    let mut line_start = reader.cur();

    loop {
        if reader.cur() == at {
            break;
        }
        if try_match_newline(&mut reader) {
            line += 1;
            column = 1;
            line_start = reader.cur();
        } else if let Some((_, len)) = reader.peek_code_point() {
            reader.bump_by(len);
            column += 1;
        } else if reader.is_eof() {
            // Out-of-bounds error position: report the end of input.
            let context = reader.slice(line_start, reader.cur());
            return ErrorLocation {
                line,
                column,
                context: String::from_utf8_lossy(context).into_owned(),
            };
        } else {
            // Invalid code unit: skip it without counting a column.
            reader.bump();
        }
    }

    // Found the position; extend to the end of the line for context.
    loop {
        let save = reader.cur();
        if try_match_newline(&mut reader) {
            reader.set(save);
            break;
        }
        if reader.is_eof() {
            break;
        }
        reader.bump();
    }

    let context = reader.slice(line_start, reader.cur());
    ErrorLocation {
        line,
        column,
        context: String::from_utf8_lossy(context).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_at(input: &[u8], offset: usize) -> Cursor {
        let mut reader = Reader::new(input);
        reader.bump_by(offset);
        reader.cur()
    }

    #[test]
    fn first_line() {
        let input = b"hello\nworld";
        let loc = locate(input, cursor_at(input, 2));
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 3);
        assert_eq!(loc.context, "hello");
    }

    #[test]
    fn second_line_after_crlf() {
        let input = b"one\r\ntwo";
        let loc = locate(input, cursor_at(input, 6));
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 2);
        assert_eq!(loc.context, "two");
    }

    #[test]
    fn lone_carriage_return_is_not_a_newline() {
        let input = b"ab\rcd";
        let loc = locate(input, cursor_at(input, 4));
        // The bare \r stays on line 1 and counts as a column.
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 5);
        assert_eq!(loc.context, "ab\rcd");
    }

    #[test]
    fn multibyte_code_points_count_one_column() {
        let input = "héllo".as_bytes();
        // Position of the second 'l': h(1) é(2) l(3) -> l at column 4.
        let loc = locate(input, cursor_at(input, 4));
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 4);
    }

    #[test]
    fn invalid_code_unit_does_not_count() {
        let input = b"line1\nli\x00e2";
        // \x00 is a valid (NUL) code point; use a truly invalid byte.
        let input2 = b"line1\nli\xFFe2";
        let loc = locate(input2, cursor_at(input2, 8));
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
        // Past the invalid byte, the column counter has not moved.
        let after = locate(input2, cursor_at(input2, 9));
        assert_eq!(after.line, 2);
        assert_eq!(after.column, 3);
        // The NUL variant still locates on line 2.
        let nul = locate(input, cursor_at(input, 8));
        assert_eq!(nul.line, 2);
        assert_eq!(nul.column, 3);
    }

    #[test]
    fn out_of_bounds_reports_end_of_input() {
        let input = b"ab\ncd";
        let mut reader = Reader::new(b"ab\ncdXX");
        reader.bump_by(7);
        let loc = locate(input, reader.cur());
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
        assert_eq!(loc.context, "cd");
    }
}
