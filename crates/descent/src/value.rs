//! Value boundary between the engine and domain-object construction.
//!
//! Rules produce zero or more [`Value`]s as they run; productions fold
//! their accumulated values through an optional construction step. Turning
//! a [`Value`] into a real domain object stays outside the engine.

use compact_str::CompactString;
use smallvec::SmallVec;

/// A value produced while running a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A captured lexeme. Non-UTF-8 input is captured lossily.
    Lexeme(CompactString),
    /// A zero-width marker produced by an `id` rule.
    Id(u16),
    /// The folded values of a list or combination rule.
    List(Vec<Value>),
}

impl Value {
    /// The lexeme text, if this is a [`Value::Lexeme`].
    #[must_use]
    pub fn as_lexeme(&self) -> Option<&str> {
        match self {
            Self::Lexeme(text) => Some(text),
            _ => None,
        }
    }

    /// The child values, if this is a [`Value::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// A production's value-construction step.
///
/// Receives every value the production's rule produced, in order, and
/// folds them into the single value handed to the caller.
pub type Construct = fn(Vec<Value>) -> Value;

/// Accumulator threaded through rule execution in place of a continuation
/// chain.
pub(crate) type ValueAcc = SmallVec<[Value; 4]>;

/// Default fold for productions without an explicit construction step:
/// zero values stay void, a single value passes through, several become a
/// [`Value::List`].
pub(crate) fn default_fold(mut values: ValueAcc) -> Option<Value> {
    match values.len() {
        0 => None,
        1 => values.pop(),
        _ => Some(Value::List(values.into_vec())),
    }
}

/// Builds a lexeme value from raw input bytes.
pub(crate) fn lexeme(bytes: &[u8]) -> Value {
    Value::Lexeme(CompactString::from(String::from_utf8_lossy(bytes).as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn default_fold_shapes() {
        assert_eq!(default_fold(smallvec![]), None);
        assert_eq!(default_fold(smallvec![Value::Id(1)]), Some(Value::Id(1)));
        assert_eq!(
            default_fold(smallvec![Value::Id(1), Value::Id(2)]),
            Some(Value::List(vec![Value::Id(1), Value::Id(2)]))
        );
    }

    #[test]
    fn lexeme_is_lossy_on_invalid_utf8() {
        let value = lexeme(&[b'a', 0xFF, b'b']);
        assert_eq!(value.as_lexeme(), Some("a\u{FFFD}b"));
    }
}
