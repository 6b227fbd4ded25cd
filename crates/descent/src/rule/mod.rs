//! # Rule Module
//!
//! The immutable rule tree grammars are composed from.
//!
//! ## Overview
//!
//! A [`Rule`] is one node in a composition tree: a literal, a predicate,
//! a sequence, an ordered choice, a repetition, a context-stack
//! operation, or a reference to a named production. Rule trees are built
//! once, own no mutable state, and are reused across unboundedly many
//! parse attempts; all per-attempt state lives in
//! [`Context`](crate::context::Context) and the reader cursor.
//!
//! ## Composition
//!
//! Three operators combine rules, flattening as they go:
//!
//! - `a + b`: sequence; fails where either operand fails
//! - `a | b`: ordered choice; operands must expose a branch condition,
//!   and once an operand's condition matches the choice commits to it
//! - `a / b`: alternative set; a flat OR of pure conditions,
//!   `(a / b) / c` is the same set as `a / b / c`
//!
//! Everything else is a named constructor: [`peek`], [`peek_not`],
//! [`loop_`], [`break_`], [`context_push`], [`context_pop`], [`p`],
//! [`recurse`], [`combination`], [`terminator`], [`brackets`], and
//! friends.
//!
//! ## Branch conditions
//!
//! A rule usable as a choice operand exposes a cheap, side-effect-free
//! pre-test. Atomic rules and alternative sets are branches; a sequence
//! inherits the branch condition of its first element, so
//! `lit("=") + rest` can head a choice arm. Production references made
//! with [`p`] propagate the production's own condition outward;
//! [`recurse`] references do not, which is the price of late binding.

use compact_str::CompactString;

use crate::context::SlotComparator;

pub mod terminator;

pub use terminator::{brackets, sep, terminator, trailing_sep, Brackets, Separator, Terminator};

/// Byte-level predicate for character-class rules.
pub type BytePredicate = fn(u8) -> bool;

/// Code-point-level predicate for character-class rules.
pub type CharPredicate = fn(char) -> bool;

/// Whether a separated list accepts a separator after its last item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingSeparator {
    /// A separator with nothing following it is a hard failure.
    #[default]
    Forbid,
    /// A trailing separator is legal and consumed.
    Allow,
}

/// An immutable node in a grammar's composition tree.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Matches the literal code units exactly.
    Lit(CompactString),
    /// Matches one code unit satisfying a predicate.
    ByteIf {
        /// Display name used in errors.
        name: CompactString,
        /// The predicate.
        pred: BytePredicate,
    },
    /// Matches one decoded code point satisfying a predicate.
    CodePointIf {
        /// Display name used in errors.
        name: CompactString,
        /// The predicate.
        pred: CharPredicate,
    },
    /// Consumes all remaining input; never fails.
    Any,
    /// Matches only at end of input.
    Eof,
    /// Zero-width; produces a [`Value::Id`](crate::value::Value::Id).
    Id(u16),
    /// Zero-width; always fails with an author-defined error tag.
    Fail(CompactString),
    /// Runs the inner rule and additionally produces the lexeme it
    /// consumed.
    Capture(Box<Rule>),
    /// Runs child rules in order; no backtracking between them.
    Seq(Vec<Rule>),
    /// Ordered, committing choice over branch operands.
    Choice(Vec<Rule>),
    /// Flat alternative set of pure conditions.
    Alt(Vec<Rule>),
    /// Zero-width condition: succeeds iff the inner rule would match.
    Peek(Box<Rule>),
    /// Zero-width condition: succeeds iff the inner rule would not match.
    PeekNot(Box<Rule>),
    /// Unconditional branch wrapper for a final choice arm.
    Else(Box<Rule>),
    /// Repeats the body until a nested `break_` runs.
    Loop(Box<Rule>),
    /// Ends the innermost enclosing `loop_`; always succeeds.
    Break,
    /// Runs the pattern and pushes its lexeme onto the context stack.
    ContextPush(Box<Rule>),
    /// Runs the pattern and pops the top slot if the comparator accepts.
    ContextPop {
        /// The pattern to re-run at the current cursor.
        pattern: Box<Rule>,
        /// How to compare the fresh lexeme against the top slot.
        comparator: SlotComparator,
    },
    /// Like `ContextPop` but leaves the slot in place.
    ContextTop {
        /// The pattern to re-run at the current cursor.
        pattern: Box<Rule>,
        /// How to compare the fresh lexeme against the top slot.
        comparator: SlotComparator,
    },
    /// Unconditionally discards the top slot.
    ContextDrop,
    /// Reference to an already-defined production; propagates its branch
    /// condition.
    Production(CompactString),
    /// Late-bound production reference; resolved no earlier than first
    /// use, exposing no branch condition.
    Recurse(CompactString),
    /// Matches every member exactly once, in any order.
    Combination {
        /// The member rules; each must be a branch.
        members: Vec<Rule>,
        /// Partial mode stops (successfully) once no member matches
        /// instead of failing with `exhausted_choice`.
        partial: bool,
    },
    /// Repeats the body until the terminator matches; consumes the
    /// terminator.
    While {
        /// The closing delimiter.
        term: Box<Rule>,
        /// The repeated body.
        body: Box<Rule>,
        /// Require at least one body occurrence before the first
        /// terminator check.
        at_least_one: bool,
    },
    /// An optional single occurrence before the mandatory terminator.
    OptTerm {
        /// The closing delimiter.
        term: Box<Rule>,
        /// The optional body.
        body: Box<Rule>,
    },
    /// A terminator-delimited list, with or without separators.
    ListTerm {
        /// The closing delimiter.
        term: Box<Rule>,
        /// The repeated item.
        item: Box<Rule>,
        /// The separator between items, if any.
        sep: Option<Box<Rule>>,
        /// Trailing-separator policy.
        trailing: TrailingSeparator,
        /// Allow zero items.
        allow_empty: bool,
    },
}

impl Rule {
    /// Whether this rule's branch condition is trivially true, so a
    /// choice takes it without a pre-test. Only legal as the final
    /// operand.
    #[must_use]
    pub fn is_unconditional(&self) -> bool {
        matches!(self, Self::Else(_) | Self::Any | Self::Fail(_))
    }
}

// The composition operators flatten: combining two sets (or a set with
// a bare rule) extends one flat node instead of nesting.

impl std::ops::Add for Rule {
    type Output = Rule;

    fn add(self, rhs: Rule) -> Rule {
        match (self, rhs) {
            (Rule::Seq(mut lhs), Rule::Seq(rhs)) => {
                lhs.extend(rhs);
                Rule::Seq(lhs)
            }
            (Rule::Seq(mut lhs), rhs) => {
                lhs.push(rhs);
                Rule::Seq(lhs)
            }
            (lhs, Rule::Seq(mut rhs)) => {
                rhs.insert(0, lhs);
                Rule::Seq(rhs)
            }
            (lhs, rhs) => Rule::Seq(vec![lhs, rhs]),
        }
    }
}

impl std::ops::BitOr for Rule {
    type Output = Rule;

    fn bitor(self, rhs: Rule) -> Rule {
        match (self, rhs) {
            (Rule::Choice(mut lhs), Rule::Choice(rhs)) => {
                lhs.extend(rhs);
                Rule::Choice(lhs)
            }
            (Rule::Choice(mut lhs), rhs) => {
                lhs.push(rhs);
                Rule::Choice(lhs)
            }
            (lhs, Rule::Choice(mut rhs)) => {
                rhs.insert(0, lhs);
                Rule::Choice(rhs)
            }
            (lhs, rhs) => Rule::Choice(vec![lhs, rhs]),
        }
    }
}

impl std::ops::Div for Rule {
    type Output = Rule;

    fn div(self, rhs: Rule) -> Rule {
        match (self, rhs) {
            (Rule::Alt(mut lhs), Rule::Alt(rhs)) => {
                lhs.extend(rhs);
                Rule::Alt(lhs)
            }
            (Rule::Alt(mut lhs), rhs) => {
                lhs.push(rhs);
                Rule::Alt(lhs)
            }
            (lhs, Rule::Alt(mut rhs)) => {
                rhs.insert(0, lhs);
                Rule::Alt(rhs)
            }
            (lhs, rhs) => Rule::Alt(vec![lhs, rhs]),
        }
    }
}

/// Matches the literal text exactly.
pub fn lit(text: impl Into<CompactString>) -> Rule {
    Rule::Lit(text.into())
}

/// Matches one code unit satisfying `pred`; `name` shows up in errors.
pub fn byte_if(name: impl Into<CompactString>, pred: BytePredicate) -> Rule {
    Rule::ByteIf {
        name: name.into(),
        pred,
    }
}

/// Matches one decoded code point satisfying `pred`.
pub fn code_point_if(name: impl Into<CompactString>, pred: CharPredicate) -> Rule {
    Rule::CodePointIf {
        name: name.into(),
        pred,
    }
}

/// Consumes everything up to end of input; never fails.
#[must_use]
pub fn any() -> Rule {
    Rule::Any
}

/// Matches only at end of input.
#[must_use]
pub fn eof() -> Rule {
    Rule::Eof
}

/// Zero-width marker value, useful for counting which arms matched.
#[must_use]
pub fn id(value: u16) -> Rule {
    Rule::Id(value)
}

/// Always fails with an author-defined error tag.
pub fn error(tag: impl Into<CompactString>) -> Rule {
    Rule::Fail(tag.into())
}

/// Produces the lexeme the inner rule consumed, ahead of the inner
/// rule's own values.
#[must_use]
pub fn capture(rule: Rule) -> Rule {
    Rule::Capture(Box::new(rule))
}

/// Zero-width test that the rule would match here; the cursor is
/// restored even on success.
#[must_use]
pub fn peek(rule: Rule) -> Rule {
    Rule::Peek(Box::new(rule))
}

/// Zero-width test that the rule would *not* match here; raises
/// `unexpected` when violated.
#[must_use]
pub fn peek_not(rule: Rule) -> Rule {
    Rule::PeekNot(Box::new(rule))
}

/// Marks a rule as the unconditional default arm of a choice.
#[must_use]
pub fn else_(rule: Rule) -> Rule {
    Rule::Else(Box::new(rule))
}

/// Repeats the body until a nested [`break_`] runs.
///
/// The loop has no other termination condition: a body that neither
/// breaks nor consumes input does not terminate.
#[must_use]
pub fn loop_(body: Rule) -> Rule {
    Rule::Loop(Box::new(body))
}

/// Ends the innermost enclosing [`loop_`]; the rest of the body is
/// skipped.
#[must_use]
pub fn break_() -> Rule {
    Rule::Break
}

/// Runs the pattern and pushes the lexeme it matched onto the context
/// stack.
#[must_use]
pub fn context_push(pattern: Rule) -> Rule {
    Rule::ContextPush(Box::new(pattern))
}

/// Re-runs the pattern and pops the top slot if the captured lengths
/// agree (the default comparator).
#[must_use]
pub fn context_pop(pattern: Rule) -> Rule {
    context_pop_with(pattern, SlotComparator::default())
}

/// [`context_pop`] with an explicit comparator.
#[must_use]
pub fn context_pop_with(pattern: Rule, comparator: SlotComparator) -> Rule {
    Rule::ContextPop {
        pattern: Box::new(pattern),
        comparator,
    }
}

/// Like [`context_pop`] but leaves the slot on the stack, so a
/// still-open construct can be re-checked.
#[must_use]
pub fn context_top(pattern: Rule) -> Rule {
    context_top_with(pattern, SlotComparator::default())
}

/// [`context_top`] with an explicit comparator.
#[must_use]
pub fn context_top_with(pattern: Rule, comparator: SlotComparator) -> Rule {
    Rule::ContextTop {
        pattern: Box::new(pattern),
        comparator,
    }
}

/// Unconditionally discards the top slot. Running it on an empty stack
/// is a precondition violation and panics.
#[must_use]
pub fn context_drop() -> Rule {
    Rule::ContextDrop
}

/// References a production that must already be defined when the
/// referencing production is added, so its branch condition propagates.
pub fn p(name: impl Into<CompactString>) -> Rule {
    Rule::Production(name.into())
}

/// References a production that only needs to be *defined by build
/// time*, allowing direct or mutual recursion. Exposes no branch
/// condition.
pub fn recurse(name: impl Into<CompactString>) -> Rule {
    Rule::Recurse(name.into())
}

/// Matches every member exactly once, in any order; a member matching a
/// second time fails with `combination_duplicate`.
pub fn combination(members: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Combination {
        members: members.into_iter().collect(),
        partial: false,
    }
}

/// Like [`combination`], but stops successfully once no member matches,
/// so any subset (including none) is accepted.
pub fn partial_combination(members: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Combination {
        members: members.into_iter().collect(),
        partial: true,
    }
}
