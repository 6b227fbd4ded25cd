//! # Grammar Module
//!
//! Named productions, the grammar registry, and build-time validation.
//!
//! ## Overview
//!
//! A [`Grammar`] is an immutable registry of [`Production`]s plus an
//! entry point. Productions are named grammar entry points: each owns
//! one rule tree and an optional value-construction step, runs against
//! its own private context stack, and may reference other productions,
//! or itself, by name.
//!
//! Two reference forms exist, mirroring the two resolution disciplines:
//!
//! - [`p`](crate::rule::p) demands the target already be defined when
//!   the referencing production is added, so the engine can propagate
//!   the target's branch condition outward (e.g. `peek(p("value"))`, or
//!   `p("value")` as a non-final choice operand).
//! - [`recurse`](crate::rule::recurse) defers resolution to the registry
//!   lookup at run time; it only needs the target to exist by
//!   [`GrammarBuilder::build`], which is what permits direct and mutual
//!   recursion, at the cost of exposing no branch condition.
//!
//! ## Usage
//!
//! ```rust
//! use descent::grammar::Grammar;
//! use descent::rule::{byte_if, capture, lit, p, recurse};
//!
//! let digit = capture(byte_if("digit", |b| b.is_ascii_digit()));
//! let grammar = Grammar::builder()
//!     .production("atom", digit)
//!     .production("value", p("atom") | lit("(") + recurse("value") + lit(")"))
//!     .entry_point("value")
//!     .build()
//!     .expect("grammar is well formed");
//! assert!(grammar.parse_str("((7))").is_ok());
//! ```

use compact_str::CompactString;
use hashbrown::HashMap;
use thiserror::Error;

use crate::engine::Parser;
use crate::error::ParseError;
use crate::rule::Rule;
use crate::value::{Construct, Value};

pub(crate) mod validate;

pub(crate) type ProductionMap = HashMap<CompactString, Production, ahash::RandomState>;

/// A named grammar entry point: one rule tree plus an optional
/// value-construction step.
#[derive(Debug, Clone)]
pub struct Production {
    rule: Rule,
    construct: Option<Construct>,
}

impl Production {
    pub(crate) fn rule(&self) -> &Rule {
        &self.rule
    }

    pub(crate) fn construct(&self) -> Option<Construct> {
        self.construct
    }
}

/// An error detected while building a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A production name was defined twice.
    #[error("duplicate production `{0}`")]
    Duplicate(CompactString),

    /// A `p` reference targeted a production that was not yet defined.
    #[error(
        "production `{referenced}` must be defined before `{within}` references it; \
         use `recurse` for forward or self references"
    )]
    ForwardReference {
        /// The production containing the reference.
        within: CompactString,
        /// The reference's target.
        referenced: CompactString,
    },

    /// A reference targeted a production that is not defined at all.
    #[error("undefined production `{0}`")]
    Undefined(CompactString),

    /// No entry point was set.
    #[error("no entry point set")]
    MissingEntry,

    /// The entry point names an undefined production.
    #[error("entry production `{0}` is not defined")]
    UndefinedEntry(CompactString),

    /// A `break_` appears outside any `loop_`.
    #[error("`break_` outside `loop_` in production `{0}`")]
    BreakOutsideLoop(CompactString),

    /// A choice operand exposes no branch condition.
    #[error(
        "operand {index} of a choice in production `{production}` exposes no branch condition"
    )]
    NonBranchOperand {
        /// The containing production.
        production: CompactString,
        /// The operand's position.
        index: usize,
    },

    /// An unconditional choice operand is not the last one.
    #[error(
        "operand {index} of a choice in production `{production}` is unconditional but not \
         last; later operands are unreachable"
    )]
    UnreachableOperand {
        /// The containing production.
        production: CompactString,
        /// The operand's position.
        index: usize,
    },

    /// A combination member exposes no branch condition.
    #[error(
        "member {index} of a combination in production `{production}` exposes no branch \
         condition"
    )]
    NonBranchMember {
        /// The containing production.
        production: CompactString,
        /// The member's position.
        index: usize,
    },

    /// A terminator rule exposes no branch condition.
    #[error("a terminator in production `{0}` exposes no branch condition")]
    NonBranchTerminator(CompactString),
}

/// An immutable registry of productions with an entry point.
///
/// Grammars are built once via [`GrammarBuilder`], validated, and then
/// shared freely across parse attempts; nothing in a grammar mutates at
/// parse time.
#[derive(Debug, Clone)]
pub struct Grammar {
    productions: ProductionMap,
    entry: CompactString,
}

impl Grammar {
    /// Starts building a grammar.
    #[must_use]
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    /// The entry production's name.
    #[must_use]
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Whether a production with this name is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.productions.contains_key(name)
    }

    pub(crate) fn production(&self, name: &str) -> Option<&Production> {
        self.productions.get(name)
    }

    pub(crate) fn is_branch(&self, rule: &Rule) -> bool {
        validate::is_branch(rule, &self.productions)
    }

    /// Parses input bytes from the entry production.
    ///
    /// # Errors
    ///
    /// Returns the first committed failure as a [`ParseError`].
    pub fn parse(&self, input: &[u8]) -> Result<Option<Value>, ParseError> {
        Parser::new(self).parse(input)
    }

    /// Parses string input from the entry production.
    ///
    /// # Errors
    ///
    /// Returns the first committed failure as a [`ParseError`].
    pub fn parse_str(&self, input: &str) -> Result<Option<Value>, ParseError> {
        self.parse(input.as_bytes())
    }
}

/// Builds a [`Grammar`], deferring all reported problems to
/// [`GrammarBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    productions: ProductionMap,
    entry: Option<CompactString>,
    errors: Vec<GrammarError>,
}

impl GrammarBuilder {
    /// Sets the production a plain parse starts from.
    #[must_use]
    pub fn entry_point(mut self, name: impl Into<CompactString>) -> Self {
        self.entry = Some(name.into());
        self
    }

    /// Adds a production without a value-construction step; its values
    /// fold with the default (void, single value, or list).
    #[must_use]
    pub fn production(self, name: impl Into<CompactString>, rule: Rule) -> Self {
        self.insert(name.into(), rule, None)
    }

    /// Adds a production with an explicit value-construction step.
    #[must_use]
    pub fn production_with(
        self,
        name: impl Into<CompactString>,
        rule: Rule,
        construct: Construct,
    ) -> Self {
        self.insert(name.into(), rule, Some(construct))
    }

    fn insert(mut self, name: CompactString, rule: Rule, construct: Option<Construct>) -> Self {
        if self.productions.contains_key(name.as_str()) {
            self.errors.push(GrammarError::Duplicate(name));
            return self;
        }
        // `p` references must already be resolvable here; this is what
        // lets a defined production's branch condition propagate through
        // the reference.
        for referenced in validate::eager_references(&rule) {
            if !self.productions.contains_key(referenced.as_str()) {
                self.errors.push(GrammarError::ForwardReference {
                    within: name.clone(),
                    referenced: referenced.clone(),
                });
            }
        }
        self.productions
            .insert(name, Production { rule, construct });
        self
    }

    /// Validates and freezes the grammar.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: duplicate or forward references,
    /// a missing entry point, `break_` outside `loop_`, or choice,
    /// combination, and terminator operands that cannot back a branch
    /// decision.
    pub fn build(mut self) -> Result<Grammar, GrammarError> {
        let entry = match self.entry {
            Some(entry) => {
                if !self.productions.contains_key(entry.as_str()) {
                    self.errors.push(GrammarError::UndefinedEntry(entry.clone()));
                }
                entry
            }
            None => {
                self.errors.push(GrammarError::MissingEntry);
                CompactString::default()
            }
        };
        self.errors.extend(validate::validate(&self.productions));
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }
        Ok(Grammar {
            productions: self.productions,
            entry,
        })
    }
}
