//! # Descent
//!
//! A grammar-combinator engine: build recursive-descent parsers by
//! composing small, reusable rule objects into full grammars, then run
//! them against a byte stream to produce typed values or structured
//! errors.
//!
//! ## Overview
//!
//! Descent provides the composition and execution core for
//! backtracking-aware parsing without a separate grammar-generation
//! step:
//!
//! - **Rule composition**: literals, predicates, sequence (`+`), ordered
//!   choice (`|`), alternative sets (`/`), peek/peek-not, loops
//! - **Branch & commit**: choices pre-test operands without consuming
//!   input and commit to the first condition that holds
//! - **Context stack**: push/pop/top/drop slot matching for balanced
//!   constructs (an opening tag name must equal the closing one)
//! - **Productions**: named, possibly recursive grammar entry points
//!   with private per-attempt state
//! - **Terminator-driven repetition**: `while_`, `opt`, `list`,
//!   `opt_list`, with separators and trailing-separator policy
//! - **Structured errors**: one tagged error per failed parse, with
//!   optional line/column/context recovery
//!
//! ## Quick Start
//!
//! A comma-separated list of names in parentheses:
//!
//! ```rust
//! use descent::grammar::Grammar;
//! use descent::rule::{brackets, byte_if, capture, lit, sep};
//!
//! let name = capture(byte_if("letter", |b| b.is_ascii_alphabetic()));
//! let parens = brackets(lit("("), lit(")"));
//!
//! let grammar = Grammar::builder()
//!     .production("names", parens.list_sep(name, sep(lit(","))))
//!     .entry_point("names")
//!     .build()
//!     .expect("grammar is well formed");
//!
//! let value = grammar.parse_str("(a,b,c)").expect("input matches");
//! let items = value.expect("a list is produced");
//! assert_eq!(items.as_list().map(<[_]>::len), Some(3));
//! ```
//!
//! Failed parses return exactly one [`error::ParseError`]; feed its
//! position to [`error::locate`] to recover a line, column, and source
//! line for display.

pub mod context;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod input;
pub mod rule;
pub mod value;

pub use context::{Context, SlotComparator};
pub use engine::Parser;
pub use error::{locate, ErrorLocation, ParseError};
pub use grammar::{Grammar, GrammarBuilder, GrammarError, Production};
pub use input::{Cursor, Reader};
pub use rule::Rule;
pub use value::Value;
