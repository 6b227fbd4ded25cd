//! Tests for terminator-driven repetition: `while_`, `opt`, `list`,
//! separators, and bracket composition.

use descent::error::ParseError;
use descent::grammar::Grammar;
use descent::rule::{
    brackets, byte_if, capture, eof, lit, recurse, sep, terminator, trailing_sep, Rule,
};
use descent::value::Value;

fn single(rule: Rule) -> Grammar {
    Grammar::builder()
        .production("start", rule)
        .entry_point("start")
        .build()
        .expect("grammar should build")
}

fn letter() -> Rule {
    capture(byte_if("letter", |b| b.is_ascii_alphabetic()))
}

fn lexemes(value: &Value) -> Vec<&str> {
    value
        .as_list()
        .expect("expected a list value")
        .iter()
        .map(|item| item.as_lexeme().expect("expected a lexeme"))
        .collect()
}

#[test]
fn test_while_consumes_the_terminator() {
    let statement = terminator(lit(";"));
    let grammar = single(statement.while_(lit("a")) + eof());

    assert!(grammar.parse_str(";").is_ok());
    assert!(grammar.parse_str("aaa;").is_ok());

    // The body's own failure surfaces, not a generic repetition error.
    let err = grammar.parse_str("aab;").expect_err("body fails");
    match err {
        ParseError::ExpectedLiteral { at, expected } => {
            assert_eq!(at.offset(), 2);
            assert_eq!(expected, "a");
        }
        other => panic!("expected ExpectedLiteral, got {other:?}"),
    }
}

#[test]
fn test_while_one_requires_a_first_occurrence() {
    let statement = terminator(lit(";"));
    let grammar = single(statement.while_one(lit("a")) + eof());

    assert!(grammar.parse_str("a;").is_ok());

    // The terminator is not even checked before the first body run, so
    // the error is the body's.
    let err = grammar.parse_str(";").expect_err("zero occurrences");
    assert!(matches!(err, ParseError::ExpectedLiteral { .. }));
}

#[test]
fn test_opt_with_a_branch_body() {
    let statement = terminator(lit(";"));
    let grammar = single(statement.opt(letter()) + eof());

    let value = grammar.parse_str("x;").expect("should parse");
    assert_eq!(value.and_then(|v| v.as_lexeme().map(String::from)), Some("x".into()));

    // Absent body: just the terminator, no value.
    let value = grammar.parse_str(";").expect("should parse");
    assert!(value.is_none());
}

#[test]
fn test_opt_with_a_non_branch_body() {
    // A recurse reference exposes no branch condition, so the decision
    // inverts: take the body iff the terminator does not match here.
    let statement = terminator(lit(";"));
    let grammar = Grammar::builder()
        .production("item", letter())
        .production("start", statement.opt(recurse("item")) + eof())
        .entry_point("start")
        .build()
        .expect("grammar should build");

    assert!(grammar.parse_str("x;").is_ok());
    assert!(grammar.parse_str(";").is_ok());
}

#[test]
fn test_then_appends_the_terminator() {
    let statement = terminator(lit(";"));
    let grammar = single(statement.then(lit("return")) + eof());
    assert!(grammar.parse_str("return;").is_ok());
    assert!(grammar.parse_str("return").is_err());
}

#[test]
fn test_list_requires_at_least_one_item() {
    let parens = brackets(lit("("), lit(")"));
    let grammar = single(parens.list(letter()) + eof());

    let value = grammar.parse_str("(ab)").expect("should parse").expect("value");
    assert_eq!(lexemes(&value), ["a", "b"]);

    // An empty list fails with the item's error, exactly where the item
    // was expected.
    let err = grammar.parse_str("()").expect_err("no items");
    match err {
        ParseError::ExpectedCharClass { at, name } => {
            assert_eq!(at.offset(), 1);
            assert_eq!(name, "letter");
        }
        other => panic!("expected ExpectedCharClass, got {other:?}"),
    }
}

#[test]
fn test_opt_list_accepts_empty() {
    let parens = brackets(lit("("), lit(")"));
    let grammar = single(parens.opt_list(letter()) + eof());

    let value = grammar.parse_str("()").expect("should parse").expect("value");
    assert_eq!(value.as_list().map(<[_]>::len), Some(0));
    assert!(grammar.parse_str("(abc)").is_ok());
}

#[test]
fn test_list_with_separator() {
    let parens = brackets(lit("("), lit(")"));
    let grammar = single(parens.list_sep(letter(), sep(lit(","))) + eof());

    let value = grammar.parse_str("(a,b,c)").expect("should parse").expect("value");
    assert_eq!(lexemes(&value), ["a", "b", "c"]);

    // Missing separator between items.
    assert!(grammar.parse_str("(ab)").is_err());
}

#[test]
fn test_plain_separator_forbids_trailing() {
    let parens = brackets(lit("("), lit(")"));
    let grammar = single(parens.list_sep(letter(), sep(lit(","))) + eof());

    // After the trailing comma another item is required, so the error is
    // the item's, at the closing bracket.
    let err = grammar.parse_str("(a,b,)").expect_err("trailing separator");
    match err {
        ParseError::ExpectedCharClass { at, .. } => assert_eq!(at.offset(), 5),
        other => panic!("expected ExpectedCharClass, got {other:?}"),
    }
}

#[test]
fn test_trailing_separator_when_allowed() {
    let parens = brackets(lit("("), lit(")"));
    let grammar = single(parens.list_sep(letter(), trailing_sep(lit(","))) + eof());

    let value = grammar.parse_str("(a,b,)").expect("should parse").expect("value");
    assert_eq!(lexemes(&value), ["a", "b"]);
    // The trailing separator stays optional.
    assert!(grammar.parse_str("(a,b)").is_ok());
}

#[test]
fn test_opt_list_with_separator() {
    let parens = brackets(lit("("), lit(")"));
    let grammar = single(parens.opt_list_sep(letter(), sep(lit(","))) + eof());

    assert!(grammar.parse_str("()").is_ok());
    assert!(grammar.parse_str("(a)").is_ok());
    assert!(grammar.parse_str("(a,b)").is_ok());
}

#[test]
fn test_brackets_open_and_close() {
    let parens = brackets(lit("("), lit(")"));
    let grammar = single(parens.open() + lit("x") + parens.close() + eof());
    assert!(grammar.parse_str("(x)").is_ok());
}

#[test]
fn test_brackets_while_() {
    let parens = brackets(lit("("), lit(")"));
    let grammar = single(parens.while_(lit("a")) + eof());
    assert!(grammar.parse_str("(aaa)").is_ok());
    assert!(grammar.parse_str("()").is_ok());
    assert!(grammar.parse_str("aaa)").is_err());
}

#[test]
fn test_nested_bracketed_lists() {
    let parens = brackets(lit("("), lit(")"));
    let grammar = Grammar::builder()
        .production("element", parens.opt_list(recurse("element")))
        .production("start", descent::rule::p("element") + eof())
        .entry_point("start")
        .build()
        .expect("grammar should build");

    assert!(grammar.parse_str("()").is_ok());
    assert!(grammar.parse_str("(()(()))").is_ok());
    assert!(grammar.parse_str("(()").is_err());
}
