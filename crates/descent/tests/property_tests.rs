//! Property-based tests: random inputs against the behavioral
//! guarantees the engine makes (lookahead purity, permutation
//! independence, location recovery).

use proptest::prelude::*;

use descent::error::locate;
use descent::grammar::Grammar;
use descent::input::Reader;
use descent::rule::{any, brackets, capture, combination, eof, lit, peek, sep, Rule};
use descent::value::Value;

fn single(rule: Rule) -> Grammar {
    Grammar::builder()
        .production("start", rule)
        .entry_point("start")
        .build()
        .expect("grammar should build")
}

fn lexemes(value: &Value) -> Vec<String> {
    value
        .as_list()
        .expect("expected a list value")
        .iter()
        .map(|item| item.as_lexeme().expect("expected a lexeme").to_owned())
        .collect()
}

proptest! {
    #[test]
    fn peek_never_consumes(prefix in "[a-z]{1,8}", suffix in "[a-z]{0,8}") {
        let input = format!("{prefix}{suffix}");
        let grammar = single(peek(lit(prefix.as_str())) + capture(any()));
        let value = grammar
            .parse_str(&input)
            .expect("prefix is present")
            .expect("capture produces a value");
        // Whatever the peek looked at is still there afterwards.
        prop_assert_eq!(value.as_lexeme(), Some(input.as_str()));
    }

    #[test]
    fn combination_accepts_every_permutation(
        perm in Just(vec!["a", "b", "c", "d"]).prop_shuffle()
    ) {
        let members = ["a", "b", "c", "d"].map(|m| capture(lit(m)));
        let grammar = single(combination(members) + eof());
        let input: String = perm.concat();
        let value = grammar
            .parse_str(&input)
            .expect("every permutation matches")
            .expect("combination produces a list");
        // Values arrive in match order, i.e. the permutation itself.
        prop_assert_eq!(lexemes(&value), perm);
    }

    #[test]
    fn separated_list_produces_one_value_per_item(count in 1usize..20) {
        let parens = brackets(lit("("), lit(")"));
        let item = capture(lit("a"));
        let grammar = single(parens.list_sep(item, sep(lit(","))) + eof());
        let input = format!("({})", vec!["a"; count].join(","));
        let value = grammar
            .parse_str(&input)
            .expect("well-formed list")
            .expect("list produces a value");
        prop_assert_eq!(value.as_list().map(<[_]>::len), Some(count));
    }

    #[test]
    fn located_positions_agree_with_a_direct_scan(
        (text, offset) in "[a-z\\n]{0,40}".prop_flat_map(|text| {
            let len = text.len();
            (Just(text), 0..=len)
        })
    ) {
        let bytes = text.as_bytes();
        let mut reader = Reader::new(bytes);
        reader.bump_by(offset);
        let loc = locate(bytes, reader.cur());

        // ASCII-only input, so code points and code units coincide.
        let prefix = &text[..offset];
        let expected_line = prefix.matches('\n').count() + 1;
        let line_start = prefix.rfind('\n').map_or(0, |pos| pos + 1);
        let expected_column = offset - line_start + 1;

        prop_assert_eq!(loc.line, expected_line);
        prop_assert_eq!(loc.column, expected_column);

        // The context is exactly the line the position falls on.
        let line_end = text[offset..]
            .find('\n')
            .map_or(text.len(), |pos| offset + pos);
        prop_assert_eq!(loc.context, &text[line_start..line_end]);
    }

    #[test]
    fn failed_parses_report_an_in_range_position(input in "[ab]{0,12}") {
        let grammar = single(lit("a") + lit("b") + eof());
        if let Err(err) = grammar.parse_str(&input) {
            prop_assert!(err.position().offset() <= input.len());
        }
    }
}
