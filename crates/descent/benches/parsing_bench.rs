//! Benchmarks for grammar execution: deep recursion, long lists, and
//! choice dispatch.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use descent::grammar::Grammar;
use descent::rule::{brackets, byte_if, capture, else_, eof, lit, p, recurse, sep, Rule};

fn expression_grammar() -> Grammar {
    let digit = capture(byte_if("digit", |b| b.is_ascii_digit()));
    Grammar::builder()
        .production("paren", lit("(") + recurse("expr") + lit(")"))
        .production("expr", p("paren") | digit)
        .entry_point("expr")
        .build()
        .expect("grammar should build")
}

fn list_grammar() -> Grammar {
    let parens = brackets(lit("("), lit(")"));
    let item = capture(byte_if("letter", |b| b.is_ascii_alphabetic()));
    Grammar::builder()
        .production("list", parens.opt_list_sep(item, sep(lit(","))) + eof())
        .entry_point("list")
        .build()
        .expect("grammar should build")
}

fn keyword_grammar() -> Grammar {
    let keywords = ["let", "fn", "if", "else", "while", "for", "return"];
    let word: Rule = keywords
        .iter()
        .map(|kw| lit(*kw))
        .reduce(|choice, kw| choice | kw)
        .expect("at least one keyword")
        | else_(capture(byte_if("letter", |b| b.is_ascii_alphabetic())));
    Grammar::builder()
        .production("word", word)
        .entry_point("word")
        .build()
        .expect("grammar should build")
}

fn bench_deep_recursion(c: &mut Criterion) {
    let grammar = expression_grammar();
    let input = format!("{}7{}", "(".repeat(64), ")".repeat(64));

    c.bench_function("deep_recursion_64", |b| {
        b.iter(|| grammar.parse_str(black_box(&input)).expect("should parse"));
    });
}

fn bench_long_list(c: &mut Criterion) {
    let grammar = list_grammar();
    let input = format!("({})", vec!["x"; 1000].join(","));

    c.bench_function("separated_list_1000", |b| {
        b.iter(|| grammar.parse_str(black_box(&input)).expect("should parse"));
    });
}

fn bench_choice_dispatch(c: &mut Criterion) {
    let grammar = keyword_grammar();

    c.bench_function("choice_dispatch_last_arm", |b| {
        b.iter(|| grammar.parse_str(black_box("return")).expect("should parse"));
    });
    c.bench_function("choice_dispatch_fallback", |b| {
        b.iter(|| grammar.parse_str(black_box("x")).expect("should parse"));
    });
}

criterion_group!(
    benches,
    bench_deep_recursion,
    bench_long_list,
    bench_choice_dispatch
);
criterion_main!(benches);
