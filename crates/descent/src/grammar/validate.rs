//! Build-time grammar validation.
//!
//! Walks every production's rule tree once, checking the structural
//! properties the engine assumes at run time: references resolve,
//! `break_` sits inside a `loop_`, and every position that needs a
//! branch decision (choice operands, combination members, terminators)
//! gets a rule that can back one.

use compact_str::CompactString;

use super::{GrammarError, ProductionMap};
use crate::rule::Rule;

/// Whether a rule exposes a branch condition: a cheap pre-test a choice
/// can evaluate without committing.
///
/// A sequence inherits its first element's condition. A `p` reference
/// propagates the target production's condition; `recurse` never does,
/// since late binding is exactly the refusal to look at the target.
pub(crate) fn is_branch(rule: &Rule, productions: &ProductionMap) -> bool {
    match rule {
        Rule::Lit(_)
        | Rule::ByteIf { .. }
        | Rule::CodePointIf { .. }
        | Rule::Any
        | Rule::Eof
        | Rule::Alt(_)
        | Rule::Peek(_)
        | Rule::PeekNot(_)
        | Rule::Else(_) => true,
        Rule::Capture(inner) => is_branch(inner, productions),
        Rule::Seq(items) => items
            .first()
            .is_some_and(|first| is_branch(first, productions)),
        Rule::Production(name) => productions
            .get(name.as_str())
            .is_some_and(|prod| is_branch(prod.rule(), productions)),
        _ => false,
    }
}

/// The `p` references inside a rule, in encounter order. These must be
/// resolvable the moment the containing production is added.
pub(crate) fn eager_references(rule: &Rule) -> Vec<&CompactString> {
    let mut refs = Vec::new();
    collect_eager(rule, &mut refs);
    refs
}

fn collect_eager<'r>(rule: &'r Rule, refs: &mut Vec<&'r CompactString>) {
    match rule {
        Rule::Production(name) => refs.push(name),
        Rule::Capture(inner)
        | Rule::Peek(inner)
        | Rule::PeekNot(inner)
        | Rule::Else(inner)
        | Rule::Loop(inner)
        | Rule::ContextPush(inner)
        | Rule::ContextPop { pattern: inner, .. }
        | Rule::ContextTop { pattern: inner, .. } => collect_eager(inner, refs),
        Rule::Seq(items) | Rule::Choice(items) | Rule::Alt(items) => {
            for item in items {
                collect_eager(item, refs);
            }
        }
        Rule::Combination { members, .. } => {
            for member in members {
                collect_eager(member, refs);
            }
        }
        Rule::While { term, body, .. } | Rule::OptTerm { term, body } => {
            collect_eager(term, refs);
            collect_eager(body, refs);
        }
        Rule::ListTerm {
            term, item, sep, ..
        } => {
            collect_eager(term, refs);
            collect_eager(item, refs);
            if let Some(sep) = sep {
                collect_eager(sep, refs);
            }
        }
        Rule::Lit(_)
        | Rule::ByteIf { .. }
        | Rule::CodePointIf { .. }
        | Rule::Any
        | Rule::Eof
        | Rule::Id(_)
        | Rule::Fail(_)
        | Rule::Break
        | Rule::ContextDrop
        | Rule::Recurse(_) => {}
    }
}

/// Validates every production in the registry, returning all problems
/// found.
pub(crate) fn validate(productions: &ProductionMap) -> Vec<GrammarError> {
    let mut errors = Vec::new();
    for (name, production) in productions {
        walk(production.rule(), name, false, productions, &mut errors);
    }
    errors
}

fn walk(
    rule: &Rule,
    production: &CompactString,
    in_loop: bool,
    productions: &ProductionMap,
    errors: &mut Vec<GrammarError>,
) {
    match rule {
        Rule::Break => {
            if !in_loop {
                errors.push(GrammarError::BreakOutsideLoop(production.clone()));
            }
        }
        Rule::Production(name) | Rule::Recurse(name) => {
            if !productions.contains_key(name.as_str()) {
                errors.push(GrammarError::Undefined(name.clone()));
            }
        }
        Rule::Loop(body) => walk(body, production, true, productions, errors),
        Rule::Choice(operands) => {
            let last = operands.len().saturating_sub(1);
            for (index, operand) in operands.iter().enumerate() {
                if operand.is_unconditional() {
                    if index != last {
                        errors.push(GrammarError::UnreachableOperand {
                            production: production.clone(),
                            index,
                        });
                    }
                } else if !is_branch(operand, productions) {
                    errors.push(GrammarError::NonBranchOperand {
                        production: production.clone(),
                        index,
                    });
                }
                walk(operand, production, in_loop, productions, errors);
            }
        }
        Rule::Combination { members, .. } => {
            for (index, member) in members.iter().enumerate() {
                if !is_branch(member, productions) {
                    errors.push(GrammarError::NonBranchMember {
                        production: production.clone(),
                        index,
                    });
                }
                walk(member, production, in_loop, productions, errors);
            }
        }
        Rule::While { term, body, .. } => {
            if !is_branch(term, productions) {
                errors.push(GrammarError::NonBranchTerminator(production.clone()));
            }
            walk(term, production, in_loop, productions, errors);
            walk(body, production, in_loop, productions, errors);
        }
        Rule::OptTerm { term, body } => {
            if !is_branch(term, productions) {
                errors.push(GrammarError::NonBranchTerminator(production.clone()));
            }
            walk(term, production, in_loop, productions, errors);
            walk(body, production, in_loop, productions, errors);
        }
        Rule::ListTerm {
            term, item, sep, ..
        } => {
            if !is_branch(term, productions) {
                errors.push(GrammarError::NonBranchTerminator(production.clone()));
            }
            walk(term, production, in_loop, productions, errors);
            walk(item, production, in_loop, productions, errors);
            if let Some(sep) = sep {
                walk(sep, production, in_loop, productions, errors);
            }
        }
        Rule::Capture(inner)
        | Rule::Peek(inner)
        | Rule::PeekNot(inner)
        | Rule::Else(inner)
        | Rule::ContextPush(inner)
        | Rule::ContextPop { pattern: inner, .. }
        | Rule::ContextTop { pattern: inner, .. } => {
            walk(inner, production, in_loop, productions, errors);
        }
        Rule::Seq(items) | Rule::Alt(items) => {
            for item in items {
                walk(item, production, in_loop, productions, errors);
            }
        }
        Rule::Lit(_)
        | Rule::ByteIf { .. }
        | Rule::CodePointIf { .. }
        | Rule::Any
        | Rule::Eof
        | Rule::Id(_)
        | Rule::Fail(_)
        | Rule::ContextDrop => {}
    }
}
