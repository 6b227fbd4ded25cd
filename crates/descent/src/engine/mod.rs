//! # Engine Module
//!
//! The recursive-descent evaluator that drives a rule tree against a
//! reader.
//!
//! ## Overview
//!
//! Every rule supports two operations:
//!
//! - a *branch test*: a side-effect-free "would this rule's condition
//!   hold here?", evaluated on probe copies of the reader and the
//!   context, so the real cursor and slot stack are untouched whether it
//!   answers yes or no;
//! - a *run* ([`Machine::run`]): the full parse-and-continue operation
//!   that consumes input, mutates the context, and appends produced
//!   values to the accumulator.
//!
//! That duality is the whole backtracking story. An ordered choice
//! branch-tests its operands left to right on probes; since probes are
//! copies, "restore cursor and context-stack depth on a failed test"
//! falls out for free. Once an operand's test succeeds the choice
//! *commits*: its body runs against the real state and a failure inside
//! it is final, never converted back into "try the next alternative".
//!
//! Values propagate through an explicit accumulator rather than a
//! continuation chain; loop bodies and probes discard theirs.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::context::Context;
use crate::error::ParseError;
use crate::grammar::Grammar;
use crate::input::Reader;
use crate::rule::{Rule, TrailingSeparator};
use crate::value::{self, Value, ValueAcc};

/// Executes a grammar against inputs.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'g> {
    grammar: &'g Grammar,
}

impl<'g> Parser<'g> {
    /// Creates a parser over a built grammar.
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Parses input bytes from the grammar's entry production.
    ///
    /// # Errors
    ///
    /// Returns the first committed failure; a failed parse delivers
    /// exactly one [`ParseError`] with a position.
    pub fn parse(&self, input: &[u8]) -> Result<Option<Value>, ParseError> {
        let mut machine = Machine {
            grammar: self.grammar,
            reader: Reader::new(input),
        };
        machine.run_production(self.grammar.entry())
    }

    /// Parses string input from the grammar's entry production.
    ///
    /// # Errors
    ///
    /// Same as [`Parser::parse`].
    pub fn parse_str(&self, input: &str) -> Result<Option<Value>, ParseError> {
        self.parse(input.as_bytes())
    }
}

/// Signals threaded back through rule execution alongside success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Keep running the enclosing rule.
    Continue,
    /// A `break_` ran; unwind to the innermost enclosing loop.
    Break,
}

/// One parse attempt: the immutable grammar plus the advancing reader.
///
/// `Machine` is `Copy`; a probe is a copy whose mutations die with it.
#[derive(Clone, Copy)]
struct Machine<'g, 'i> {
    grammar: &'g Grammar,
    reader: Reader<'i>,
}

impl<'g, 'i> Machine<'g, 'i> {
    /// Full pattern test: runs the rule on probe copies of reader and
    /// context and reports whether it would succeed. The caller's cursor
    /// and context are left exactly as they were, on both answers.
    fn try_match(&self, rule: &Rule, ctx: &Context) -> bool {
        self.probe(rule, ctx).is_ok()
    }

    /// Branch test: evaluates only the rule's *condition*, the cheap
    /// pre-test a choice commits on. A sequence's condition is its first
    /// element's; a `p` reference propagates the target production's.
    /// Consumes nothing either way.
    fn branch_match(&self, rule: &Rule, ctx: &Context) -> bool {
        match rule {
            Rule::Else(_) | Rule::Any | Rule::Fail(_) => true,
            Rule::Seq(items) => items
                .first()
                .map_or(true, |first| self.branch_match(first, ctx)),
            Rule::Capture(inner) => self.branch_match(inner, ctx),
            Rule::Production(name) => self
                .grammar
                .production(name)
                .is_some_and(|production| self.branch_match(production.rule(), ctx)),
            Rule::PeekNot(inner) => self.probe(inner, ctx).is_err(),
            Rule::Peek(inner) => self.probe(inner, ctx).is_ok(),
            Rule::Alt(members) => members.iter().any(|member| self.try_match(member, ctx)),
            _ => self.try_match(rule, ctx),
        }
    }

    /// Runs the rule on probe copies, reporting the error it would
    /// fail with. Used by `peek`, which surfaces the inner failure.
    fn probe(&self, rule: &Rule, ctx: &Context) -> Result<Flow, ParseError> {
        let mut probe = *self;
        let mut probe_ctx = ctx.clone();
        let mut scratch = ValueAcc::new();
        probe.run(rule, &mut probe_ctx, &mut scratch)
    }

    /// Invokes a production: fresh private context, values folded
    /// through the production's construction step.
    fn invoke(&mut self, name: &str, vals: &mut ValueAcc) -> Result<Flow, ParseError> {
        let production = self
            .grammar
            .production(name)
            .expect("production references are validated at build time");
        let mut child_ctx = Context::new();
        let mut child_vals = ValueAcc::new();
        let flow = self.run(production.rule(), &mut child_ctx, &mut child_vals)?;
        debug_assert!(
            matches!(flow, Flow::Continue),
            "break_ escaped production `{name}`"
        );
        let folded = match production.construct() {
            Some(construct) => Some(construct(child_vals.into_vec())),
            None => value::default_fold(child_vals),
        };
        if let Some(folded) = folded {
            vals.push(folded);
        }
        Ok(Flow::Continue)
    }

    fn run_production(&mut self, name: &str) -> Result<Option<Value>, ParseError> {
        let mut vals = ValueAcc::new();
        self.invoke(name, &mut vals)?;
        Ok(value::default_fold(vals))
    }

    /// The full parse-and-continue operation for one rule.
    #[allow(clippy::too_many_lines)]
    fn run(
        &mut self,
        rule: &Rule,
        ctx: &mut Context,
        vals: &mut ValueAcc,
    ) -> Result<Flow, ParseError> {
        match rule {
            Rule::Lit(expected) => {
                let at = self.reader.cur();
                for &byte in expected.as_bytes() {
                    if self.reader.peek() == Some(byte) {
                        self.reader.bump();
                    } else {
                        return Err(ParseError::ExpectedLiteral {
                            at,
                            expected: expected.clone(),
                        });
                    }
                }
                Ok(Flow::Continue)
            }

            Rule::ByteIf { name, pred } => match self.reader.peek() {
                Some(byte) if pred(byte) => {
                    self.reader.bump();
                    Ok(Flow::Continue)
                }
                _ => Err(ParseError::ExpectedCharClass {
                    at: self.reader.cur(),
                    name: name.clone(),
                }),
            },

            Rule::CodePointIf { name, pred } => match self.reader.peek_code_point() {
                Some((ch, len)) if pred(ch) => {
                    self.reader.bump_by(len);
                    Ok(Flow::Continue)
                }
                _ => Err(ParseError::ExpectedCharClass {
                    at: self.reader.cur(),
                    name: name.clone(),
                }),
            },

            Rule::Any => {
                while self.reader.peek().is_some() {
                    self.reader.bump();
                }
                Ok(Flow::Continue)
            }

            Rule::Eof => {
                if self.reader.is_eof() {
                    Ok(Flow::Continue)
                } else {
                    Err(ParseError::ExpectedEof {
                        at: self.reader.cur(),
                    })
                }
            }

            Rule::Id(id) => {
                vals.push(Value::Id(*id));
                Ok(Flow::Continue)
            }

            Rule::Fail(tag) => Err(ParseError::Custom {
                at: self.reader.cur(),
                tag: tag.clone(),
            }),

            Rule::Capture(inner) => {
                let begin = self.reader.cur();
                let mut inner_vals = ValueAcc::new();
                let flow = self.run(inner, ctx, &mut inner_vals)?;
                vals.push(value::lexeme(self.reader.slice(begin, self.reader.cur())));
                vals.extend(inner_vals);
                Ok(flow)
            }

            Rule::Seq(items) => {
                for item in items {
                    if let Flow::Break = self.run(item, ctx, vals)? {
                        return Ok(Flow::Break);
                    }
                }
                Ok(Flow::Continue)
            }

            Rule::Choice(operands) => {
                for operand in operands {
                    if operand.is_unconditional() || self.branch_match(operand, ctx) {
                        // Commit: a failure inside the body is final.
                        return self.run(operand, ctx, vals);
                    }
                }
                Err(ParseError::ExhaustedChoice {
                    at: self.reader.cur(),
                })
            }

            Rule::Alt(members) => {
                for member in members {
                    if self.try_match(member, ctx) {
                        return self.run(member, ctx, vals);
                    }
                }
                Err(ParseError::ExhaustedAlternatives {
                    at: self.reader.cur(),
                })
            }

            Rule::Peek(inner) => {
                // Succeed or fail with the inner error, consuming nothing.
                self.probe(inner, ctx).map(|_| Flow::Continue)
            }

            Rule::PeekNot(inner) => {
                let begin = self.reader.cur();
                let mut probe = *self;
                let mut probe_ctx = ctx.clone();
                let mut scratch = ValueAcc::new();
                match probe.run(inner, &mut probe_ctx, &mut scratch) {
                    Ok(_) => Err(ParseError::Unexpected {
                        begin,
                        end: probe.reader.cur(),
                    }),
                    Err(_) => Ok(Flow::Continue),
                }
            }

            Rule::Else(body) => self.run(body, ctx, vals),

            Rule::Loop(body) => {
                loop {
                    let mut scratch = ValueAcc::new();
                    if let Flow::Break = self.run(body, ctx, &mut scratch)? {
                        break;
                    }
                }
                Ok(Flow::Continue)
            }

            Rule::Break => Ok(Flow::Break),

            Rule::ContextPush(pattern) => {
                let begin = self.reader.cur();
                let mut scratch = ValueAcc::new();
                let flow = self.run(pattern, ctx, &mut scratch)?;
                let lexeme = self.reader.slice(begin, self.reader.cur());
                ctx.push(lexeme);
                Ok(flow)
            }

            Rule::ContextPop {
                pattern,
                comparator,
            } => {
                let flow = self.context_check(pattern, *comparator, ctx, "context_pop")?;
                ctx.pop();
                Ok(flow)
            }

            Rule::ContextTop {
                pattern,
                comparator,
            } => self.context_check(pattern, *comparator, ctx, "context_top"),

            Rule::ContextDrop => {
                ctx.drop_top();
                Ok(Flow::Continue)
            }

            Rule::Production(name) | Rule::Recurse(name) => self.invoke(name, vals),

            Rule::Combination { members, partial } => {
                let mut seen: SmallVec<[bool; 8]> = SmallVec::from_elem(false, members.len());
                let mut items = ValueAcc::new();
                for _ in 0..members.len() {
                    let begin = self.reader.cur();
                    let matched = members
                        .iter()
                        .position(|member| self.branch_match(member, ctx));
                    match matched {
                        Some(index) if seen[index] => {
                            // Consume the duplicate so the error covers it.
                            let mut scratch = ValueAcc::new();
                            self.run(&members[index], ctx, &mut scratch)?;
                            return Err(ParseError::CombinationDuplicate {
                                begin,
                                end: self.reader.cur(),
                            });
                        }
                        Some(index) => {
                            seen[index] = true;
                            self.run(&members[index], ctx, &mut items)?;
                        }
                        None if *partial => break,
                        None => {
                            return Err(ParseError::ExhaustedChoice {
                                at: self.reader.cur(),
                            });
                        }
                    }
                }
                vals.push(Value::List(items.into_vec()));
                Ok(Flow::Continue)
            }

            Rule::While {
                term,
                body,
                at_least_one,
            } => {
                if *at_least_one {
                    let mut scratch = ValueAcc::new();
                    if let Flow::Break = self.run(body, ctx, &mut scratch)? {
                        return Ok(Flow::Break);
                    }
                }
                loop {
                    if self.branch_match(term, ctx) {
                        let mut scratch = ValueAcc::new();
                        self.run(term, ctx, &mut scratch)?;
                        return Ok(Flow::Continue);
                    }
                    let mut scratch = ValueAcc::new();
                    if let Flow::Break = self.run(body, ctx, &mut scratch)? {
                        return Ok(Flow::Break);
                    }
                }
            }

            Rule::OptTerm { term, body } => {
                let take_body = if self.grammar.is_branch(body) {
                    self.branch_match(body, ctx)
                } else {
                    !self.branch_match(term, ctx)
                };
                if take_body {
                    if let Flow::Break = self.run(body, ctx, vals)? {
                        return Ok(Flow::Break);
                    }
                }
                let mut scratch = ValueAcc::new();
                self.run(term, ctx, &mut scratch)?;
                Ok(Flow::Continue)
            }

            Rule::ListTerm {
                term,
                item,
                sep,
                trailing,
                allow_empty,
            } => {
                let mut items = ValueAcc::new();
                if *allow_empty && self.branch_match(term, ctx) {
                    let mut scratch = ValueAcc::new();
                    self.run(term, ctx, &mut scratch)?;
                    vals.push(Value::List(items.into_vec()));
                    return Ok(Flow::Continue);
                }
                loop {
                    if let Flow::Break = self.run(item, ctx, &mut items)? {
                        return Ok(Flow::Break);
                    }
                    if self.branch_match(term, ctx) {
                        let mut scratch = ValueAcc::new();
                        self.run(term, ctx, &mut scratch)?;
                        break;
                    }
                    if let Some(sep) = sep {
                        let mut scratch = ValueAcc::new();
                        if let Flow::Break = self.run(sep, ctx, &mut scratch)? {
                            return Ok(Flow::Break);
                        }
                        if matches!(trailing, TrailingSeparator::Allow) && self.branch_match(term, ctx)
                        {
                            let mut scratch = ValueAcc::new();
                            self.run(term, ctx, &mut scratch)?;
                            break;
                        }
                    }
                }
                vals.push(Value::List(items.into_vec()));
                Ok(Flow::Continue)
            }
        }
    }

    /// Shared body of `context_pop` and `context_top`: re-run the
    /// pattern at the current cursor and compare its fresh lexeme
    /// against the top slot. The stack is untouched on mismatch.
    fn context_check(
        &mut self,
        pattern: &Rule,
        comparator: crate::context::SlotComparator,
        ctx: &mut Context,
        op: &'static str,
    ) -> Result<Flow, ParseError> {
        let begin = self.reader.cur();
        let mut scratch = ValueAcc::new();
        let flow = self.run(pattern, ctx, &mut scratch)?;
        let fresh = self.reader.slice(begin, self.reader.cur());
        let top = ctx
            .top()
            .unwrap_or_else(|| panic!("{op} on an empty context stack"));
        if comparator.matches(top, fresh) {
            Ok(flow)
        } else {
            Err(ParseError::ContextMismatch {
                at: begin,
                expected: CompactString::from(String::from_utf8_lossy(top).as_ref()),
            })
        }
    }
}
