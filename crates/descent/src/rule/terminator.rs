//! Terminator-driven repetition and bracketing.
//!
//! A [`Terminator`] wraps the branch rule that closes a repeated or
//! optional construct and derives the loop around it: `while_`, `opt`,
//! `list`, `opt_list`. Every derived rule consumes the terminator
//! itself, which is what makes [`brackets`]-style composition work: the
//! closing bracket *is* the terminator.

use super::{Rule, TrailingSeparator};

/// A separator between list items, with its trailing policy.
#[derive(Debug, Clone)]
pub struct Separator {
    pub(crate) rule: Rule,
    pub(crate) trailing: TrailingSeparator,
}

/// A plain separator: a separator with nothing following it is a hard
/// failure.
#[must_use]
pub fn sep(rule: Rule) -> Separator {
    Separator {
        rule,
        trailing: TrailingSeparator::Forbid,
    }
}

/// A separator that is also legal (and consumed) after the final item.
#[must_use]
pub fn trailing_sep(rule: Rule) -> Separator {
    Separator {
        rule,
        trailing: TrailingSeparator::Allow,
    }
}

/// Derives repetition rules from a closing-delimiter branch rule.
#[derive(Debug, Clone)]
pub struct Terminator {
    term: Rule,
}

/// Creates a [`Terminator`] from a branch rule.
#[must_use]
pub fn terminator(term: Rule) -> Terminator {
    Terminator { term }
}

impl Terminator {
    /// The terminator alone.
    #[must_use]
    pub fn terminator(&self) -> Rule {
        self.term.clone()
    }

    /// The rule followed by the terminator.
    #[must_use]
    pub fn then(&self, rule: Rule) -> Rule {
        rule + self.term.clone()
    }

    /// Repeats the rule as long as the terminator isn't matched, then
    /// consumes the terminator.
    #[must_use]
    pub fn while_(&self, body: Rule) -> Rule {
        Rule::While {
            term: Box::new(self.term.clone()),
            body: Box::new(body),
            at_least_one: false,
        }
    }

    /// Like [`Terminator::while_`] but requires at least one occurrence;
    /// fails if the terminator matches immediately.
    #[must_use]
    pub fn while_one(&self, body: Rule) -> Rule {
        Rule::While {
            term: Box::new(self.term.clone()),
            body: Box::new(body),
            at_least_one: true,
        }
    }

    /// An optional single occurrence of the rule, then the terminator.
    #[must_use]
    pub fn opt(&self, body: Rule) -> Rule {
        Rule::OptTerm {
            term: Box::new(self.term.clone()),
            body: Box::new(body),
        }
    }

    /// One or more occurrences of the item, then the terminator.
    #[must_use]
    pub fn list(&self, item: Rule) -> Rule {
        Rule::ListTerm {
            term: Box::new(self.term.clone()),
            item: Box::new(item),
            sep: None,
            trailing: TrailingSeparator::Forbid,
            allow_empty: false,
        }
    }

    /// One or more separated occurrences of the item, then the
    /// terminator.
    #[must_use]
    pub fn list_sep(&self, item: Rule, separator: Separator) -> Rule {
        Rule::ListTerm {
            term: Box::new(self.term.clone()),
            item: Box::new(item),
            sep: Some(Box::new(separator.rule)),
            trailing: separator.trailing,
            allow_empty: false,
        }
    }

    /// Zero or more occurrences of the item, then the terminator.
    #[must_use]
    pub fn opt_list(&self, item: Rule) -> Rule {
        Rule::ListTerm {
            term: Box::new(self.term.clone()),
            item: Box::new(item),
            sep: None,
            trailing: TrailingSeparator::Forbid,
            allow_empty: true,
        }
    }

    /// Zero or more separated occurrences of the item, then the
    /// terminator.
    #[must_use]
    pub fn opt_list_sep(&self, item: Rule, separator: Separator) -> Rule {
        Rule::ListTerm {
            term: Box::new(self.term.clone()),
            item: Box::new(item),
            sep: Some(Box::new(separator.rule)),
            trailing: separator.trailing,
            allow_empty: true,
        }
    }
}

/// A pair of delimiters; the closing one doubles as the terminator for
/// whatever is derived inside.
#[derive(Debug, Clone)]
pub struct Brackets {
    open: Rule,
    term: Terminator,
}

/// Creates a [`Brackets`] pair from opening and closing branch rules.
#[must_use]
pub fn brackets(open: Rule, close: Rule) -> Brackets {
    Brackets {
        open,
        term: terminator(close),
    }
}

impl Brackets {
    /// The opening delimiter alone.
    #[must_use]
    pub fn open(&self) -> Rule {
        self.open.clone()
    }

    /// The closing delimiter alone.
    #[must_use]
    pub fn close(&self) -> Rule {
        self.term.terminator()
    }

    /// The rule surrounded by the brackets.
    #[must_use]
    pub fn then(&self, rule: Rule) -> Rule {
        self.open.clone() + self.term.then(rule)
    }

    /// `while_` of the body inside the brackets.
    #[must_use]
    pub fn while_(&self, body: Rule) -> Rule {
        self.open.clone() + self.term.while_(body)
    }

    /// An optional body inside the brackets.
    #[must_use]
    pub fn opt(&self, body: Rule) -> Rule {
        self.open.clone() + self.term.opt(body)
    }

    /// A non-empty list inside the brackets.
    #[must_use]
    pub fn list(&self, item: Rule) -> Rule {
        self.open.clone() + self.term.list(item)
    }

    /// A non-empty separated list inside the brackets.
    #[must_use]
    pub fn list_sep(&self, item: Rule, separator: Separator) -> Rule {
        self.open.clone() + self.term.list_sep(item, separator)
    }

    /// A possibly-empty list inside the brackets.
    #[must_use]
    pub fn opt_list(&self, item: Rule) -> Rule {
        self.open.clone() + self.term.opt_list(item)
    }

    /// A possibly-empty separated list inside the brackets.
    #[must_use]
    pub fn opt_list_sep(&self, item: Rule, separator: Separator) -> Rule {
        self.open.clone() + self.term.opt_list_sep(item, separator)
    }
}
