//! Local evaluation of predicates against raw records.
//!
//! Used by in-memory fetchers; remote services evaluate the rendered
//! filter themselves. Evaluation is three-valued as in SQL: a comparison
//! involving a null or uncoercible value is unknown, unknown propagates
//! through `Not`, `And` and `Or` follow Kleene logic, and only a definite
//! true selects a record.

use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;

use super::predicate::{ComparisonOp, Literal, Predicate};
use crate::assemble::coerce;
use crate::catalog::DataType;
use crate::fetch::RawRecord;
use crate::result::Value;

impl Predicate {
    /// Evaluate this predicate against one record keyed by field name.
    ///
    /// Compiles LIKE patterns on every call; use [`Predicate::matcher`] to
    /// test many records.
    pub fn matches(&self, record: &RawRecord) -> bool {
        self.matcher().matches(record)
    }

    /// Prepare this predicate for evaluation against many records.
    pub fn matcher(&self) -> Matcher<'_> {
        let mut patterns = HashMap::new();
        collect_patterns(self, &mut patterns);
        Matcher {
            predicate: self,
            patterns,
        }
    }
}

/// A predicate with its LIKE patterns compiled.
#[derive(Debug)]
pub struct Matcher<'a> {
    predicate: &'a Predicate,
    patterns: HashMap<&'a str, Option<Regex>>,
}

impl Matcher<'_> {
    pub fn matches(&self, record: &RawRecord) -> bool {
        self.eval(self.predicate, record) == Some(true)
    }

    /// `None` is SQL's unknown.
    fn eval(&self, predicate: &Predicate, record: &RawRecord) -> Option<bool> {
        match predicate {
            Predicate::Compare { field, op, value } => {
                let actual = coerce_for(record, field, value);
                compare(&actual, value).map(|ord| op_holds(*op, ord))
            }
            Predicate::Like { field, pattern } => {
                match coerce(record.get(field), DataType::String) {
                    Value::String(s) => self
                        .patterns
                        .get(pattern.as_str())
                        .and_then(Option::as_ref)
                        .map(|re| re.is_match(&s)),
                    _ => None,
                }
            }
            Predicate::Between { field, low, high } => {
                let actual = coerce_for(record, field, low);
                let above = compare(&actual, low).map(|ord| ord != Ordering::Less);
                let below = compare(&actual, high).map(|ord| ord != Ordering::Greater);
                and(above, below)
            }
            Predicate::IsNull { field, negated } => {
                let is_null = match record.get(field) {
                    None | Some(serde_json::Value::Null) => true,
                    Some(serde_json::Value::String(s)) => s.trim().is_empty(),
                    Some(_) => false,
                };
                Some(is_null != *negated)
            }
            Predicate::And(items) => items
                .iter()
                .fold(Some(true), |acc, p| and(acc, self.eval(p, record))),
            Predicate::Or(items) => items
                .iter()
                .fold(Some(false), |acc, p| or(acc, self.eval(p, record))),
            Predicate::Not(inner) => self.eval(inner, record).map(|b| !b),
        }
    }
}

fn and(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }
}

fn or(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }
}

fn collect_patterns<'a>(predicate: &'a Predicate, out: &mut HashMap<&'a str, Option<Regex>>) {
    match predicate {
        Predicate::Like { pattern, .. } => {
            out.entry(pattern.as_str())
                .or_insert_with(|| like_regex(pattern));
        }
        Predicate::And(items) | Predicate::Or(items) => {
            items.iter().for_each(|p| collect_patterns(p, out));
        }
        Predicate::Not(inner) => collect_patterns(inner, out),
        _ => {}
    }
}

/// Coerce the record value to the literal's type; integer literals compare as floats.
fn coerce_for(record: &RawRecord, field: &str, literal: &Literal) -> Value {
    let target = match literal.data_type() {
        DataType::Integer => DataType::Float,
        other => other,
    };
    coerce(record.get(field), target)
}

fn compare(actual: &Value, literal: &Literal) -> Option<Ordering> {
    match (actual, literal) {
        (Value::String(a), Literal::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Float(a), Literal::Float(b)) => a.partial_cmp(b),
        (Value::Float(a), Literal::Integer(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Integer(a), Literal::Integer(b)) => Some(a.cmp(b)),
        (Value::Date(a), Literal::Date(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Literal::Boolean(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn op_holds(op: ComparisonOp, ord: Ordering) -> bool {
    match op {
        ComparisonOp::Eq => ord == Ordering::Equal,
        ComparisonOp::Ne => ord != Ordering::Equal,
        ComparisonOp::Lt => ord == Ordering::Less,
        ComparisonOp::Le => ord != Ordering::Greater,
        ComparisonOp::Gt => ord == Ordering::Greater,
        ComparisonOp::Ge => ord != Ordering::Less,
    }
}

/// Translate a LIKE pattern to an anchored regex.
pub(crate) fn like_regex(pattern: &str) -> Option<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push_str("(?s)^");

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    re.push_str(&regex::escape(escaped.encode_utf8(&mut [0; 4])));
                }
            }
            other => re.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    re.push('$');
    Regex::new(&re).ok()
}
