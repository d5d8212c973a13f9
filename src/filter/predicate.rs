//! Filter predicate AST.
//!
//! Leaves compare one field against typed literals; composites combine
//! predicates with AND/OR/NOT. Every variant is handled exhaustively in
//! validation, XML rendering and local evaluation.

use std::fmt;

use serde::Serialize;
use time::Date;

use crate::catalog::DataType;
use crate::result::format_date;

// =============================================================================
// Literals
// =============================================================================

/// A typed literal value in a leaf comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Date(Date),
    Boolean(bool),
}

impl Literal {
    pub fn data_type(&self) -> DataType {
        match self {
            Literal::String(_) => DataType::String,
            Literal::Integer(_) => DataType::Integer,
            Literal::Float(_) => DataType::Float,
            Literal::Date(_) => DataType::Date,
            Literal::Boolean(_) => DataType::Boolean,
        }
    }

    /// Whether this literal may be compared against a field of type `expected`.
    ///
    /// Integers widen to floats; nothing else converts.
    pub fn fits(&self, expected: DataType) -> bool {
        let actual = self.data_type();
        actual == expected || (actual == DataType::Integer && expected == DataType::Float)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => f.write_str(s),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Date(d) => f.write_str(&format_date(d).ok_or(fmt::Error)?),
            Literal::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Integer(i)
    }
}

impl From<i32> for Literal {
    fn from(i: i32) -> Self {
        Literal::Integer(i64::from(i))
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}

impl From<Date> for Literal {
    fn from(d: Date) -> Self {
        Literal::Date(d)
    }
}

// =============================================================================
// Operators
// =============================================================================

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }

    /// `<`, `<=`, `>` and `>=` need an ordered field type.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, ComparisonOp::Eq | ComparisonOp::Ne)
    }
}

// =============================================================================
// Predicate tree
// =============================================================================

/// A boolean filter expression over field values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// field op literal
    Compare {
        field: String,
        op: ComparisonOp,
        value: Literal,
    },

    /// field LIKE pattern, with `%` (any run), `_` (one char) and `\` (escape).
    Like { field: String, pattern: String },

    /// low <= field <= high
    Between {
        field: String,
        low: Literal,
        high: Literal,
    },

    /// field IS NULL / IS NOT NULL
    IsNull { field: String, negated: bool },

    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Conjunction, flattening nested ANDs.
    pub fn and(self, other: Predicate) -> Predicate {
        match self {
            Predicate::And(mut items) => {
                items.push(other);
                Predicate::And(items)
            }
            first => Predicate::And(vec![first, other]),
        }
    }

    /// Disjunction, flattening nested ORs.
    pub fn or(self, other: Predicate) -> Predicate {
        match self {
            Predicate::Or(mut items) => {
                items.push(other);
                Predicate::Or(items)
            }
            first => Predicate::Or(vec![first, other]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }

    /// AND of all predicates; `None` for an empty input.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
        let mut items: Vec<Predicate> = predicates.into_iter().collect();
        match items.len() {
            0 => None,
            1 => items.pop(),
            _ => Some(Predicate::And(items)),
        }
    }

    /// Field names referenced by leaves, depth-first, duplicates kept.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Compare { field, .. }
            | Predicate::Like { field, .. }
            | Predicate::Between { field, .. }
            | Predicate::IsNull { field, .. } => out.push(field),
            Predicate::And(items) | Predicate::Or(items) => {
                for item in items {
                    item.collect_fields(out);
                }
            }
            Predicate::Not(inner) => inner.collect_fields(out),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { field, op, value } => match value {
                Literal::String(s) => write!(f, "{} {} {:?}", field, op.symbol(), s),
                other => write!(f, "{} {} {}", field, op.symbol(), other),
            },
            Predicate::Like { field, pattern } => write!(f, "{} LIKE {:?}", field, pattern),
            Predicate::Between { field, low, high } => {
                write!(f, "{} BETWEEN {} AND {}", field, low, high)
            }
            Predicate::IsNull { field, negated } => {
                if *negated {
                    write!(f, "{} IS NOT NULL", field)
                } else {
                    write!(f, "{} IS NULL", field)
                }
            }
            Predicate::And(items) | Predicate::Or(items) => {
                let sep = if matches!(self, Predicate::And(_)) {
                    " AND "
                } else {
                    " OR "
                };
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Predicate::Not(inner) => write!(f, "NOT {}", inner),
        }
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Start a leaf predicate on a field.
///
/// ```ignore
/// let p = field("naam").like("KART_PROF_%").and(field("x").gt(150000.0));
/// ```
pub fn field(name: impl Into<String>) -> FieldRef {
    FieldRef(name.into())
}

/// A field name waiting for its comparison.
#[derive(Debug, Clone)]
pub struct FieldRef(String);

impl FieldRef {
    fn compare(self, op: ComparisonOp, value: impl Into<Literal>) -> Predicate {
        Predicate::Compare {
            field: self.0,
            op,
            value: value.into(),
        }
    }

    pub fn eq(self, value: impl Into<Literal>) -> Predicate {
        self.compare(ComparisonOp::Eq, value)
    }

    pub fn ne(self, value: impl Into<Literal>) -> Predicate {
        self.compare(ComparisonOp::Ne, value)
    }

    pub fn lt(self, value: impl Into<Literal>) -> Predicate {
        self.compare(ComparisonOp::Lt, value)
    }

    pub fn le(self, value: impl Into<Literal>) -> Predicate {
        self.compare(ComparisonOp::Le, value)
    }

    pub fn gt(self, value: impl Into<Literal>) -> Predicate {
        self.compare(ComparisonOp::Gt, value)
    }

    pub fn ge(self, value: impl Into<Literal>) -> Predicate {
        self.compare(ComparisonOp::Ge, value)
    }

    pub fn like(self, pattern: impl Into<String>) -> Predicate {
        Predicate::Like {
            field: self.0,
            pattern: pattern.into(),
        }
    }

    pub fn between(self, low: impl Into<Literal>, high: impl Into<Literal>) -> Predicate {
        Predicate::Between {
            field: self.0,
            low: low.into(),
            high: high.into(),
        }
    }

    pub fn is_null(self) -> Predicate {
        Predicate::IsNull {
            field: self.0,
            negated: false,
        }
    }

    pub fn is_not_null(self) -> Predicate {
        Predicate::IsNull {
            field: self.0,
            negated: true,
        }
    }
}
