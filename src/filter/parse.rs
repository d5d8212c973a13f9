//! Parsing compact query strings into predicates.
//!
//! A query string is a comma separated list of clauses, all of which must
//! hold:
//!
//! ```text
//! naam like 'KART_PROF_%', diepte_tot_m > 20, datum between (2010-01-01, 2015-12-31)
//! ```
//!
//! Supported operators: `= != <> < <= > >= like not like between << is null
//! is not null`. Literals are typed after the catalog field they compare
//! against. A literal that does not parse as its field's type is kept as a
//! string so that validation reports the mismatch; unknown fields are left
//! for validation too.

use std::sync::LazyLock;

use regex::Regex;

use super::predicate::{field, ComparisonOp, Literal, Predicate};
use crate::assemble::coerce::{parse_boolean, parse_date};
use crate::catalog::{DataType, FieldCatalog};
use crate::error::{SearchError, SearchResult};

static SYMBOLIC_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_.:]*)\s*(!=|<>|<<|<=|>=|=|<|>)\s*(.*?)\s*$")
        .unwrap()
});

static KEYWORD_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*([A-Za-z_][A-Za-z0-9_.:]*)\s+(not\s+like|like|between|is\s+not\s+null|is\s+null)\b\s*(.*?)\s*$",
    )
    .unwrap()
});

/// Parse a query string against a catalog. Blank input means "match all".
pub fn parse_query(query: &str, catalog: &FieldCatalog) -> SearchResult<Option<Predicate>> {
    let clauses = split_clauses(query)?;
    let predicates = clauses
        .iter()
        .map(|clause| parse_clause(clause, catalog))
        .collect::<SearchResult<Vec<_>>>()?;
    Ok(Predicate::all(predicates))
}

/// Split on top-level commas, respecting quotes and parentheses.
fn split_clauses(query: &str) -> SearchResult<Vec<String>> {
    let mut clauses = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;

    for c in query.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '(') => {
                depth += 1;
                current.push(c);
            }
            (None, ')') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| SearchError::Parse("unbalanced ')'".to_string()))?;
                current.push(c);
            }
            (None, ',') if depth == 0 => clauses.push(std::mem::take(&mut current)),
            (None, c) => current.push(c),
        }
    }

    if quote.is_some() {
        return Err(SearchError::Parse("unterminated quoted literal".to_string()));
    }
    if depth != 0 {
        return Err(SearchError::Parse("unbalanced '('".to_string()));
    }
    clauses.push(current);

    let non_empty: Vec<String> = clauses
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    Ok(non_empty)
}

fn parse_clause(clause: &str, catalog: &FieldCatalog) -> SearchResult<Predicate> {
    let (name, op, rest) = if let Some(caps) = SYMBOLIC_CLAUSE.captures(clause) {
        (caps[1].to_string(), caps[2].to_string(), caps[3].to_string())
    } else if let Some(caps) = KEYWORD_CLAUSE.captures(clause) {
        let op = caps[2].split_whitespace().collect::<Vec<_>>().join(" ");
        (caps[1].to_string(), op.to_ascii_lowercase(), caps[3].to_string())
    } else {
        return Err(SearchError::Parse(format!(
            "expected 'field operator literal', got '{}'",
            clause
        )));
    };

    let data_type = catalog.get(&name).ok().map(|f| f.data_type);

    let comparison = |op: ComparisonOp| -> SearchResult<Predicate> {
        let value = typed_literal(required(&rest, clause)?, data_type);
        Ok(Predicate::Compare {
            field: name.clone(),
            op,
            value,
        })
    };

    match op.as_str() {
        "=" => comparison(ComparisonOp::Eq),
        "!=" | "<>" => comparison(ComparisonOp::Ne),
        "<" => comparison(ComparisonOp::Lt),
        "<=" => comparison(ComparisonOp::Le),
        ">" => comparison(ComparisonOp::Gt),
        ">=" => comparison(ComparisonOp::Ge),
        "like" => Ok(field(name.as_str()).like(unquote(required(&rest, clause)?))),
        "not like" => Ok(field(name.as_str())
            .like(unquote(required(&rest, clause)?))
            .not()),
        "between" | "<<" => {
            let (low, high) = split_bounds(required(&rest, clause)?)?;
            Ok(field(name.as_str()).between(
                typed_literal(low, data_type),
                typed_literal(high, data_type),
            ))
        }
        "is null" | "is not null" => {
            if !rest.is_empty() {
                return Err(SearchError::Parse(format!(
                    "unexpected literal after '{}' in '{}'",
                    op, clause
                )));
            }
            Ok(if op == "is null" {
                field(name.as_str()).is_null()
            } else {
                field(name.as_str()).is_not_null()
            })
        }
        other => Err(SearchError::Parse(format!("unsupported operator '{}'", other))),
    }
}

fn required<'a>(rest: &'a str, clause: &str) -> SearchResult<&'a str> {
    if rest.is_empty() {
        Err(SearchError::Parse(format!("missing literal in '{}'", clause)))
    } else {
        Ok(rest)
    }
}

/// `(low, high)` or `low and high`.
fn split_bounds(text: &str) -> SearchResult<(&str, &str)> {
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text);

    let parts: Vec<&str> = if inner.contains(',') {
        inner.splitn(2, ',').collect()
    } else {
        inner.splitn(2, " and ").collect()
    };

    match parts.as_slice() {
        [low, high] if !low.trim().is_empty() && !high.trim().is_empty() => {
            Ok((low.trim(), high.trim()))
        }
        _ => Err(SearchError::Parse(format!(
            "between expects '(low, high)', got '{}'",
            text
        ))),
    }
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2
        && ((text.starts_with('\'') && text.ends_with('\''))
            || (text.starts_with('"') && text.ends_with('"')))
}

fn unquote(text: &str) -> String {
    if is_quoted(text) {
        text[1..text.len() - 1].to_string()
    } else {
        text.to_string()
    }
}

fn typed_literal(text: &str, data_type: Option<DataType>) -> Literal {
    let fallback = || Literal::String(unquote(text));

    match data_type {
        Some(DataType::String) => fallback(),
        Some(_) if is_quoted(text) => fallback(),
        Some(DataType::Integer) => text.parse().map(Literal::Integer).unwrap_or_else(|_| fallback()),
        Some(DataType::Float) => text.parse().map(Literal::Float).unwrap_or_else(|_| fallback()),
        Some(DataType::Date) => parse_date(text).map(Literal::Date).unwrap_or_else(fallback),
        Some(DataType::Boolean) => parse_boolean(text)
            .map(Literal::Boolean)
            .unwrap_or_else(fallback),
        None => infer_literal(text),
    }
}

fn infer_literal(text: &str) -> Literal {
    if is_quoted(text) {
        return Literal::String(unquote(text));
    }
    if let Ok(i) = text.parse::<i64>() {
        return Literal::Integer(i);
    }
    if let Ok(f) = text.parse::<f64>() {
        return Literal::Float(f);
    }
    if let Some(d) = parse_date(text) {
        return Literal::Date(d);
    }
    match text.to_ascii_lowercase().as_str() {
        "true" => Literal::Boolean(true),
        "false" => Literal::Boolean(false),
        _ => Literal::String(text.to_string()),
    }
}
