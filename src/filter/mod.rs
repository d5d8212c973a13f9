//! Filter predicates over feature attributes.
//!
//! - [`Predicate`]: the typed expression tree
//! - [`parse_query`]: compact `"field op literal, ..."` strings
//! - `Predicate::to_filter_xml`: OGC Filter Encoding for the remote service
//! - `Predicate::matches`: local evaluation for in-memory sources

mod eval;
mod ogc;
mod parse;
mod predicate;

pub use eval::Matcher;
pub use parse::parse_query;
pub use predicate::{field, ComparisonOp, FieldRef, Literal, Predicate};
