//! Rendering predicates as OGC Filter Encoding 1.1 XML.
//!
//! The output is a single compact `<ogc:Filter>` element suitable for the
//! `FILTER` parameter of a WFS GetFeature request. Property names are the
//! catalog's source attribute names.

use super::predicate::{ComparisonOp, Literal, Predicate};
use crate::catalog::FieldCatalog;

const OGC_NS: &str = "http://www.opengis.net/ogc";

impl Predicate {
    /// Render this predicate as an `<ogc:Filter>` document.
    pub fn to_filter_xml(&self, catalog: &FieldCatalog) -> String {
        let mut out = String::new();
        out.push_str("<ogc:Filter xmlns:ogc=\"");
        out.push_str(OGC_NS);
        out.push_str("\">");
        write_predicate(&mut out, self, catalog);
        out.push_str("</ogc:Filter>");
        out
    }
}

fn element_name(op: ComparisonOp) -> &'static str {
    match op {
        ComparisonOp::Eq => "PropertyIsEqualTo",
        ComparisonOp::Ne => "PropertyIsNotEqualTo",
        ComparisonOp::Lt => "PropertyIsLessThan",
        ComparisonOp::Le => "PropertyIsLessThanOrEqualTo",
        ComparisonOp::Gt => "PropertyIsGreaterThan",
        ComparisonOp::Ge => "PropertyIsGreaterThanOrEqualTo",
    }
}

fn write_predicate(out: &mut String, predicate: &Predicate, catalog: &FieldCatalog) {
    match predicate {
        Predicate::Compare { field, op, value } => {
            let name = element_name(*op);
            open(out, name);
            write_property(out, field, catalog);
            write_literal(out, value);
            close(out, name);
        }
        Predicate::Like { field, pattern } => {
            out.push_str(
                "<ogc:PropertyIsLike wildCard=\"%\" singleChar=\"_\" escapeChar=\"\\\">",
            );
            write_property(out, field, catalog);
            open(out, "Literal");
            escape_into(out, pattern);
            close(out, "Literal");
            close(out, "PropertyIsLike");
        }
        Predicate::Between { field, low, high } => {
            open(out, "PropertyIsBetween");
            write_property(out, field, catalog);
            open(out, "LowerBoundary");
            write_literal(out, low);
            close(out, "LowerBoundary");
            open(out, "UpperBoundary");
            write_literal(out, high);
            close(out, "UpperBoundary");
            close(out, "PropertyIsBetween");
        }
        Predicate::IsNull { field, negated } => {
            if *negated {
                open(out, "Not");
            }
            open(out, "PropertyIsNull");
            write_property(out, field, catalog);
            close(out, "PropertyIsNull");
            if *negated {
                close(out, "Not");
            }
        }
        Predicate::And(items) => write_composite(out, "And", items, catalog),
        Predicate::Or(items) => write_composite(out, "Or", items, catalog),
        Predicate::Not(inner) => {
            open(out, "Not");
            write_predicate(out, inner, catalog);
            close(out, "Not");
        }
    }
}

fn write_composite(out: &mut String, name: &str, items: &[Predicate], catalog: &FieldCatalog) {
    // A binary operator with one operand is not valid filter XML.
    if let [single] = items {
        write_predicate(out, single, catalog);
        return;
    }
    open(out, name);
    for item in items {
        write_predicate(out, item, catalog);
    }
    close(out, name);
}

fn write_property(out: &mut String, field: &str, catalog: &FieldCatalog) {
    let name = catalog
        .get(field)
        .map(|f| f.source_name())
        .unwrap_or(field);
    open(out, "PropertyName");
    escape_into(out, name);
    close(out, "PropertyName");
}

fn write_literal(out: &mut String, literal: &Literal) {
    open(out, "Literal");
    escape_into(out, &literal.to_string());
    close(out, "Literal");
}

fn open(out: &mut String, name: &str) {
    out.push_str("<ogc:");
    out.push_str(name);
    out.push('>');
}

fn close(out: &mut String, name: &str) {
    out.push_str("</ogc:");
    out.push_str(name);
    out.push('>');
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
}
