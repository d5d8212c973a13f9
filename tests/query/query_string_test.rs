use time::macros::date;
use wfs_search::catalog::{DataType, Field, FieldCatalog};
use wfs_search::filter::{parse_query, ComparisonOp, Literal};
use wfs_search::query::build;
use wfs_search::{field, Predicate, SearchError};

fn catalog() -> FieldCatalog {
    FieldCatalog::new(
        "dov-pub:Boringen",
        vec![
            Field::new("boornummer", DataType::String),
            Field::new("diepte_tot_m", DataType::Float),
            Field::new("aantal_monsters", DataType::Integer),
            Field::new("datum_aanvang", DataType::Date),
            Field::new("gemeten", DataType::Boolean),
        ],
    )
    .unwrap()
}

fn parse(query: &str) -> Option<Predicate> {
    parse_query(query, &catalog()).unwrap()
}

#[test]
fn test_blank_matches_all() {
    assert_eq!(parse(""), None);
    assert_eq!(parse("  ,  "), None);
}

#[test]
fn test_like() {
    assert_eq!(
        parse("boornummer like 'KART_PROF_%'"),
        Some(field("boornummer").like("KART_PROF_%"))
    );
    assert_eq!(
        parse("boornummer LIKE \"GEO%\""),
        Some(field("boornummer").like("GEO%"))
    );
    assert_eq!(
        parse("boornummer not like 'GEO%'"),
        Some(field("boornummer").like("GEO%").not())
    );
}

#[test]
fn test_literals_follow_field_types() {
    assert_eq!(
        parse("diepte_tot_m > 20"),
        Some(Predicate::Compare {
            field: "diepte_tot_m".to_string(),
            op: ComparisonOp::Gt,
            value: Literal::Float(20.0),
        })
    );
    assert_eq!(parse("aantal_monsters = 3"), Some(field("aantal_monsters").eq(3)));
    assert_eq!(parse("gemeten = yes"), Some(field("gemeten").eq(true)));
    assert_eq!(
        parse("datum_aanvang >= 2010-01-01"),
        Some(field("datum_aanvang").ge(date!(2010 - 01 - 01)))
    );
    assert_eq!(parse("boornummer = 123"), Some(field("boornummer").eq("123")));
}

#[test]
fn test_operators() {
    assert_eq!(parse("aantal_monsters != 1"), Some(field("aantal_monsters").ne(1)));
    assert_eq!(parse("aantal_monsters <> 1"), Some(field("aantal_monsters").ne(1)));
    assert_eq!(parse("aantal_monsters <= 1"), Some(field("aantal_monsters").le(1)));
    assert_eq!(parse("aantal_monsters < 1"), Some(field("aantal_monsters").lt(1)));
    assert_eq!(parse("boornummer is null"), Some(field("boornummer").is_null()));
    assert_eq!(
        parse("boornummer IS NOT NULL"),
        Some(field("boornummer").is_not_null())
    );
}

#[test]
fn test_between_forms() {
    let expected = Some(field("datum_aanvang").between(date!(2010 - 01 - 01), date!(2015 - 12 - 31)));
    assert_eq!(parse("datum_aanvang between (2010-01-01, 2015-12-31)"), expected);
    assert_eq!(parse("datum_aanvang between 2010-01-01 and 2015-12-31"), expected);
    assert_eq!(parse("datum_aanvang << (2010-01-01,2015-12-31)"), expected);
}

#[test]
fn test_multiple_clauses_and_together() {
    let predicate = parse("boornummer like 'KART%', diepte_tot_m > 20, boornummer = 'a, b'");
    assert_eq!(
        predicate,
        Some(Predicate::And(vec![
            field("boornummer").like("KART%"),
            field("diepte_tot_m").gt(20.0),
            field("boornummer").eq("a, b"),
        ]))
    );
}

#[test]
fn test_syntax_errors() {
    let catalog = catalog();
    for query in [
        "boornummer ~ 1",
        "boornummer =",
        "= 1",
        "boornummer = 'open",
        "datum_aanvang between (2010-01-01)",
        "boornummer is null 1",
    ] {
        let err = parse_query(query, &catalog).unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)), "{}: {:?}", query, err);
    }
}

#[test]
fn test_bad_literal_surfaces_as_type_mismatch() {
    let catalog = catalog();
    let predicate = parse_query("diepte_tot_m > deep", &catalog).unwrap();
    let err = build(&catalog, predicate, None, None).unwrap_err();
    assert!(matches!(err, SearchError::TypeMismatch { ref field, .. } if field == "diepte_tot_m"));
}

#[test]
fn test_unknown_field_surfaces_at_build() {
    let catalog = catalog();
    let predicate = parse_query("totally_unknown_field = 1", &catalog).unwrap();
    let err = build(&catalog, predicate, None, None).unwrap_err();
    assert_eq!(err, SearchError::unknown_field("totally_unknown_field"));
}
