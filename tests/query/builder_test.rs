use wfs_search::catalog::{DataType, Field, FieldCatalog};
use wfs_search::query::build;
use wfs_search::{field, Predicate, QueryBuilder, SearchError};

fn catalog() -> FieldCatalog {
    FieldCatalog::new(
        "dov-pub:Boringen",
        vec![
            Field::new("pkey_boring", DataType::String),
            Field::new("boornummer", DataType::String),
            Field::new("x", DataType::Float),
            Field::new("diepte_tot_m", DataType::Float),
            Field::new("aantal_monsters", DataType::Integer),
            Field::new("datum_aanvang", DataType::Date),
            Field::new("boorgatmeting", DataType::Boolean).with_queryable(false),
        ],
    )
    .unwrap()
}

#[test]
fn test_valid_request() {
    let catalog = catalog();
    let request = QueryBuilder::new(&catalog)
        .filter(field("boornummer").like("KART_PROF_%"))
        .max_results(10)
        .fields(["boornummer", "x"])
        .build()
        .unwrap();

    assert_eq!(request.feature_type(), "dov-pub:Boringen");
    assert_eq!(request.max_results(), Some(10));
    assert_eq!(&*request.columns(), &["boornummer".to_string(), "x".to_string()]);
    assert_eq!(request.property_names(), vec!["boornummer", "x"]);
    assert!(request.filter_xml().is_some());
}

#[test]
fn test_all_fields_by_default() {
    let catalog = catalog();
    let request = QueryBuilder::new(&catalog).build().unwrap();

    assert!(request.predicate().is_none());
    assert!(request.requested_fields().is_none());
    assert_eq!(request.selection().len(), catalog.len());
}

#[test]
fn test_unknown_field_in_predicate() {
    let catalog = catalog();
    let err = QueryBuilder::new(&catalog)
        .filter(field("totally_unknown_field").eq("x"))
        .build()
        .unwrap_err();

    assert_eq!(err, SearchError::unknown_field("totally_unknown_field"));
}

#[test]
fn test_not_queryable() {
    let err = build(&catalog(), Some(field("boorgatmeting").eq(true)), None, None).unwrap_err();
    assert_eq!(err, SearchError::not_queryable("boorgatmeting"));
}

#[test]
fn test_non_queryable_field_can_be_returned() {
    let request = build(
        &catalog(),
        None,
        None,
        Some(vec!["boorgatmeting".to_string()]),
    )
    .unwrap();
    assert_eq!(&*request.columns(), &["boorgatmeting".to_string()]);
}

#[test]
fn test_type_mismatch() {
    let err = build(&catalog(), Some(field("x").gt("far away")), None, None).unwrap_err();
    assert_eq!(
        err,
        SearchError::TypeMismatch {
            field: "x".to_string(),
            expected: DataType::Float,
            found: "string".to_string(),
        }
    );
}

#[test]
fn test_integer_literal_fits_float_field() {
    assert!(build(&catalog(), Some(field("diepte_tot_m").gt(20)), None, None).is_ok());
}

#[test]
fn test_float_literal_does_not_fit_integer_field() {
    let err = build(&catalog(), Some(field("aantal_monsters").eq(1.5)), None, None).unwrap_err();
    assert!(matches!(err, SearchError::TypeMismatch { .. }));
}

#[test]
fn test_between_bounds_checked() {
    let err = build(
        &catalog(),
        Some(field("diepte_tot_m").between(1.0, "deep")),
        None,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, SearchError::TypeMismatch { ref field, .. } if field == "diepte_tot_m"));
}

#[test]
fn test_validation_order_over_nested_tree() {
    // Unknown field, non-queryable field and mismatch all present: unknown wins.
    let p = Predicate::Or(vec![
        field("x").eq("nope"),
        field("boorgatmeting").eq(true).not(),
        field("ghost").is_null(),
    ]);
    let err = build(&catalog(), Some(p), None, None).unwrap_err();
    assert_eq!(err, SearchError::unknown_field("ghost"));

    // Without the unknown field, non-queryable beats the mismatch.
    let p = Predicate::Or(vec![field("x").eq("nope"), field("boorgatmeting").eq(true)]);
    let err = build(&catalog(), Some(p), None, None).unwrap_err();
    assert_eq!(err, SearchError::not_queryable("boorgatmeting"));
}

#[test]
fn test_requested_fields_checked_last() {
    let err = build(&catalog(), None, None, Some(vec!["ghost".to_string()])).unwrap_err();
    assert_eq!(err, SearchError::unknown_field("ghost"));
}

#[test]
fn test_zero_max_results() {
    let err = build(&catalog(), None, Some(0), None).unwrap_err();
    assert!(matches!(err, SearchError::InvalidParameter(_)));
    assert!(err.is_validation());
}

#[test]
fn test_empty_field_list() {
    let err = build(&catalog(), None, None, Some(vec![])).unwrap_err();
    assert!(matches!(err, SearchError::InvalidParameter(_)));
}

#[test]
fn test_fingerprint_stable_and_sensitive() {
    let catalog = catalog();
    let a = build(&catalog, Some(field("x").gt(1.0)), Some(10), None).unwrap();
    let b = build(&catalog, Some(field("x").gt(1.0)), Some(10), None).unwrap();
    let c = build(&catalog, Some(field("x").gt(2.0)), Some(10), None).unwrap();
    let d = build(&catalog, Some(field("x").gt(1.0)), Some(20), None).unwrap();

    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
    assert_ne!(a.fingerprint(), d.fingerprint());

    // The count does not depend on the cap.
    assert_eq!(a.count_key(), d.count_key());
    assert_ne!(a.count_key(), c.count_key());
}

#[test]
fn test_repeated_filter_calls_and_together() {
    let catalog = catalog();
    let request = QueryBuilder::new(&catalog)
        .filter(field("x").gt(1.0))
        .filter(field("x").lt(2.0))
        .filter(field("boornummer").is_not_null())
        .build()
        .unwrap();

    match request.predicate() {
        Some(Predicate::And(items)) => assert_eq!(items.len(), 3),
        other => panic!("expected a flat AND, got {:?}", other),
    }
}

#[test]
fn test_ordering_on_boolean_field_rejected() {
    let catalog = FieldCatalog::new(
        "dov-pub:Filters",
        vec![
            Field::new("filternummer", DataType::String),
            Field::new("actief", DataType::Boolean),
        ],
    )
    .unwrap();

    let err = build(&catalog, Some(field("actief").gt(true)), None, None).unwrap_err();
    assert_eq!(
        err,
        SearchError::TypeMismatch {
            field: "actief".into(),
            expected: DataType::Boolean,
            found: "ordered comparison".into(),
        }
    );

    let err = build(&catalog, Some(field("actief").between(false, true)), None, None).unwrap_err();
    assert!(matches!(err, SearchError::TypeMismatch { ref field, .. } if field == "actief"));

    assert!(build(&catalog, Some(field("actief").eq(true)), None, None).is_ok());
    assert!(build(&catalog, Some(field("actief").ne(false)), None, None).is_ok());
}
