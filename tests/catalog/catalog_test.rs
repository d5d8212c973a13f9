use wfs_search::catalog::{DataType, Field, FieldCatalog};
use wfs_search::SearchError;

const BORINGEN: &str = r#"{
    "feature_type": "dov-pub:Boringen",
    "definition": "Boreholes in the subsoil database",
    "fields": [
        {"name": "pkey_boring", "type": "string", "definition": "Permanent key", "cost": 1},
        {"name": "boornummer", "type": "string", "definition": "Borehole number"},
        {"name": "x", "type": "float", "source_field": "X_mL72"},
        {"name": "y", "type": "float", "source_field": "Y_mL72"},
        {"name": "diepte_tot_m", "type": "float", "nullable": true},
        {"name": "datum_aanvang", "type": "date"},
        {"name": "methode", "type": "string", "values": ["spade", "spoelboring"], "cost": 10},
        {"name": "boorgatmeting", "type": "boolean", "queryable": false, "cost": 5}
    ]
}"#;

fn catalog() -> FieldCatalog {
    FieldCatalog::from_document("dov-pub:Boringen", BORINGEN).unwrap()
}

#[test]
fn test_document_keeps_declaration_order() {
    let catalog = catalog();

    let names: Vec<&str> = catalog.names().collect();
    assert_eq!(
        names,
        vec![
            "pkey_boring",
            "boornummer",
            "x",
            "y",
            "diepte_tot_m",
            "datum_aanvang",
            "methode",
            "boorgatmeting"
        ]
    );
    assert_eq!(catalog.feature_type(), "dov-pub:Boringen");
    assert_eq!(catalog.definition(), "Boreholes in the subsoil database");
}

#[test]
fn test_document_defaults() {
    let catalog = catalog();

    let boornummer = catalog.get("boornummer").unwrap();
    assert!(boornummer.queryable);
    assert!(boornummer.nullable);
    assert_eq!(boornummer.retrieval_cost, 1);
    assert_eq!(boornummer.source_name(), "boornummer");

    let x = catalog.get("x").unwrap();
    assert_eq!(x.data_type, DataType::Float);
    assert_eq!(x.source_name(), "X_mL72");

    let methode = catalog.get("methode").unwrap();
    assert_eq!(methode.values, vec!["spade".to_string(), "spoelboring".to_string()]);
}

#[test]
fn test_lookup_unknown_field() {
    let err = catalog().get("totally_unknown_field").unwrap_err();
    assert_eq!(err, SearchError::unknown_field("totally_unknown_field"));
    assert!(err.is_validation());
}

#[test]
fn test_queryable_subset() {
    let catalog = catalog();
    let queryable: Vec<&str> = catalog.queryable().map(|f| f.name.as_str()).collect();

    assert_eq!(queryable.len(), 7);
    assert!(!queryable.contains(&"boorgatmeting"));
    assert!(catalog.contains("boorgatmeting"));
}

#[test]
fn test_estimate_cost() {
    let catalog = catalog();

    // 1 * 6 + 10 + 5
    assert_eq!(catalog.estimate_cost(None), 21);
    assert_eq!(
        catalog.estimate_cost(Some(&["methode".to_string(), "x".to_string()])),
        11
    );
}

#[test]
fn test_duplicate_names_are_unparseable() {
    let err = FieldCatalog::new(
        "t",
        vec![
            Field::new("a", DataType::String),
            Field::new("a", DataType::Integer),
        ],
    )
    .unwrap_err();

    assert!(matches!(err, SearchError::CatalogUnavailable { .. }));
}

#[test]
fn test_zero_cost_is_unparseable() {
    let doc = r#"{"fields": [{"name": "a", "type": "string", "cost": 0}]}"#;
    let err = FieldCatalog::from_document("t", doc).unwrap_err();
    assert!(matches!(err, SearchError::CatalogUnavailable { .. }));
}

#[test]
fn test_malformed_document() {
    let err = FieldCatalog::from_document("t", "{\"fields\": [{\"name\": 1}]}").unwrap_err();
    assert!(matches!(
        err,
        SearchError::CatalogUnavailable { ref feature_type, .. } if feature_type == "t"
    ));

    let err = FieldCatalog::from_document("t", r#"{"fields": [{"name": "a", "type": "geometry"}]}"#)
        .unwrap_err();
    assert!(matches!(err, SearchError::CatalogUnavailable { .. }));
}

#[test]
fn test_document_for_other_feature_type() {
    let err = FieldCatalog::from_document("dov-pub:Grondwaterfilters", BORINGEN).unwrap_err();
    assert!(matches!(err, SearchError::CatalogUnavailable { .. }));
}
