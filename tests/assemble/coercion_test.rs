use serde_json::json;
use time::macros::date;
use wfs_search::assemble::ResultAssembler;
use wfs_search::catalog::{DataType, Field, FieldCatalog};
use wfs_search::fetch::MemoryFetcher;
use wfs_search::query::build;
use wfs_search::Value;

fn catalog() -> FieldCatalog {
    FieldCatalog::new(
        "dov-pub:Grondwaterfilters",
        vec![
            Field::new("filternummer", DataType::String),
            Field::new("diepte_onderkant_filter", DataType::Float),
            Field::new("aantal_peilingen", DataType::Integer),
            Field::new("datum", DataType::Date),
            Field::new("actief", DataType::Boolean),
        ],
    )
    .unwrap()
}

fn fetcher() -> MemoryFetcher {
    MemoryFetcher::from_json(
        r#"[
            {"filternummer": " 1 ", "diepte_onderkant_filter": "12.5", "aantal_peilingen": "3",
             "datum": "2017-06-01Z", "actief": "ja"},
            {"filternummer": "2", "diepte_onderkant_filter": "N/A", "aantal_peilingen": 4.0,
             "datum": "not a date", "actief": "y"},
            {"filternummer": "3", "diepte_onderkant_filter": null, "aantal_peilingen": "",
             "actief": false}
        ]"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_malformed_values_become_missing() {
    let catalog = catalog();
    let request = build(&catalog, None, None, None).unwrap();
    let rows = ResultAssembler::new(fetcher()).assemble(&request).await.unwrap();

    assert_eq!(rows.len(), 3);

    let first = &rows.rows()[0];
    assert_eq!(first.get("filternummer"), Some(&Value::String("1".into())));
    assert_eq!(first.get("diepte_onderkant_filter"), Some(&Value::Float(12.5)));
    assert_eq!(first.get("aantal_peilingen"), Some(&Value::Integer(3)));
    assert_eq!(first.get("datum"), Some(&Value::Date(date!(2017 - 06 - 02))));
    // Only English truth words are recognised.
    assert_eq!(first.get("actief"), Some(&Value::Missing));

    let second = &rows.rows()[1];
    assert!(second.get("diepte_onderkant_filter").unwrap().is_missing());
    assert_eq!(second.get("aantal_peilingen"), Some(&Value::Integer(4)));
    assert!(second.get("datum").unwrap().is_missing());
    assert_eq!(second.get("actief"), Some(&Value::Boolean(true)));
}

#[tokio::test]
async fn test_absent_values_are_null_not_missing() {
    let catalog = catalog();
    let request = build(&catalog, None, None, None).unwrap();
    let rows = ResultAssembler::new(fetcher()).assemble(&request).await.unwrap();

    let third = &rows.rows()[2];
    assert!(third.get("diepte_onderkant_filter").unwrap().is_null());
    assert!(third.get("aantal_peilingen").unwrap().is_null());
    assert!(third.get("datum").unwrap().is_null());
    assert_eq!(third.get("actief"), Some(&Value::Boolean(false)));
}

#[tokio::test]
async fn test_only_requested_fields_in_catalog_order() {
    let catalog = catalog();
    let request = build(
        &catalog,
        None,
        None,
        Some(vec!["datum".to_string(), "filternummer".to_string()]),
    )
    .unwrap();
    let rows = ResultAssembler::new(fetcher()).assemble(&request).await.unwrap();

    assert_eq!(rows.columns(), &["filternummer".to_string(), "datum".to_string()]);
    for row in &rows {
        assert_eq!(row.values().len(), 2);
        assert!(row.get("actief").is_none());
    }
}

#[tokio::test]
async fn test_missing_serializes_as_null() {
    let catalog = catalog();
    let request = build(
        &catalog,
        None,
        Some(2),
        Some(vec!["filternummer".to_string(), "diepte_onderkant_filter".to_string()]),
    )
    .unwrap();
    let rows = ResultAssembler::new(fetcher()).assemble(&request).await.unwrap();

    let json: serde_json::Value = serde_json::from_str(&rows.to_json().unwrap()).unwrap();
    assert_eq!(
        json,
        json!([
            {"filternummer": "1", "diepte_onderkant_filter": 12.5},
            {"filternummer": "2", "diepte_onderkant_filter": null}
        ])
    );
    assert_eq!(rows.rows()[1].values()[1].to_string(), "N/A");
}
