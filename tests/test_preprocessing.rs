//! Integration test: record validation, encoding and dataset loading

use placement_insight::error::PlacementError;
use placement_insight::preprocessing::{
    display_name, CategoryTables, FeatureEncoder, PlacementDataset, StudentRecord, FEATURE_NAMES, N_FEATURES,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Write;

fn student_json() -> serde_json::Value {
    json!({
        "gender": "M",
        "ssc_p": 67.0,
        "ssc_b": "Others",
        "hsc_p": 91.0,
        "hsc_b": "Others",
        "hsc_s": "Commerce",
        "degree_p": 58.0,
        "degree_t": "Sci&Tech",
        "workex": "No",
        "etest_p": 55.0,
        "specialisation": "Mkt&HR",
        "mba_p": 58.8
    })
}

#[test]
fn test_encode_example_student() {
    let encoder = FeatureEncoder::default();
    let v = encoder.encode_json(&student_json()).unwrap();

    assert_eq!(v.len(), N_FEATURES);
    assert_eq!(v.get("gender"), Some(1.0));
    assert_eq!(v.get("ssc_b"), Some(1.0));
    assert_eq!(v.get("hsc_s"), Some(1.0));
    assert_eq!(v.get("degree_t"), Some(2.0));
    assert_eq!(v.get("workex"), Some(0.0));
    assert_eq!(v.get("specialisation"), Some(1.0));
    assert_eq!(v.get("etest_p"), Some(55.0));

    let avg = v.get("avg_academic_score").unwrap();
    assert!((avg - 72.0).abs() < 1e-12);
    // sample std of 67, 91, 58
    let consistency = v.get("academic_consistency").unwrap();
    assert!((consistency - 291.0f64.sqrt()).abs() < 1e-9);
    assert_eq!(v.get("mba_performance"), Some(58.8));
}

#[test]
fn test_json_and_typed_record_encode_identically() {
    let encoder = FeatureEncoder::default();
    let from_json = encoder.encode_json(&student_json()).unwrap();
    let from_record = encoder.encode(&StudentRecord::example()).unwrap();
    assert_eq!(from_json, from_record);
}

#[test]
fn test_unknown_category_is_rejected() {
    let mut body = student_json();
    body["hsc_s"] = json!("Engineering");
    let err = FeatureEncoder::default().encode_json(&body).unwrap_err();
    assert!(matches!(err, PlacementError::UnknownCategory { ref field, .. } if field == "hsc_s"));
    assert!(err.is_client_error());
}

#[test]
fn test_missing_field_is_rejected() {
    let mut body = student_json();
    body.as_object_mut().unwrap().remove("etest_p");
    let err = StudentRecord::from_json(&body).unwrap_err();
    assert!(matches!(err, PlacementError::MissingField(ref f) if f == "etest_p"));
}

#[test]
fn test_out_of_range_percentage_is_rejected() {
    let mut body = student_json();
    body["mba_p"] = json!(140.0);
    assert!(matches!(
        StudentRecord::from_json(&body),
        Err(PlacementError::InvalidInput(_))
    ));
}

#[test]
fn test_non_object_is_rejected() {
    assert!(StudentRecord::from_json(&json!([1, 2, 3])).is_err());
}

#[test]
fn test_fitted_tables_are_sorted() {
    let mut columns = BTreeMap::new();
    columns.insert("gender".to_string(), vec!["M".to_string(), "F".to_string(), "M".to_string()]);
    columns.insert("ssc_b".to_string(), vec!["Others".to_string(), "Central".to_string()]);
    columns.insert("hsc_b".to_string(), vec!["Central".to_string()]);
    columns.insert("hsc_s".to_string(), vec!["Science".to_string(), "Arts".to_string()]);
    columns.insert("degree_t".to_string(), vec!["Others".to_string()]);
    columns.insert("workex".to_string(), vec!["Yes".to_string(), "No".to_string()]);
    columns.insert("specialisation".to_string(), vec!["Mkt&HR".to_string()]);

    let tables = CategoryTables::fit(&columns).unwrap();
    assert_eq!(tables.encode("gender", "F").unwrap(), 0);
    assert_eq!(tables.encode("gender", "M").unwrap(), 1);
    assert_eq!(tables.encode("hsc_s", "Science").unwrap(), 1);
    assert!(tables.encode("hsc_s", "Commerce").is_err());
}

#[test]
fn test_display_names_cover_every_feature() {
    for name in FEATURE_NAMES {
        assert_ne!(display_name(name), "");
    }
    assert_eq!(display_name("workex"), "Work Experience");
    assert_eq!(display_name("not_a_feature"), "not_a_feature");
}

#[test]
fn test_load_csv() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "sl_no,gender,ssc_p,ssc_b,hsc_p,hsc_b,hsc_s,degree_p,degree_t,workex,etest_p,specialisation,mba_p,status,salary"
    )
    .unwrap();
    writeln!(file, "1,M,67.00,Others,91.00,Others,Commerce,58.00,Sci&Tech,No,55.0,Mkt&HR,58.80,Placed,270000").unwrap();
    writeln!(file, "2,M,79.33,Central,78.33,Others,Science,77.48,Sci&Tech,Yes,86.5,Mkt&Fin,66.28,Placed,200000").unwrap();
    writeln!(file, "3,M,65.00,Central,68.00,Central,Arts,64.00,Comm&Mgmt,No,75.0,Mkt&Fin,57.80,Placed,250000").unwrap();
    writeln!(file, "4,M,56.00,Central,52.00,Central,Science,52.00,Sci&Tech,No,66.0,Mkt&HR,59.43,Not Placed,").unwrap();
    writeln!(file, "5,F,,Central,73.60,Central,Commerce,73.30,Comm&Mgmt,No,96.8,Mkt&Fin,55.50,Placed,425000").unwrap();
    file.flush().unwrap();

    let dataset = PlacementDataset::from_csv(file.path()).unwrap();
    assert_eq!(dataset.len(), 4);
    assert_eq!(dataset.placed_count(), 3);
    assert_eq!(dataset.salaries()[3], 0.0);
    assert_eq!(dataset.records()[1].etest_p, 86.5);
    assert_eq!(dataset.placed_only().len(), 3);
}

#[test]
fn test_load_missing_file_fails() {
    assert!(PlacementDataset::from_csv("/nonexistent/placement.csv").is_err());
}
