//! Integration test: Training pipeline end-to-end

use placement_insight::explainability::{Link, ModelKind};
use placement_insight::inference::{ModelBundle, PlacementPredictor, PredictorConfig};
use placement_insight::preprocessing::{PlacementDataset, StudentRecord, N_FEATURES};
use placement_insight::training::{train_test_split, PlacementTrainer, TrainingConfig};

const GENDERS: [&str; 2] = ["F", "M"];
const BOARDS: [&str; 2] = ["Central", "Others"];
const STREAMS: [&str; 3] = ["Arts", "Commerce", "Science"];
const DEGREES: [&str; 3] = ["Comm&Mgmt", "Others", "Sci&Tech"];
const SPECS: [&str; 2] = ["Mkt&Fin", "Mkt&HR"];

/// Placement depends on the test score and work experience; salary is
/// linear in the same two inputs.
fn synthetic_dataset(n: usize) -> PlacementDataset {
    let mut records = Vec::with_capacity(n);
    let mut placed = Vec::with_capacity(n);
    let mut salaries = Vec::with_capacity(n);

    for i in 0..n {
        let etest_p = 50.0 + ((i * 37) % 45) as f64;
        let workex = i % 4 == 0;
        let record = StudentRecord {
            gender: GENDERS[i % 2].to_string(),
            ssc_p: 55.0 + ((i * 13) % 35) as f64,
            ssc_b: BOARDS[i % 2].to_string(),
            hsc_p: 50.0 + ((i * 17) % 40) as f64,
            hsc_b: BOARDS[(i / 2) % 2].to_string(),
            hsc_s: STREAMS[i % 3].to_string(),
            degree_p: 52.0 + ((i * 11) % 33) as f64,
            degree_t: DEGREES[(i / 3) % 3].to_string(),
            workex: if workex { "Yes" } else { "No" }.to_string(),
            etest_p,
            specialisation: SPECS[(i / 5) % 2].to_string(),
            mba_p: 55.0 + ((i * 7) % 25) as f64,
        };

        let score = etest_p + if workex { 15.0 } else { 0.0 };
        let is_placed = score > 75.0;
        records.push(record);
        placed.push(is_placed);
        salaries.push(if is_placed {
            200000.0 + 2000.0 * (etest_p - 50.0) + if workex { 30000.0 } else { 0.0 }
        } else {
            0.0
        });
    }

    PlacementDataset::from_rows(records, placed, salaries).unwrap()
}

#[test]
fn test_train_produces_valid_bundle() {
    let dataset = synthetic_dataset(120);
    let bundle = PlacementTrainer::new(TrainingConfig::default()).train(&dataset).unwrap();

    assert!(bundle.validate().is_ok());
    assert_eq!(bundle.feature_names.len(), N_FEATURES);
    assert_eq!(bundle.placement.link(), Link::Logistic);
    assert_eq!(bundle.salary.link(), Link::Identity);

    let placement = bundle.placement_metrics.as_ref().unwrap();
    assert!(placement.accuracy.unwrap() >= 0.75, "accuracy {:?}", placement.accuracy);
    assert!(placement.n_test > 0);
    assert!(placement.n_train > placement.n_test);

    let salary = bundle.salary_metrics.as_ref().unwrap();
    assert!(salary.r2.unwrap() > 0.95, "r2 {:?}", salary.r2);
}

#[test]
fn test_placement_weights_follow_the_signal() {
    let dataset = synthetic_dataset(120);
    let bundle = PlacementTrainer::new(TrainingConfig::default()).train(&dataset).unwrap();
    // etest_p and workex drive placement
    assert!(bundle.placement.weights()[9] > 0.0);
    assert!(bundle.placement.weights()[8] > 0.0);
    assert!(bundle.salary.weights()[9] > 0.0);
}

#[test]
fn test_training_is_deterministic() {
    let dataset = synthetic_dataset(80);
    let trainer = PlacementTrainer::new(TrainingConfig::default().with_seed(7));
    let a = trainer.train(&dataset).unwrap();
    let b = trainer.train(&dataset).unwrap();
    assert_eq!(a.placement.weights(), b.placement.weights());
    assert_eq!(a.salary.intercept(), b.salary.intercept());
    assert_eq!(a.placement_metrics, b.placement_metrics);
}

#[test]
fn test_bundle_round_trip_preserves_predictions() {
    let dataset = synthetic_dataset(100);
    let bundle = PlacementTrainer::new(TrainingConfig::default()).train(&dataset).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models").join("bundle.json");
    bundle.save(&path).unwrap();
    let loaded = ModelBundle::load(&path).unwrap();

    let record = StudentRecord::example();
    let before = PlacementPredictor::from_bundle(bundle, PredictorConfig::default());
    let after = PlacementPredictor::from_bundle(loaded, PredictorConfig::default());

    let p1 = before.predict_placement(&record).unwrap();
    let p2 = after.predict_placement(&record).unwrap();
    assert!((p1.probability - p2.probability).abs() < 1e-12);

    let e1 = before.explain(ModelKind::Salary, &record).unwrap();
    let e2 = after.explain(ModelKind::Salary, &record).unwrap();
    assert!((e1.base_value - e2.base_value).abs() < 1e-6);
}

#[test]
fn test_trained_predictor_explains_additively() {
    let dataset = synthetic_dataset(100);
    let bundle = PlacementTrainer::new(TrainingConfig::default()).train(&dataset).unwrap();
    let predictor = PlacementPredictor::from_bundle(bundle, PredictorConfig::default());

    let record = StudentRecord::example();
    let summary = predictor.explain(ModelKind::Placement, &record).unwrap();
    let total: f64 = summary.feature_impacts.iter().map(|f| f.shap_value).sum();
    let margin = predictor
        .bundle()
        .placement
        .margin(predictor.encode(&record).unwrap().view())
        .unwrap();
    assert!((summary.base_value + total - margin).abs() <= 1e-6 * margin.abs().max(1.0));
}

#[test]
fn test_training_needs_both_classes() {
    let dataset = synthetic_dataset(40);
    let records = dataset.records().to_vec();
    let n = records.len();
    let none_placed = PlacementDataset::from_rows(records, vec![false; n], vec![0.0; n]).unwrap();
    assert!(PlacementTrainer::new(TrainingConfig::default()).train(&none_placed).is_err());
}

#[test]
fn test_invalid_config_is_rejected() {
    let dataset = synthetic_dataset(40);
    let trainer = PlacementTrainer::new(TrainingConfig::default().with_test_size(1.5));
    assert!(trainer.train(&dataset).is_err());
}

#[test]
fn test_stratified_split_keeps_class_ratio() {
    let labels: Vec<i64> = (0..100).map(|i| (i < 70) as i64).collect();
    let split = train_test_split(100, Some(&labels), 0.2, 42).unwrap();

    assert_eq!(split.test.len(), 20);
    assert_eq!(split.train.len(), 80);
    let positives = split.test.iter().filter(|&&i| labels[i] == 1).count();
    assert_eq!(positives, 14);

    let mut all: Vec<usize> = split.train.iter().chain(split.test.iter()).copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..100).collect::<Vec<_>>());
}
