//! Integration test: linear attributions, ranking and global importance

use ndarray::{array, Array1};
use placement_insight::explainability::{
    aggregate, aggregate_top_k, global_importance, ExplainerConfig, ExplainerContext, Impact, LinearExplainer,
    LinearModel, ModelKind,
};
use placement_insight::preprocessing::{feature_names, FeatureEncoder, StudentRecord, N_FEATURES};
use placement_insight::synthetic::{generate_background, BackgroundDataset};

fn placement_weights() -> Array1<f64> {
    array![0.3, 0.04, -0.2, 0.05, 0.1, -0.15, 0.03, -0.25, 1.2, 0.01, -0.6, -0.02, 0.05, -0.08, 0.0]
}

fn salary_weights() -> Array1<f64> {
    array![9000.0, 300.0, 0.0, 150.0, -2000.0, 4000.0, -120.0, 6000.0, 15000.0, 800.0, -11000.0, 900.0, 100.0, -50.0, 0.0]
}

fn context() -> ExplainerContext {
    ExplainerContext::new(
        FeatureEncoder::default(),
        LinearModel::classifier(placement_weights(), -6.5),
        LinearModel::regressor(salary_weights(), 180000.0),
        ExplainerConfig::default(),
    )
    .unwrap()
}

fn relative_gap(a: f64, b: f64) -> f64 {
    (a - b).abs() / a.abs().max(b.abs()).max(1.0)
}

#[test]
fn test_additivity_over_background_rows() {
    let background = generate_background(100, 42).unwrap();
    for model in [
        LinearModel::classifier(placement_weights(), -6.5),
        LinearModel::regressor(salary_weights(), 180000.0),
    ] {
        let explainer = LinearExplainer::new(model.clone(), &background).unwrap();
        let attributions = explainer.explain_batch(background.data()).unwrap();
        for (row, attribution) in background.data().rows().into_iter().zip(&attributions) {
            let margin = model.margin(row).unwrap();
            let rebuilt = attribution.base_value + attribution.sum_contributions();
            assert!(relative_gap(rebuilt, margin) < 1e-6, "{} vs {}", rebuilt, margin);
            assert!(attribution.is_additive(margin, 1e-6));
        }
    }
}

#[test]
fn test_additivity_for_student_record() {
    let ctx = context();
    let features = ctx.encoder().encode(&StudentRecord::example()).unwrap();
    for kind in ModelKind::ALL {
        let attribution = ctx.attribute(kind, &features).unwrap();
        let margin = ctx.explainer(kind).model().margin(features.view()).unwrap();
        assert!(relative_gap(attribution.base_value + attribution.sum_contributions(), margin) < 1e-6);
    }
}

#[test]
fn test_base_value_is_mean_margin() {
    let ctx = context();
    for kind in ModelKind::ALL {
        let margins = ctx.explainer(kind).model().margins(ctx.background().data()).unwrap();
        let mean_margin = margins.mean().unwrap();
        assert!(relative_gap(ctx.base_value(kind), mean_margin) < 1e-9);
    }
}

#[test]
fn test_base_value_independent_of_query() {
    let ctx = context();
    let encoder = ctx.encoder();
    let mut other = StudentRecord::example();
    other.workex = "Yes".to_string();
    other.etest_p = 92.0;

    let a = ctx.explain_one(ModelKind::Placement, &StudentRecord::example()).unwrap();
    let b = ctx.explain_one(ModelKind::Placement, &other).unwrap();
    assert_eq!(a.base_value, b.base_value);
    assert_ne!(a.prediction_value, b.prediction_value);
    assert!(encoder.encode(&other).is_ok());
}

#[test]
fn test_query_at_background_mean_has_no_contributions() {
    let background = generate_background(100, 42).unwrap();
    let explainer = LinearExplainer::new(LinearModel::classifier(placement_weights(), -6.5), &background).unwrap();
    let means = explainer.means().clone();
    let attribution = explainer.attribute(means.view()).unwrap();

    assert!(attribution.contributions.iter().all(|&c| c == 0.0));
    assert_eq!(attribution.predicted_value, attribution.base_value);

    let summary = aggregate(&attribution, &feature_names()).unwrap();
    assert!(summary.top_positive_features.is_empty());
    assert!(summary.top_negative_features.is_empty());
    assert!(summary.feature_impacts.iter().all(|f| f.impact == Impact::Neutral));
}

#[test]
fn test_summary_ordering_and_signs() {
    let ctx = context();
    let summary = ctx.explain_one(ModelKind::Salary, &StudentRecord::example()).unwrap();

    assert_eq!(summary.feature_impacts.len(), N_FEATURES);
    for pair in summary.feature_impacts.windows(2) {
        assert!(pair[0].abs_impact >= pair[1].abs_impact);
    }
    assert!(summary.top_positive_features.len() <= 5);
    assert!(summary.top_negative_features.len() <= 5);
    assert!(summary.top_positive_features.iter().all(|f| f.shap_value > 0.0));
    assert!(summary.top_negative_features.iter().all(|f| f.shap_value < 0.0));
}

#[test]
fn test_top_k_limits_lists() {
    let ctx = context();
    let features = ctx.encoder().encode(&StudentRecord::example()).unwrap();
    let attribution = ctx.attribute(ModelKind::Placement, &features).unwrap();
    let summary = aggregate_top_k(&attribution, &feature_names(), 1).unwrap();
    assert!(summary.top_positive_features.len() <= 1);
    assert!(summary.top_negative_features.len() <= 1);
    assert_eq!(summary.feature_impacts.len(), N_FEATURES);
}

#[test]
fn test_global_importance_ranking() {
    let background = generate_background(100, 42).unwrap();
    let model = LinearModel::regressor(salary_weights(), 180000.0);
    let ranking = global_importance(&model, &background).unwrap();

    assert_eq!(ranking.len(), N_FEATURES);
    for (idx, entry) in ranking.iter().enumerate() {
        assert_eq!(entry.rank, idx + 1);
    }
    for pair in ranking.windows(2) {
        assert!(pair[0].importance >= pair[1].importance);
    }

    // zero-weight features contribute nothing anywhere
    let ssc_b = ranking.iter().find(|f| f.feature_key == "ssc_b").unwrap();
    assert_eq!(ssc_b.importance, 0.0);
}

#[test]
fn test_global_importance_matches_context() {
    let ctx = context();
    let direct = global_importance(ctx.explainer(ModelKind::Placement).model(), ctx.background()).unwrap();
    let shared = ctx.global_importance(ModelKind::Placement).unwrap();
    assert_eq!(direct, shared);
}

#[test]
fn test_background_is_deterministic() {
    let a = generate_background(100, 42).unwrap();
    let b = generate_background(100, 42).unwrap();
    let c = generate_background(100, 7).unwrap();

    assert_eq!(a.data(), b.data());
    assert_ne!(a.data(), c.data());
    assert_eq!(a.n_samples(), 100);
    assert_eq!(a.n_features(), N_FEATURES);
}

#[test]
fn test_explanations_repeat_exactly() {
    let first = context().explain_one(ModelKind::Placement, &StudentRecord::example()).unwrap();
    let second = context().explain_one(ModelKind::Placement, &StudentRecord::example()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_two_feature_toy_model() {
    let data = array![[0.0, 0.0], [2.0, 4.0]];
    let background = BackgroundDataset::from_array(data, vec!["x".into(), "y".into()]).unwrap();
    let model = LinearModel::regressor(array![2.0, -1.0], 0.5);
    let explainer = LinearExplainer::new(model, &background).unwrap();

    let attribution = explainer.attribute(array![3.0, 1.0].view()).unwrap();
    assert_eq!(explainer.base_value(), 0.5);
    assert_eq!(attribution.contributions, vec![4.0, 1.0]);
    assert_eq!(attribution.predicted_value, 5.5);
    assert_eq!(attribution.contribution("x"), Some(4.0));
}

#[test]
fn test_wrong_width_query_is_rejected() {
    let background = generate_background(10, 1).unwrap();
    let explainer = LinearExplainer::new(LinearModel::classifier(placement_weights(), 0.0), &background).unwrap();
    assert!(explainer.attribute(array![1.0, 2.0].view()).is_err());
}

#[test]
fn test_custom_background_size() {
    let config = ExplainerConfig::default().with_background_samples(25).with_seed(3);
    let ctx = ExplainerContext::new(
        FeatureEncoder::default(),
        LinearModel::classifier(placement_weights(), -6.5),
        LinearModel::regressor(salary_weights(), 180000.0),
        config,
    )
    .unwrap();
    assert_eq!(ctx.background().n_samples(), 25);
    assert_eq!(ctx.background().seed(), Some(3));
}
