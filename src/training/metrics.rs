//! Evaluation metrics for the two models

use serde::{Deserialize, Serialize};

/// Binary confusion counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    /// Count outcomes; a value above 0.5 is the positive class
    pub fn from_labels(y_true: &[f64], y_pred: &[f64]) -> Self {
        let mut m = Self::default();
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => m.true_positive += 1,
                (false, true) => m.false_positive += 1,
                (false, false) => m.true_negative += 1,
                (true, false) => m.false_negative += 1,
            }
        }
        m
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }
}

/// Held-out metrics recorded in the model bundle
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Accuracy (classification)
    pub accuracy: Option<f64>,
    /// Precision (classification)
    pub precision: Option<f64>,
    /// Recall (classification)
    pub recall: Option<f64>,
    /// F1 score (classification)
    pub f1_score: Option<f64>,
    pub confusion: Option<ConfusionMatrix>,
    /// Root Mean Squared Error (regression)
    pub rmse: Option<f64>,
    /// Mean Absolute Error (regression)
    pub mae: Option<f64>,
    /// R-squared (regression)
    pub r2: Option<f64>,
    /// Rows used for fitting
    pub n_train: usize,
    /// Rows used for evaluation
    pub n_test: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

impl ModelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accuracy, precision, recall and F1 for 0/1 labels
    pub fn compute_classification(y_true: &[f64], y_pred: &[f64]) -> Self {
        let cm = ConfusionMatrix::from_labels(y_true, y_pred);

        let precision = ratio(cm.true_positive, cm.true_positive + cm.false_positive);
        let recall = ratio(cm.true_positive, cm.true_positive + cm.false_negative);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            accuracy: Some(ratio(cm.true_positive + cm.true_negative, cm.total())),
            precision: Some(precision),
            recall: Some(recall),
            f1_score: Some(f1),
            confusion: Some(cm),
            n_test: y_true.len(),
            ..Self::default()
        }
    }

    /// RMSE, MAE and R²
    pub fn compute_regression(y_true: &[f64], y_pred: &[f64]) -> Self {
        let n = y_true.len().max(1) as f64;
        let errors: Vec<f64> = y_true.iter().zip(y_pred.iter()).map(|(t, p)| t - p).collect();

        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let y_mean = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();

        Self {
            rmse: Some((ss_res / n).sqrt()),
            mae: Some(mae),
            r2: Some(if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 }),
            n_test: y_true.len(),
            ..Self::default()
        }
    }

    pub fn with_train_size(mut self, n_train: usize) -> Self {
        self.n_train = n_train;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_metrics() {
        let y_true = [1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        let y_pred = [1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0];

        let metrics = ModelMetrics::compute_classification(&y_true, &y_pred);
        assert_eq!(metrics.accuracy, Some(0.75));
        assert_eq!(metrics.precision, Some(0.75));
        assert_eq!(metrics.recall, Some(0.75));
        let cm = metrics.confusion.unwrap();
        assert_eq!((cm.true_positive, cm.false_positive, cm.false_negative), (3, 1, 1));
        assert_eq!(cm.total(), 8);
    }

    #[test]
    fn test_regression_metrics() {
        let y_true = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = [1.1, 2.0, 2.9, 4.1, 5.0];

        let metrics = ModelMetrics::compute_regression(&y_true, &y_pred);
        assert!(metrics.rmse.unwrap() < 0.1);
        assert!((metrics.mae.unwrap() - 0.06).abs() < 1e-9);
        assert!(metrics.r2.unwrap() > 0.9);
        assert!(metrics.accuracy.is_none());
    }
}
