//! Training pipeline: dataset to model bundle

use super::config::TrainingConfig;
use super::linear_models::{LinearRegression, LogisticRegression};
use super::metrics::ModelMetrics;
use crate::error::{PlacementError, Result};
use crate::inference::ModelBundle;
use crate::preprocessing::{stack_features, CategoryTables, FeatureEncoder, PlacementDataset};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Labels with fewer distinct values than this are split per class
const STRATIFY_MAX_CLASSES: usize = 10;

/// Row indices of a train/test split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Seeded shuffle split of `n` rows.
///
/// With `labels`, each class is shuffled and split on its own so both
/// sides keep the class proportions.
pub fn train_test_split(
    n: usize,
    labels: Option<&[i64]>,
    test_size: f64,
    seed: u64,
) -> Result<SplitIndices> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let groups: Vec<Vec<usize>> = match labels {
        Some(labels) => {
            if labels.len() != n {
                return Err(PlacementError::DimensionMismatch {
                    context: "split labels".to_string(),
                    expected: n,
                    actual: labels.len(),
                });
            }
            let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
            for (i, &label) in labels.iter().enumerate() {
                by_class.entry(label).or_default().push(i);
            }
            if by_class.len() < STRATIFY_MAX_CLASSES {
                by_class.into_values().collect()
            } else {
                vec![(0..n).collect()]
            }
        }
        None => vec![(0..n).collect()],
    };

    let mut split = SplitIndices {
        train: Vec::with_capacity(n),
        test: Vec::new(),
    };
    for mut indices in groups {
        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f64) * test_size).round() as usize;
        let n_test = n_test.min(indices.len().saturating_sub(1));
        split.test.extend_from_slice(&indices[..n_test]);
        split.train.extend_from_slice(&indices[n_test..]);
    }

    if split.train.is_empty() || split.test.is_empty() {
        return Err(PlacementError::DataError(format!(
            "split of {} rows with test_size {} left an empty side",
            n, test_size
        )));
    }

    split.train.sort_unstable();
    split.test.sort_unstable();
    Ok(split)
}

fn take_rows(x: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    Array2::from_shape_fn((indices.len(), x.ncols()), |(i, j)| x[[indices[i], j]])
}

fn take(y: &[f64], indices: &[usize]) -> Array1<f64> {
    indices.iter().map(|&i| y[i]).collect()
}

/// Fits both models and packages them as a [`ModelBundle`]
#[derive(Debug, Clone, Default)]
pub struct PlacementTrainer {
    config: TrainingConfig,
}

impl PlacementTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Load a CSV and train on it
    pub fn train_csv<P: AsRef<Path>>(&self, path: P) -> Result<ModelBundle> {
        let dataset = PlacementDataset::from_csv(path)?;
        self.train(&dataset)
    }

    /// Fit category tables, both models and their held-out metrics
    pub fn train(&self, dataset: &PlacementDataset) -> Result<ModelBundle> {
        self.config.validate()?;
        let start = Instant::now();

        let categories = CategoryTables::fit(&dataset.category_columns())?;
        let encoder = FeatureEncoder::new(categories.clone());
        info!(
            rows = dataset.len(),
            placed = dataset.placed_count(),
            "Training placement models"
        );

        let (placement, placement_metrics) = self.fit_placement(&encoder, dataset)?;
        let (salary, salary_metrics) = self.fit_salary(&encoder, &dataset.placed_only())?;

        let bundle = ModelBundle::new(
            categories,
            placement.to_linear_model()?,
            salary.to_linear_model()?,
        )?
        .with_metrics(placement_metrics, salary_metrics);

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            accuracy = ?bundle.placement_metrics.as_ref().and_then(|m| m.accuracy),
            r2 = ?bundle.salary_metrics.as_ref().and_then(|m| m.r2),
            "Training complete"
        );
        Ok(bundle)
    }

    fn encode_all(&self, encoder: &FeatureEncoder, dataset: &PlacementDataset) -> Result<Array2<f64>> {
        let vectors = dataset
            .records()
            .iter()
            .map(|record| encoder.encode(record))
            .collect::<Result<Vec<_>>>()?;
        stack_features(&vectors)
    }

    fn fit_placement(
        &self,
        encoder: &FeatureEncoder,
        dataset: &PlacementDataset,
    ) -> Result<(LogisticRegression, ModelMetrics)> {
        let x = self.encode_all(encoder, dataset)?;
        let y: Vec<f64> = dataset.placed().iter().map(|&p| if p { 1.0 } else { 0.0 }).collect();
        let classes: Vec<i64> = dataset.placed().iter().map(|&p| p as i64).collect();

        let split = train_test_split(x.nrows(), Some(&classes), self.config.test_size, self.config.random_seed)?;
        let (x_train, x_test) = (take_rows(&x, &split.train), take_rows(&x, &split.test));
        let (y_train, y_test) = (take(&y, &split.train), take(&y, &split.test));

        let mut model = LogisticRegression::new()
            .with_alpha(self.config.logistic_alpha)
            .with_max_iter(self.config.logistic_max_iter)
            .with_learning_rate(self.config.logistic_learning_rate)
            .with_balanced(self.config.balanced_classes);
        model.fit(&x_train, &y_train)?;
        debug!(iterations = model.n_iter, "Placement classifier fitted");

        let y_pred = model.predict(&x_test)?;
        let metrics = ModelMetrics::compute_classification(&y_test.to_vec(), &y_pred.to_vec())
            .with_train_size(split.train.len());
        info!(
            train = split.train.len(),
            test = split.test.len(),
            accuracy = ?metrics.accuracy,
            f1 = ?metrics.f1_score,
            "Placement model evaluated"
        );
        Ok((model, metrics))
    }

    fn fit_salary(
        &self,
        encoder: &FeatureEncoder,
        placed: &PlacementDataset,
    ) -> Result<(LinearRegression, ModelMetrics)> {
        if placed.len() < 2 {
            return Err(PlacementError::TrainingError(format!(
                "salary model needs at least 2 placed students, found {}",
                placed.len()
            )));
        }
        let x = self.encode_all(encoder, placed)?;
        let y = placed.salaries();

        let split = train_test_split(x.nrows(), None, self.config.test_size, self.config.random_seed)?;
        let x_train = take_rows(&x, &split.train);
        let y_train = take(y, &split.train);

        let mut model = LinearRegression::new().with_alpha(self.config.ridge_alpha);
        model.fit(&x_train, &y_train)?;

        let y_test = take(y, &split.test);
        let y_pred = model.predict(&take_rows(&x, &split.test))?;
        let metrics = ModelMetrics::compute_regression(&y_test.to_vec(), &y_pred.to_vec())
            .with_train_size(split.train.len());
        info!(
            train = split.train.len(),
            test = split.test.len(),
            rmse = ?metrics.rmse,
            r2 = ?metrics.r2,
            "Salary model evaluated"
        );
        Ok((model, metrics))
    }
}
