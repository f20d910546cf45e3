//! Linear model implementations
//!
//! Both models export a [`LinearModel`] in raw feature space, which is what
//! the explainers consume.

use crate::error::{PlacementError, Result};
use crate::explainability::{sigmoid, LinearModel};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Solve the symmetric positive-definite system Ax = b by Cholesky decomposition.
/// Retries once with a small diagonal ridge if A is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    if let Some(x) = cholesky_factor_solve(a, b) {
        return Some(x);
    }

    let mut a_reg = a.clone();
    let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
    for k in 0..n {
        a_reg[[k, k]] += ridge;
    }
    cholesky_factor_solve(&a_reg, b)
}

fn cholesky_factor_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    // A = L * L^T
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L * y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T * x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Gauss-Jordan solve with partial pivoting, used when Cholesky fails
fn gauss_jordan_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut aug = Array2::<f64>::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&r1, &r2| aug[[r1, col]].abs().total_cmp(&aug[[r2, col]].abs()))?;
        if aug[[pivot_row, col]].abs() < 1e-10 {
            return None;
        }
        if pivot_row != col {
            for j in 0..=n {
                aug.swap([col, j], [pivot_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        for j in 0..=n {
            aug[[col, j]] /= pivot;
        }
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..=n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    Some(aug.column(n).to_owned())
}

fn check_targets(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(PlacementError::DimensionMismatch {
            context: "training targets".to_string(),
            expected: x.nrows(),
            actual: y.len(),
        });
    }
    if x.nrows() == 0 {
        return Err(PlacementError::TrainingError("no training rows".to_string()));
    }
    Ok(())
}

/// Least-squares linear regression with an optional L2 (ridge) penalty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights)
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept (bias)
    pub intercept: Option<f64>,
    /// Regularization strength (L2)
    pub alpha: f64,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            alpha: 0.0,
            is_fitted: false,
        }
    }

    /// Set regularization strength (ridge)
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Fit on centered data by solving `(X^T X + alpha*I) w = X^T y`
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_targets(x, y)?;
        let n_features = x.ncols();

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PlacementError::TrainingError("empty design matrix".to_string()))?;
        let y_mean = y.mean().unwrap_or(0.0);
        let x_centered = x - &x_mean;
        let y_centered = y - y_mean;

        let mut xtx = x_centered.t().dot(&x_centered);
        for i in 0..n_features {
            xtx[[i, i]] += self.alpha;
        }
        let xty = x_centered.t().dot(&y_centered);

        let coefficients = cholesky_solve(&xtx, &xty)
            .or_else(|| gauss_jordan_solve(&xtx, &xty))
            .ok_or_else(|| {
                PlacementError::TrainingError("normal equations are singular".to_string())
            })?;

        self.intercept = Some(y_mean - coefficients.dot(&x_mean));
        self.coefficients = Some(coefficients);
        self.is_fitted = true;

        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.to_linear_model()?.margins(x)?)
    }

    /// R² on the given data
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;
        let y_mean = y.mean().unwrap_or(0.0);
        let ss_res = (&y_pred - y).mapv(|v| v * v).sum();
        let ss_tot = y.mapv(|v| (v - y_mean).powi(2)).sum();
        Ok(if ss_tot == 0.0 { 1.0 } else { 1.0 - ss_res / ss_tot })
    }

    /// Export as an identity-link linear model
    pub fn to_linear_model(&self) -> Result<LinearModel> {
        match (&self.coefficients, self.intercept) {
            (Some(w), Some(b)) if self.is_fitted => Ok(LinearModel::regressor(w.clone(), b)),
            _ => Err(PlacementError::ModelNotFitted),
        }
    }
}

/// L2-regularized binary logistic regression trained by gradient descent.
///
/// Features are standardized internally; the stored coefficients are folded
/// back so they apply to raw (unscaled) inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Coefficients in raw feature space
    pub coefficients: Option<Array1<f64>>,
    /// Intercept in raw feature space
    pub intercept: Option<f64>,
    /// Regularization strength (L2, on standardized weights)
    pub alpha: f64,
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    pub learning_rate: f64,
    /// Weight each class by `n / (2 * n_class)`
    pub balanced: bool,
    /// Iterations run by the last fit
    pub n_iter: usize,
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            alpha: 1e-3,
            max_iter: 2000,
            tol: 1e-6,
            learning_rate: 0.5,
            balanced: false,
            n_iter: 0,
            is_fitted: false,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Enable balanced class weights
    pub fn with_balanced(mut self, balanced: bool) -> Self {
        self.balanced = balanced;
        self
    }

    fn sample_weights(&self, y: &Array1<f64>) -> Result<Array1<f64>> {
        let n = y.len() as f64;
        let n_pos = y.iter().filter(|&&v| v > 0.5).count() as f64;
        let n_neg = n - n_pos;
        if n_pos == 0.0 || n_neg == 0.0 {
            return Err(PlacementError::TrainingError(
                "logistic regression needs both classes in the training set".to_string(),
            ));
        }
        if !self.balanced {
            return Ok(Array1::ones(y.len()));
        }
        let (w_pos, w_neg) = (n / (2.0 * n_pos), n / (2.0 * n_neg));
        Ok(y.mapv(|v| if v > 0.5 { w_pos } else { w_neg }))
    }

    /// Fit on 0/1 targets
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        check_targets(x, y)?;
        if y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(PlacementError::TrainingError(
                "logistic regression targets must be 0 or 1".to_string(),
            ));
        }
        let sample_weights = self.sample_weights(y)?;
        let total_weight = sample_weights.sum();

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| PlacementError::TrainingError("empty design matrix".to_string()))?;
        let scale = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 1e-12 { s } else { 1.0 });
        let z = (x - &mean) / &scale;

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;
        let lr = self.learning_rate;

        self.n_iter = self.max_iter;
        for iter in 0..self.max_iter {
            let predictions = (z.dot(&weights) + bias).mapv(sigmoid);
            let errors = (&predictions - y) * &sample_weights;

            let dw = z.t().dot(&errors) / total_weight + self.alpha * &weights;
            let db = errors.sum() / total_weight;

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                self.n_iter = iter;
                break;
            }

            weights = weights - lr * dw;
            bias -= lr * db;
        }

        let coefficients = &weights / &scale;
        self.intercept = Some(bias - coefficients.dot(&mean));
        self.coefficients = Some(coefficients);
        self.is_fitted = true;

        Ok(self)
    }

    /// Probability of the positive class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.to_linear_model()?.margins(x)?.mapv(sigmoid))
    }

    /// 0/1 labels at a 0.5 threshold
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    /// Accuracy on the given data
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;
        let correct = y_pred
            .iter()
            .zip(y.iter())
            .filter(|(pred, actual)| (*pred - *actual).abs() < 0.5)
            .count();
        Ok(correct as f64 / y.len().max(1) as f64)
    }

    /// Export as a logistic-link linear model
    pub fn to_linear_model(&self) -> Result<LinearModel> {
        match (&self.coefficients, self.intercept) {
            (Some(w), Some(b)) if self.is_fitted => Ok(LinearModel::classifier(w.clone(), b)),
            _ => Err(PlacementError::ModelNotFitted),
        }
    }
}
