//! Regularized linear classifier.
//!
//! A binary logistic regression fitted by full-batch gradient descent with
//! L2 regularization and class-balanced sample weighting, plus a wrapper
//! that selects the regularization strength by stratified k-fold
//! cross-validation before the final refit.

use log::{debug, info};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::metrics;
use super::Label;
use crate::corpus::stratified_kfold;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Fitting hyperparameters. `c` is the inverse regularization strength,
/// sklearn-style: larger means weaker regularization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    pub c: f64,
    pub max_iter: usize,
    pub learning_rate: f64,
    /// Weight samples inversely to their class frequency.
    pub balanced: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 200,
            learning_rate: 1.0,
            balanced: true,
        }
    }
}

/// Fitted binary logistic regression. The positive class (`y = 1`) is
/// [`Label::Real`]; the decision score is the signed distance proxy from the
/// separating boundary, positive toward `real`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    bias: f64,
    c: f64,
}

impl LogisticRegression {
    /// Fits on feature vectors and labels. Callers guarantee `x` and `y` are
    /// the same length and non-empty; both classes must be present.
    pub fn fit(
        x: &[Array1<f64>],
        y: &[Label],
        config: &FitConfig,
    ) -> Result<Self, ClassifierError> {
        if x.is_empty() || x.len() != y.len() {
            return Err(ClassifierError::Data(
                "feature matrix and labels must be non-empty and the same length".into(),
            ));
        }
        let n_real = y.iter().filter(|&&l| l == Label::Real).count();
        let n_fake = y.len() - n_real;
        if n_real == 0 || n_fake == 0 {
            return Err(ClassifierError::Data(
                "training data must contain both classes".into(),
            ));
        }

        let n = x.len();
        let dim = x[0].len();
        let targets: Vec<f64> = y
            .iter()
            .map(|l| if *l == Label::Real { 1.0 } else { 0.0 })
            .collect();

        // Balanced weighting: n / (n_classes * n_c) per class.
        let (w_fake, w_real) = if config.balanced {
            (n as f64 / (2.0 * n_fake as f64), n as f64 / (2.0 * n_real as f64))
        } else {
            (1.0, 1.0)
        };
        let sample_weights: Vec<f64> = y
            .iter()
            .map(|l| if *l == Label::Real { w_real } else { w_fake })
            .collect();
        let weight_sum: f64 = sample_weights.iter().sum();

        let mut weights = vec![0.0f64; dim];
        let mut bias = 0.0f64;
        let l2 = 1.0 / (config.c * n as f64);
        let tol = 1e-6;

        for iter in 0..config.max_iter {
            let mut grad_w = vec![0.0f64; dim];
            let mut grad_b = 0.0f64;

            for (xi, (&ti, &swi)) in x.iter().zip(targets.iter().zip(sample_weights.iter())) {
                let z = bias + xi.iter().zip(weights.iter()).map(|(a, b)| a * b).sum::<f64>();
                let err = swi * (sigmoid(z) - ti);
                for (g, &v) in grad_w.iter_mut().zip(xi.iter()) {
                    *g += err * v;
                }
                grad_b += err;
            }

            let mut grad_norm = 0.0f64;
            for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                let g = g / weight_sum + l2 * *w;
                *w -= config.learning_rate * g;
                grad_norm += g * g;
            }
            let gb = grad_b / weight_sum;
            bias -= config.learning_rate * gb;
            grad_norm += gb * gb;

            if grad_norm.sqrt() < tol {
                debug!("converged after {} iterations", iter + 1);
                break;
            }
        }

        Ok(Self {
            weights,
            bias,
            c: config.c,
        })
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    /// Signed margin from the separating boundary, positive toward `real`.
    pub fn decision_score(&self, x: &Array1<f64>) -> Option<f64> {
        Some(
            self.bias
                + x.iter()
                    .zip(self.weights.iter())
                    .map(|(a, b)| a * b)
                    .sum::<f64>(),
        )
    }

    /// Class probabilities ordered as [`Label::ORDERED`]: `[p_fake, p_real]`.
    pub fn probabilities(&self, x: &Array1<f64>) -> Option<[f64; 2]> {
        let p_real = sigmoid(self.decision_score(x)?);
        Some([1.0 - p_real, p_real])
    }

    pub fn predict(&self, x: &Array1<f64>) -> Label {
        if self.decision_score(x).unwrap_or(0.0) >= 0.0 {
            Label::Real
        } else {
            Label::Fake
        }
    }
}

/// Logistic regression with built-in cross-validated selection of the
/// regularization strength: k-fold stratified CV over a fixed grid of `c`
/// values, scored by macro-F1, followed by a refit on the full input.
#[derive(Debug, Clone)]
pub struct LogisticRegressionCv {
    pub c_grid: Vec<f64>,
    pub folds: usize,
    pub seed: u64,
    pub base: FitConfig,
}

impl Default for LogisticRegressionCv {
    fn default() -> Self {
        Self {
            c_grid: vec![0.1, 1.0, 10.0],
            folds: 5,
            seed: 42,
            base: FitConfig::default(),
        }
    }
}

impl LogisticRegressionCv {
    pub fn fit(
        &self,
        x: &[Array1<f64>],
        y: &[Label],
    ) -> Result<LogisticRegression, ClassifierError> {
        let folds = stratified_kfold(y, self.folds, self.seed)?;

        let mut best_c = self.base.c;
        let mut best_score = f64::NEG_INFINITY;

        for &c in &self.c_grid {
            let config = FitConfig { c, ..self.base.clone() };
            let mut scores = Vec::with_capacity(folds.len());

            for (train_idx, test_idx) in &folds {
                let train_x: Vec<Array1<f64>> =
                    train_idx.iter().map(|&i| x[i].clone()).collect();
                let train_y: Vec<Label> = train_idx.iter().map(|&i| y[i]).collect();
                let model = LogisticRegression::fit(&train_x, &train_y, &config)?;

                let truth: Vec<Label> = test_idx.iter().map(|&i| y[i]).collect();
                let predicted: Vec<Label> =
                    test_idx.iter().map(|&i| model.predict(&x[i])).collect();
                scores.push(metrics::macro_f1(&truth, &predicted));
            }

            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            debug!("c = {c}: mean macro-F1 = {mean:.4}");
            if mean > best_score {
                best_score = mean;
                best_c = c;
            }
        }

        info!("selected c = {best_c} (mean macro-F1 = {best_score:.4})");
        let config = FitConfig { c: best_c, ..self.base.clone() };
        LogisticRegression::fit(x, y, &config)
    }
}
