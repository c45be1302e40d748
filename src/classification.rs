//! Linear classification.
//!
//! A binary logistic regression trained by gradient descent with an L2
//! penalty, and a one-vs-rest wrapper that lifts it to multiclass.
//!
//! # Example
//!
//! ```
//! use espectro::classification::{LogisticRegression, OneVsRest};
//! use espectro::traits::Classifier;
//! use espectro::primitives::Matrix;
//!
//! let x = Matrix::from_vec(4, 2, vec![
//!     0.0, 0.0,
//!     0.0, 1.0,
//!     1.0, 0.0,
//!     1.0, 1.0,
//! ]).expect("matrix dimensions match data length");
//! let y = vec![0, 0, 0, 1];
//!
//! let mut model = OneVsRest::new(LogisticRegression::new().with_learning_rate(0.5));
//! model.fit(&x, &y).expect("training data is valid");
//! assert_eq!(model.predict(&x).len(), 4);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EspectroError, Result};
use crate::primitives::{Matrix, Vector};
use crate::traits::Classifier;

/// Logistic regression for binary classification.
///
/// Sigmoid activation, binary cross-entropy loss, full-batch gradient
/// descent. The L2 penalty strength is the inverse of `regularization`
/// (larger C means a weaker penalty, matching the usual convention).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Model coefficients (weights)
    coefficients: Option<Vector<f32>>,
    /// Intercept (bias) term, never penalized
    intercept: f32,
    /// Inverse regularization strength C
    regularization: f32,
    /// Learning rate for gradient descent
    learning_rate: f32,
    /// Maximum number of iterations
    max_iter: usize,
    /// Convergence tolerance on the gradient
    tol: f32,
    /// Whether the last fit converged within `max_iter`
    converged: bool,
}

impl LogisticRegression {
    /// Creates a classifier with C = 1.0, learning rate 0.01 and the
    /// reference iteration cap of 5000.
    #[must_use]
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
            regularization: 1.0,
            learning_rate: 0.01,
            max_iter: 5000,
            tol: 1e-4,
            converged: false,
        }
    }

    /// Sets the inverse regularization strength C (must be positive).
    #[must_use]
    pub fn with_regularization(mut self, c: f32) -> Self {
        self.regularization = c;
        self
    }

    /// Sets the learning rate.
    #[must_use]
    pub fn with_learning_rate(mut self, lr: f32) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// Whether the last `fit` converged before hitting the iteration cap.
    ///
    /// Non-convergence is not an error; callers that care can warn.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Sigmoid activation: σ(z) = 1 / (1 + e^(-z))
    fn sigmoid(z: f32) -> f32 {
        1.0 / (1.0 + (-z).exp())
    }

    /// Raw linear score per sample, before the sigmoid.
    ///
    /// # Panics
    ///
    /// Panics if the model is not fitted.
    #[must_use]
    pub fn decision_function(&self, x: &Matrix<f32>) -> Vector<f32> {
        let coef = self.coefficients.as_ref().expect("Model not fitted yet");
        let (n_samples, _) = x.shape();

        let mut scores = Vec::with_capacity(n_samples);
        for row in 0..n_samples {
            let mut z = self.intercept;
            for col in 0..coef.len() {
                z += coef[col] * x.get(row, col);
            }
            scores.push(z);
        }
        Vector::from_vec(scores)
    }

    /// Probability of class 1 for each sample.
    ///
    /// # Panics
    ///
    /// Panics if the model is not fitted.
    #[must_use]
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Vector<f32> {
        let scores = self.decision_function(x);
        Vector::from_vec(scores.as_slice().iter().map(|&z| Self::sigmoid(z)).collect())
    }

    /// Fits the model to binary labels (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns an error on empty input, row/label count mismatch,
    /// non-binary labels, or a non-positive C.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        let (n_samples, n_features) = x.shape();

        if n_samples != y.len() {
            return Err(EspectroError::DimensionMismatch {
                expected: format!("rows={n_samples}"),
                actual: y.len().to_string(),
            });
        }
        if n_samples == 0 {
            return Err("cannot fit with zero samples".into());
        }
        if self.regularization <= 0.0 {
            return Err(EspectroError::InvalidHyperparameter {
                param: "regularization".to_string(),
                value: self.regularization.to_string(),
                constraint: "> 0".to_string(),
            });
        }
        for &label in y {
            if label > 1 {
                return Err("labels must be 0 or 1 for binary classification".into());
            }
        }

        self.coefficients = Some(Vector::from_vec(vec![0.0; n_features]));
        self.intercept = 0.0;
        self.converged = false;

        let n = n_samples as f32;
        let penalty = 1.0 / (self.regularization * n);

        for _ in 0..self.max_iter {
            let probas = self.predict_proba(x);

            let mut coef_grad = vec![0.0; n_features];
            let mut intercept_grad = 0.0;
            for i in 0..n_samples {
                let error = probas[i] - y[i] as f32;
                intercept_grad += error;
                for (j, grad) in coef_grad.iter_mut().enumerate() {
                    *grad += error * x.get(i, j);
                }
            }
            intercept_grad /= n;

            if let Some(ref mut coef) = self.coefficients {
                for (j, grad) in coef_grad.iter_mut().enumerate() {
                    *grad = *grad / n + penalty * coef[j];
                }
                for j in 0..n_features {
                    coef[j] -= self.learning_rate * coef_grad[j];
                }
            }
            self.intercept -= self.learning_rate * intercept_grad;

            if intercept_grad.abs() < self.tol && coef_grad.iter().all(|&g| g.abs() < self.tol) {
                self.converged = true;
                break;
            }
        }

        Ok(())
    }

    /// Predicts 0 or 1 per sample at the 0.5 probability threshold.
    ///
    /// # Panics
    ///
    /// Panics if the model is not fitted.
    #[must_use]
    pub fn predict(&self, x: &Matrix<f32>) -> Vec<usize> {
        self.predict_proba(x)
            .as_slice()
            .iter()
            .map(|&p| usize::from(p >= 0.5))
            .collect()
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

/// One-vs-rest multiclass wrapper.
///
/// Trains one binary classifier per class, each distinguishing that class
/// from all others; prediction takes the class whose binary model yields
/// the highest confidence score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneVsRest {
    /// Unfitted template cloned per class
    base: LogisticRegression,
    /// Classes in ascending order, aligned with `models`
    classes: Vec<usize>,
    /// One fitted binary model per class
    models: Vec<LogisticRegression>,
}

impl OneVsRest {
    /// Creates a one-vs-rest ensemble from a binary template.
    #[must_use]
    pub fn new(base: LogisticRegression) -> Self {
        Self {
            base,
            classes: Vec::new(),
            models: Vec::new(),
        }
    }

    /// Classes seen during fit, in ascending order.
    #[must_use]
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// True when every per-class binary model converged.
    #[must_use]
    pub fn converged(&self) -> bool {
        !self.models.is_empty() && self.models.iter().all(LogisticRegression::converged)
    }

    /// Per-class confidence scores, one row per sample, columns aligned
    /// with [`classes`](Self::classes).
    ///
    /// # Panics
    ///
    /// Panics if the ensemble is not fitted.
    #[must_use]
    pub fn decision_function(&self, x: &Matrix<f32>) -> Matrix<f32> {
        assert!(!self.models.is_empty(), "Model not fitted yet");
        let n_samples = x.n_rows();
        let n_classes = self.models.len();

        let mut scores = Matrix::zeros(n_samples, n_classes);
        for (k, model) in self.models.iter().enumerate() {
            let column = model.decision_function(x);
            for i in 0..n_samples {
                scores.set(i, k, column[i]);
            }
        }
        scores
    }
}

impl Classifier for OneVsRest {
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        if x.n_rows() != y.len() {
            return Err(EspectroError::DimensionMismatch {
                expected: format!("rows={}", x.n_rows()),
                actual: y.len().to_string(),
            });
        }
        if y.is_empty() {
            return Err("cannot fit with zero samples".into());
        }

        let mut classes: Vec<usize> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let mut models = Vec::with_capacity(classes.len());
        for &class in &classes {
            let targets: Vec<usize> = y.iter().map(|&label| usize::from(label == class)).collect();
            let mut model = self.base.clone();
            model.fit(x, &targets)?;
            models.push(model);
        }

        self.classes = classes;
        self.models = models;
        Ok(())
    }

    fn predict(&self, x: &Matrix<f32>) -> Vec<usize> {
        let scores = self.decision_function(x);
        let n_samples = x.n_rows();

        let mut predictions = Vec::with_capacity(n_samples);
        for i in 0..n_samples {
            let mut best = 0;
            let mut best_score = f32::NEG_INFINITY;
            for k in 0..self.classes.len() {
                let score = scores.get(i, k);
                if score > best_score {
                    best_score = score;
                    best = k;
                }
            }
            predictions.push(self.classes[best]);
        }
        predictions
    }
}
