//! Core traits for pipeline stages.
//!
//! These traits define the contracts between the reducer, the oversampler,
//! and the classifier.

use crate::error::Result;
use crate::primitives::Matrix;

/// Trait for fitted data transformers (dimensionality reducers, scalers).
///
/// ```
/// use espectro::prelude::*;
///
/// let data = Matrix::from_vec(4, 3, vec![
///     1.0, 2.0, 3.0,
///     4.0, 5.0, 6.0,
///     7.0, 8.0, 9.0,
///     10.0, 11.0, 12.0,
/// ]).expect("valid matrix dimensions");
///
/// let mut pca = Pca::new(2);
/// let reduced = pca.fit_transform(&data).expect("fit_transform should succeed");
/// assert_eq!(reduced.shape(), (4, 2));
/// ```
pub trait Transformer {
    /// Fits the transformer to data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()>;

    /// Transforms data using fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformer is not fitted.
    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>>;

    /// Fits and transforms in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails.
    fn fit_transform(&mut self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Trait for resamplers that rewrite both features and labels.
///
/// Only invoked during training; inference never resamples. Implementations
/// must keep the original rows first and unchanged, and may only add rows.
pub trait Resampler {
    /// Fits to the data and returns the resampled (features, labels) pair.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid hyperparameters or classes too small
    /// to supply neighbors.
    fn fit_resample(&self, x: &Matrix<f32>, y: &[usize]) -> Result<(Matrix<f32>, Vec<usize>)>;
}

/// Trait for multiclass classifiers with encoded `usize` labels.
pub trait Classifier {
    /// Fits the classifier to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails (dimension mismatch, empty input).
    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()>;

    /// Predicts class labels for input data.
    fn predict(&self, x: &Matrix<f32>) -> Vec<usize>;

    /// Computes accuracy on test data.
    fn score(&self, x: &Matrix<f32>, y: &[usize]) -> f32 {
        let predictions = self.predict(x);
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(pred, truth)| pred == truth)
            .count();
        correct as f32 / y.len() as f32
    }
}
