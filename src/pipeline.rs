//! The fixed three-stage classification pipeline.
//!
//! Reduce with PCA, balance the training set with geometric oversampling,
//! then classify one-vs-rest. Oversampling runs during `fit` only; `predict`
//! sees the reducer and the classifier.

use std::fmt;

use crate::classification::{LogisticRegression, OneVsRest};
use crate::error::Result;
use crate::oversample::GeometricSmote;
use crate::preprocessing::Pca;
use crate::primitives::Matrix;
use crate::traits::{Classifier, Resampler, Transformer};

/// Complete parameter set for one pipeline candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParams {
    /// Principal components kept by the reducer.
    pub n_components: usize,
    /// Neighbor count for the oversampler.
    pub k_neighbors: usize,
    /// Deformation factor for the oversampler, in `[0, 1]`.
    pub deformation_factor: f32,
    /// Truncation factor for the oversampler, in `[-1, 1]`.
    pub truncation_factor: f32,
    /// Inverse regularization strength C for the classifier.
    pub regularization: f32,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            n_components: 10,
            k_neighbors: 5,
            deformation_factor: 0.0,
            truncation_factor: 1.0,
            regularization: 1.0,
        }
    }
}

impl fmt::Display for PipelineParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n_components={}, k_neighbors={}, deformation={}, truncation={}, C={}",
            self.n_components,
            self.k_neighbors,
            self.deformation_factor,
            self.truncation_factor,
            self.regularization
        )
    }
}

/// PCA, geometric oversampling and one-vs-rest logistic regression wired
/// in sequence.
///
/// # Example
///
/// ```
/// use espectro::pipeline::{PipelineParams, SpectralPipeline};
/// use espectro::primitives::Matrix;
///
/// let mut data = Vec::new();
/// for i in 0..12 {
///     let base = if i < 8 { 0.0 } else { 5.0 };
///     data.extend_from_slice(&[base + i as f32 * 0.1, base, base - i as f32 * 0.05]);
/// }
/// let x = Matrix::from_vec(12, 3, data).expect("valid matrix dimensions");
/// let y = vec![0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1];
///
/// let params = PipelineParams { n_components: 2, k_neighbors: 2, ..Default::default() };
/// let mut pipeline = SpectralPipeline::new(params).with_random_state(0);
/// pipeline.fit(&x, &y).expect("training data is valid");
/// assert_eq!(pipeline.predict(&x).expect("pipeline is fitted").len(), 12);
/// ```
#[derive(Debug, Clone)]
pub struct SpectralPipeline {
    params: PipelineParams,
    random_state: Option<u64>,
    max_iter: usize,
    pca: Option<Pca>,
    classifier: Option<OneVsRest>,
}

impl SpectralPipeline {
    /// Creates an unfitted pipeline with the classifier iteration cap at
    /// its reference value of 5000.
    #[must_use]
    pub fn new(params: PipelineParams) -> Self {
        Self {
            params,
            random_state: None,
            max_iter: 5000,
            pca: None,
            classifier: None,
        }
    }

    /// Seeds the oversampler for reproducible synthetic samples.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    /// Caps gradient descent iterations for the per-class classifiers.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// The parameter set this pipeline was configured with.
    #[must_use]
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// An unfitted copy of this pipeline with `params` swapped in.
    ///
    /// Seeds and iteration caps carry over; fitted state does not.
    #[must_use]
    pub fn with_params(&self, params: PipelineParams) -> Self {
        Self {
            params,
            random_state: self.random_state,
            max_iter: self.max_iter,
            pca: None,
            classifier: None,
        }
    }

    /// The fitted reducer, when `fit` has run.
    #[must_use]
    pub fn pca(&self) -> Option<&Pca> {
        self.pca.as_ref()
    }

    /// True when every per-class classifier converged during the last fit.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.classifier.as_ref().is_some_and(OneVsRest::converged)
    }

    /// Fits all three stages on training data.
    ///
    /// # Errors
    ///
    /// Returns an error when any stage rejects its input, including classes
    /// too small for the oversampler to interpolate.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        let mut pca = Pca::new(self.params.n_components);
        let reduced = pca.fit_transform(x)?;

        let mut smote = GeometricSmote::new()
            .with_k_neighbors(self.params.k_neighbors)
            .with_deformation_factor(self.params.deformation_factor)
            .with_truncation_factor(self.params.truncation_factor);
        if let Some(seed) = self.random_state {
            smote = smote.with_random_state(seed);
        }
        let (x_balanced, y_balanced) = smote.fit_resample(&reduced, y)?;

        let base = LogisticRegression::new()
            .with_regularization(self.params.regularization)
            .with_max_iter(self.max_iter);
        let mut classifier = OneVsRest::new(base);
        classifier.fit(&x_balanced, &y_balanced)?;

        self.pca = Some(pca);
        self.classifier = Some(classifier);
        Ok(())
    }

    /// Predicts encoded labels for new samples.
    ///
    /// # Errors
    ///
    /// Returns an error when the pipeline is unfitted or the feature width
    /// differs from the training data.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        let pca = self
            .pca
            .as_ref()
            .ok_or_else(|| crate::error::EspectroError::from("pipeline not fitted"))?;
        let classifier = self
            .classifier
            .as_ref()
            .ok_or_else(|| crate::error::EspectroError::from("pipeline not fitted"))?;

        let reduced = pca.transform(x)?;
        Ok(classifier.predict(&reduced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imbalanced_clusters() -> (Matrix<f32>, Vec<usize>) {
        // 10 samples near the origin, 4 near (8, 8, 8, 8).
        let mut data = Vec::new();
        let mut y = Vec::new();
        for i in 0..10 {
            let jitter = i as f32 * 0.11;
            data.extend_from_slice(&[jitter, 0.3 - jitter * 0.5, jitter * 0.2, 0.1]);
            y.push(0);
        }
        for i in 0..4 {
            let jitter = i as f32 * 0.13;
            data.extend_from_slice(&[8.0 + jitter, 8.0 - jitter, 8.0, 8.0 + jitter * 0.5]);
            y.push(1);
        }
        let x = Matrix::from_vec(14, 4, data).expect("valid dims");
        (x, y)
    }

    #[test]
    fn test_fit_predict_roundtrip() {
        let (x, y) = imbalanced_clusters();
        let params = PipelineParams {
            n_components: 2,
            k_neighbors: 3,
            ..Default::default()
        };
        let mut pipeline = SpectralPipeline::new(params).with_random_state(0).with_max_iter(2000);
        pipeline.fit(&x, &y).expect("fit");

        let predictions = pipeline.predict(&x).expect("predict");
        assert_eq!(predictions.len(), 14);
        // Well-separated clusters classify cleanly.
        assert_eq!(predictions, y);
    }

    #[test]
    fn test_predict_unfitted_fails() {
        let pipeline = SpectralPipeline::new(PipelineParams::default());
        let x = Matrix::zeros(3, 4);
        assert!(pipeline.predict(&x).is_err());
    }

    #[test]
    fn test_deterministic_with_seed() {
        let (x, y) = imbalanced_clusters();
        let params = PipelineParams {
            n_components: 2,
            k_neighbors: 3,
            ..Default::default()
        };

        let mut a = SpectralPipeline::new(params.clone()).with_random_state(7).with_max_iter(500);
        a.fit(&x, &y).expect("fit");
        let mut b = SpectralPipeline::new(params).with_random_state(7).with_max_iter(500);
        b.fit(&x, &y).expect("fit");

        assert_eq!(a.predict(&x).expect("predict"), b.predict(&x).expect("predict"));
    }

    #[test]
    fn test_with_params_resets_fitted_state() {
        let (x, y) = imbalanced_clusters();
        let params = PipelineParams {
            n_components: 2,
            k_neighbors: 3,
            ..Default::default()
        };
        let mut pipeline = SpectralPipeline::new(params).with_random_state(1).with_max_iter(200);
        pipeline.fit(&x, &y).expect("fit");

        let swapped = pipeline.with_params(PipelineParams {
            n_components: 3,
            k_neighbors: 2,
            ..Default::default()
        });
        assert!(swapped.predict(&x).is_err());
        assert_eq!(swapped.params().n_components, 3);
    }

    #[test]
    fn test_singleton_class_fails_in_fit() {
        let mut data = Vec::new();
        for i in 0..6 {
            data.extend_from_slice(&[i as f32, 1.0]);
        }
        let x = Matrix::from_vec(6, 2, data).expect("valid dims");
        let y = vec![0, 0, 0, 0, 0, 1]; // one lone sample of class 1

        let params = PipelineParams {
            n_components: 1,
            k_neighbors: 2,
            ..Default::default()
        };
        let mut pipeline = SpectralPipeline::new(params).with_random_state(0);
        assert!(pipeline.fit(&x, &y).is_err());
    }

    #[test]
    fn test_params_display() {
        let text = PipelineParams::default().to_string();
        assert!(text.contains("n_components=10"));
        assert!(text.contains("C=1"));
    }
}
