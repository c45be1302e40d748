//! Dimensionality reduction.
//!
//! Principal Component Analysis over the 220-band spectral space. The
//! eigendecomposition of the covariance matrix is delegated to nalgebra;
//! everything around it stays in plain loops over the row-major matrix.

use nalgebra::{DMatrix, SymmetricEigen};

use crate::error::{EspectroError, Result};
use crate::primitives::Matrix;
use crate::traits::Transformer;

/// Principal Component Analysis for dimensionality reduction.
///
/// Projects data onto the `n_components` directions of maximum variance.
///
/// # Example
///
/// ```
/// use espectro::preprocessing::Pca;
/// use espectro::traits::Transformer;
/// use espectro::primitives::Matrix;
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
#[derive(Debug, Clone)]
pub struct Pca {
    /// Number of components to keep.
    n_components: usize,
    /// Mean of each feature (computed during fit).
    mean: Option<Vec<f32>>,
    /// Principal axes, one component per row (`n_components` × `n_features`).
    components: Option<Matrix<f32>>,
    /// Fraction of total variance captured per kept component.
    explained_variance_ratio: Option<Vec<f32>>,
}

impl Pca {
    /// Creates a new PCA transformer keeping `n_components` axes.
    #[must_use]
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            mean: None,
            components: None,
            explained_variance_ratio: None,
        }
    }

    /// Number of components this transformer projects onto.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Ratio of total variance explained by each kept component.
    #[must_use]
    pub fn explained_variance_ratio(&self) -> Option<&[f32]> {
        self.explained_variance_ratio.as_deref()
    }

    /// The fitted principal axes.
    #[must_use]
    pub fn components(&self) -> Option<&Matrix<f32>> {
        self.components.as_ref()
    }
}

impl Transformer for Pca {
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
        let (n_samples, n_features) = x.shape();

        if self.n_components == 0 || self.n_components > n_features {
            return Err(EspectroError::InvalidHyperparameter {
                param: "n_components".to_string(),
                value: self.n_components.to_string(),
                constraint: format!("1..={n_features}"),
            });
        }
        if n_samples < 2 {
            return Err("PCA needs at least two samples".into());
        }

        let mean = x.column_means();

        // Covariance: C = Xcᵀ Xc / (n - 1), exploiting symmetry.
        let mut cov = vec![0.0f64; n_features * n_features];
        for i in 0..n_features {
            for j in i..n_features {
                let mut sum = 0.0f64;
                for row in 0..n_samples {
                    let a = f64::from(x.get(row, i) - mean[i]);
                    let b = f64::from(x.get(row, j) - mean[j]);
                    sum += a * b;
                }
                let value = sum / (n_samples - 1) as f64;
                cov[i * n_features + j] = value;
                cov[j * n_features + i] = value;
            }
        }

        let cov_matrix = DMatrix::from_row_slice(n_features, n_features, &cov);
        let eigen = SymmetricEigen::new(cov_matrix);
        let eigenvalues = eigen.eigenvalues;
        let eigenvectors = eigen.eigenvectors;

        // Eigenpairs sorted by variance, descending.
        let mut order: Vec<usize> = (0..n_features).collect();
        order.sort_by(|&a, &b| {
            eigenvalues[b]
                .partial_cmp(&eigenvalues[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut components_data = vec![0.0f32; self.n_components * n_features];
        let mut explained = vec![0.0f32; self.n_components];
        for (rank, &idx) in order.iter().take(self.n_components).enumerate() {
            explained[rank] = eigenvalues[idx] as f32;
            for j in 0..n_features {
                components_data[rank * n_features + j] = eigenvectors[(j, idx)] as f32;
            }
        }

        let total_variance: f64 = eigenvalues.iter().copied().filter(|v| *v > 0.0).sum();
        let ratio: Vec<f32> = explained
            .iter()
            .map(|&v| {
                if total_variance > 0.0 {
                    (f64::from(v) / total_variance) as f32
                } else {
                    0.0
                }
            })
            .collect();

        self.mean = Some(mean);
        self.components = Some(
            Matrix::from_vec(self.n_components, n_features, components_data)
                .map_err(|e| EspectroError::Other(e.to_string()))?,
        );
        self.explained_variance_ratio = Some(ratio);

        Ok(())
    }

    fn transform(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let components = self
            .components
            .as_ref()
            .ok_or_else(|| EspectroError::from("PCA not fitted"))?;
        let mean = self
            .mean
            .as_ref()
            .ok_or_else(|| EspectroError::from("PCA not fitted"))?;

        let (n_samples, n_features) = x.shape();
        if n_features != mean.len() {
            return Err(EspectroError::DimensionMismatch {
                expected: format!("n_features={}", mean.len()),
                actual: n_features.to_string(),
            });
        }

        // Project: X_reduced = (X - mean) @ componentsᵀ
        let mut result = vec![0.0f32; n_samples * self.n_components];
        for i in 0..n_samples {
            for k in 0..self.n_components {
                let mut value = 0.0;
                for j in 0..n_features {
                    value += (x.get(i, j) - mean[j]) * components.get(k, j);
                }
                result[i * self.n_components + k] = value;
            }
        }

        Matrix::from_vec(n_samples, self.n_components, result)
            .map_err(|e| EspectroError::Other(e.to_string()))
    }
}
