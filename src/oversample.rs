//! Synthetic minority oversampling.
//!
//! Geometric SMOTE rebalances class frequencies by drawing synthetic points
//! inside a deformed, truncated hypersphere around minority samples. Unlike
//! classic SMOTE, which interpolates on the segment between two minority
//! neighbors, the geometric variant controls the shape of the sampling
//! region with a truncation factor and a deformation factor.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{EspectroError, Result};
use crate::primitives::Matrix;
use crate::traits::Resampler;

/// Where the surface point that bounds the sampling sphere comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// A random one of the center's k nearest same-class neighbors.
    Minority,
    /// The nearest other-class sample.
    Majority,
    /// Both candidates are computed and the closer one wins.
    Combined,
}

/// Geometric SMOTE oversampler.
///
/// Every class is topped up to the majority class count. Original rows are
/// kept first and unchanged; synthetic rows are appended.
///
/// # Example
///
/// ```
/// use espectro::oversample::GeometricSmote;
/// use espectro::traits::Resampler;
/// use espectro::primitives::Matrix;
///
/// // Class 0 has four samples, class 1 only two.
/// let x = Matrix::from_vec(6, 2, vec![
///     0.0, 0.0,  0.1, 0.0,  0.0, 0.1,  0.1, 0.1,
///     5.0, 5.0,  5.1, 5.1,
/// ]).expect("valid matrix dimensions");
/// let y = vec![0, 0, 0, 0, 1, 1];
///
/// let smote = GeometricSmote::new().with_k_neighbors(1).with_random_state(0);
/// let (xr, yr) = smote.fit_resample(&x, &y).expect("resample should succeed");
/// assert_eq!(xr.n_rows(), 8);
/// assert_eq!(yr.iter().filter(|&&c| c == 1).count(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct GeometricSmote {
    k_neighbors: usize,
    deformation_factor: f32,
    truncation_factor: f32,
    selection_strategy: SelectionStrategy,
    random_state: Option<u64>,
}

impl GeometricSmote {
    /// Creates an oversampler with the reference defaults: 5 neighbors,
    /// no deformation, full truncation, combined selection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            k_neighbors: 5,
            deformation_factor: 0.0,
            truncation_factor: 1.0,
            selection_strategy: SelectionStrategy::Combined,
            random_state: None,
        }
    }

    /// Sets the neighbor count used for minority surface selection.
    #[must_use]
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k;
        self
    }

    /// Sets the deformation factor in [0, 1]; 1 collapses the sphere onto
    /// the center–surface segment (classic SMOTE geometry).
    #[must_use]
    pub fn with_deformation_factor(mut self, factor: f32) -> Self {
        self.deformation_factor = factor;
        self
    }

    /// Sets the truncation factor in [-1, 1]; positive values cut the cap
    /// opposite the surface point, negative values the near cap.
    #[must_use]
    pub fn with_truncation_factor(mut self, factor: f32) -> Self {
        self.truncation_factor = factor;
        self
    }

    /// Sets the surface selection strategy.
    #[must_use]
    pub fn with_selection_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.selection_strategy = strategy;
        self
    }

    /// Sets the random state for reproducible generation.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.k_neighbors == 0 {
            return Err(EspectroError::InvalidHyperparameter {
                param: "k_neighbors".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.deformation_factor) {
            return Err(EspectroError::InvalidHyperparameter {
                param: "deformation_factor".to_string(),
                value: self.deformation_factor.to_string(),
                constraint: "[0, 1]".to_string(),
            });
        }
        if !(-1.0..=1.0).contains(&self.truncation_factor) {
            return Err(EspectroError::InvalidHyperparameter {
                param: "truncation_factor".to_string(),
                value: self.truncation_factor.to_string(),
                constraint: "[-1, 1]".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for GeometricSmote {
    fn default() -> Self {
        Self::new()
    }
}

impl Resampler for GeometricSmote {
    fn fit_resample(&self, x: &Matrix<f32>, y: &[usize]) -> Result<(Matrix<f32>, Vec<usize>)> {
        self.validate()?;

        let (n_samples, n_features) = x.shape();
        if n_samples != y.len() {
            return Err(EspectroError::DimensionMismatch {
                expected: format!("rows={n_samples}"),
                actual: y.len().to_string(),
            });
        }
        if n_samples == 0 {
            return Err("cannot resample an empty dataset".into());
        }

        let n_classes = y.iter().max().map_or(0, |&m| m + 1);
        let mut class_indices: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (i, &label) in y.iter().enumerate() {
            class_indices[label].push(i);
        }
        let majority_count = class_indices.iter().map(Vec::len).max().unwrap_or(0);

        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut out_x = x.clone();
        let mut out_y = y.to_vec();

        for (class, indices) in class_indices.iter().enumerate() {
            let deficit = majority_count - indices.len();
            if indices.is_empty() || deficit == 0 {
                continue;
            }
            if indices.len() < 2 {
                return Err(EspectroError::InsufficientClassSamples {
                    class: class.to_string(),
                    available: indices.len(),
                    required: 2,
                });
            }

            let others: Vec<usize> = (0..n_samples).filter(|i| y[*i] != class).collect();
            let effective_k = self.k_neighbors.min(indices.len() - 1);

            let mut synthetic = Vec::with_capacity(deficit * n_features);
            for _ in 0..deficit {
                let center_idx = indices[rng.gen_range(0..indices.len())];
                let center = x.row(center_idx);

                let surface = self.pick_surface(x, center_idx, center, indices, &others,
                    effective_k, &mut rng);

                synthetic.extend(make_geometric_sample(
                    center,
                    &surface,
                    self.truncation_factor,
                    self.deformation_factor,
                    &mut rng,
                ));
            }

            let new_rows = Matrix::from_vec(deficit, n_features, synthetic)
                .map_err(|e| EspectroError::Other(e.to_string()))?;
            out_x = out_x
                .vstack(&new_rows)
                .map_err(|e| EspectroError::Other(e.to_string()))?;
            out_y.extend(std::iter::repeat(class).take(deficit));
        }

        Ok((out_x, out_y))
    }
}

impl GeometricSmote {
    /// Chooses the surface point bounding the sampling sphere for `center`.
    fn pick_surface(
        &self,
        x: &Matrix<f32>,
        center_idx: usize,
        center: &[f32],
        same_class: &[usize],
        others: &[usize],
        effective_k: usize,
        rng: &mut StdRng,
    ) -> Vec<f32> {
        match self.selection_strategy {
            SelectionStrategy::Minority => {
                minority_surface(x, center, same_class, center_idx, effective_k, rng)
            }
            SelectionStrategy::Majority if !others.is_empty() => {
                majority_surface(x, center, others, center_idx)
            }
            SelectionStrategy::Majority => {
                minority_surface(x, center, same_class, center_idx, effective_k, rng)
            }
            SelectionStrategy::Combined => {
                let min_surface =
                    minority_surface(x, center, same_class, center_idx, effective_k, rng);
                if others.is_empty() {
                    return min_surface;
                }
                let maj_surface = majority_surface(x, center, others, center_idx);
                if euclidean(center, &maj_surface) < euclidean(center, &min_surface) {
                    maj_surface
                } else {
                    min_surface
                }
            }
        }
    }
}

/// A random one of the center's k nearest same-class neighbors.
fn minority_surface(
    x: &Matrix<f32>,
    center: &[f32],
    same_class: &[usize],
    center_idx: usize,
    k: usize,
    rng: &mut StdRng,
) -> Vec<f32> {
    let neighbors = k_nearest(x, center, same_class, center_idx, k);
    let pick = neighbors[rng.gen_range(0..neighbors.len())];
    x.row(pick).to_vec()
}

/// The nearest other-class sample.
fn majority_surface(x: &Matrix<f32>, center: &[f32], others: &[usize], center_idx: usize) -> Vec<f32> {
    let nearest = k_nearest(x, center, others, center_idx, 1);
    x.row(nearest[0]).to_vec()
}

/// Indices of the `k` candidates nearest to `center`, excluding `exclude`.
///
/// Brute-force scan; candidate sets here are at most a few thousand rows.
fn k_nearest(
    x: &Matrix<f32>,
    center: &[f32],
    candidates: &[usize],
    exclude: usize,
    k: usize,
) -> Vec<usize> {
    let mut distances: Vec<(f32, usize)> = candidates
        .iter()
        .filter(|&&idx| idx != exclude)
        .map(|&idx| (euclidean(center, x.row(idx)), idx))
        .collect();
    distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    distances.truncate(k.max(1));
    distances.into_iter().map(|(_, idx)| idx).collect()
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(p, q)| (p - q) * (p - q))
        .sum::<f32>()
        .sqrt()
}

/// Draws one synthetic point inside the truncated, deformed unit
/// hypersphere centered on `center` and scaled to reach `surface`.
fn make_geometric_sample(
    center: &[f32],
    surface: &[f32],
    truncation_factor: f32,
    deformation_factor: f32,
    rng: &mut StdRng,
) -> Vec<f32> {
    let dim = center.len();
    let radius = euclidean(center, surface);
    if radius == 0.0 {
        // Center and surface coincide; nothing to interpolate.
        return center.to_vec();
    }

    // Uniform point in the unit ball: normalized Gaussian direction scaled
    // by U^(1/d).
    let mut point: Vec<f32> = (0..dim).map(|_| standard_normal(rng)).collect();
    let norm = point.iter().map(|v| v * v).sum::<f32>().sqrt().max(1e-12);
    let shrink = rng.gen_range(0.0f32..1.0).powf(1.0 / dim as f32) / norm;
    for v in &mut point {
        *v *= shrink;
    }

    let unit: Vec<f32> = center
        .iter()
        .zip(surface.iter())
        .map(|(c, s)| (s - c) / radius)
        .collect();

    // Truncation: reflect points falling inside the cut cap.
    let proj: f32 = point.iter().zip(unit.iter()).map(|(p, u)| p * u).sum();
    let in_opposite_cap = truncation_factor > 0.0 && proj < truncation_factor - 1.0;
    let in_near_cap = truncation_factor < 0.0 && proj > truncation_factor + 1.0;
    if in_opposite_cap || in_near_cap {
        for (p, u) in point.iter_mut().zip(unit.iter()) {
            *p -= 2.0 * proj * u;
        }
    }

    // Deformation: shrink the component perpendicular to the surface axis.
    let proj: f32 = point.iter().zip(unit.iter()).map(|(p, u)| p * u).sum();
    for (p, u) in point.iter_mut().zip(unit.iter()) {
        let parallel = proj * u;
        let perpendicular = *p - parallel;
        *p = parallel + (1.0 - deformation_factor) * perpendicular;
    }

    // Translate into data space.
    center
        .iter()
        .zip(point.iter())
        .map(|(c, p)| c + radius * p)
        .collect()
}

/// Standard normal deviate via Box-Muller.
fn standard_normal(rng: &mut StdRng) -> f32 {
    let u1: f32 = rng.gen_range(1e-4f32..1.0);
    let u2: f32 = rng.gen_range(0.0f32..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
}
