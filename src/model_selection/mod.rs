//! Model selection utilities.
//!
//! This module provides tools for:
//! - Train/test splitting
//! - Stratified K-Fold cross-validation
//! - Exhaustive grid search over pipeline hyperparameters

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{EspectroError, Result};
use crate::metrics::{f1_score, Average};
use crate::pipeline::{PipelineParams, SpectralPipeline};
use crate::primitives::Matrix;

/// Validates inputs for `train_test_split`.
fn validate_split_inputs(x: &Matrix<f32>, y: &[usize], test_size: f32) -> Result<(usize, usize)> {
    if test_size <= 0.0 || test_size >= 1.0 {
        return Err(EspectroError::InvalidHyperparameter {
            param: "test_size".to_string(),
            value: test_size.to_string(),
            constraint: "0 < test_size < 1".to_string(),
        });
    }

    let (n_samples, _) = x.shape();
    if n_samples != y.len() {
        return Err(EspectroError::DimensionMismatch {
            expected: format!("rows={n_samples}"),
            actual: y.len().to_string(),
        });
    }

    let n_test = (n_samples as f32 * test_size).round() as usize;
    let n_train = n_samples - n_test;

    if n_test == 0 || n_train == 0 {
        return Err(EspectroError::Other(format!(
            "split would leave an empty partition (n_train={n_train}, n_test={n_test})"
        )));
    }

    Ok((n_train, n_test))
}

/// Shuffles sample indices with an optional random seed.
fn shuffle_indices(n_samples: usize, random_state: Option<u64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n_samples).collect();

    if let Some(seed) = random_state {
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    } else {
        let mut rng = rand::thread_rng();
        indices.shuffle(&mut rng);
    }

    indices
}

/// Extracts the rows and labels selected by `indices`.
fn extract_samples(x: &Matrix<f32>, y: &[usize], indices: &[usize]) -> (Matrix<f32>, Vec<usize>) {
    let labels = indices.iter().map(|&i| y[i]).collect();
    (x.select_rows(indices), labels)
}

/// Splits features and labels into shuffled train and test partitions.
///
/// The test partition size is `round(n_samples * test_size)`; a fixed
/// `random_state` makes the shuffle reproducible.
///
/// # Errors
///
/// Returns an error when `test_size` falls outside `(0, 1)`, when rows and
/// labels disagree, or when either partition would come out empty.
///
/// # Example
///
/// ```
/// use espectro::model_selection::train_test_split;
/// use espectro::primitives::Matrix;
///
/// let x = Matrix::from_vec(10, 2, (0..20).map(|i| i as f32).collect())
///     .expect("valid matrix dimensions");
/// let y = vec![0, 1, 0, 1, 0, 1, 0, 1, 0, 1];
///
/// let (x_train, x_test, y_train, y_test) =
///     train_test_split(&x, &y, 0.2, Some(42)).expect("valid split arguments");
/// assert_eq!(x_train.n_rows(), 8);
/// assert_eq!(x_test.n_rows(), 2);
/// assert_eq!(y_train.len(), 8);
/// assert_eq!(y_test.len(), 2);
/// ```
#[allow(clippy::type_complexity)]
pub fn train_test_split(
    x: &Matrix<f32>,
    y: &[usize],
    test_size: f32,
    random_state: Option<u64>,
) -> Result<(Matrix<f32>, Matrix<f32>, Vec<usize>, Vec<usize>)> {
    let (n_train, _) = validate_split_inputs(x, y, test_size)?;
    let n_samples = x.n_rows();

    let indices = shuffle_indices(n_samples, random_state);
    let (x_train, y_train) = extract_samples(x, y, &indices[..n_train]);
    let (x_test, y_test) = extract_samples(x, y, &indices[n_train..]);

    Ok((x_train, x_test, y_train, y_test))
}

/// Stratified K-Fold cross-validator.
///
/// Splits each class separately so every fold keeps the overall class
/// proportions. Classes are processed in ascending label order, which keeps
/// the fold assignment deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl StratifiedKFold {
    /// Creates a new stratified cross-validator with `n_splits` folds.
    #[must_use]
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            random_state: None,
        }
    }

    /// Enables shuffling within each class before folding.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Sets the random state for reproducible shuffling (implies shuffle).
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self.shuffle = true;
        self
    }

    /// Generates stratified `(train_indices, test_indices)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error when `n_splits` is below 2 or any class has fewer
    /// samples than there are folds.
    pub fn split(&self, y: &[usize]) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 {
            return Err(EspectroError::InvalidHyperparameter {
                param: "n_splits".to_string(),
                value: self.n_splits.to_string(),
                constraint: ">= 2".to_string(),
            });
        }

        let n_samples = y.len();
        let n_classes = y.iter().max().map_or(0, |&m| m + 1);

        // Group indices by class, in ascending label order.
        let mut class_indices: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (i, &label) in y.iter().enumerate() {
            class_indices[label].push(i);
        }

        for (class, indices) in class_indices.iter().enumerate() {
            if !indices.is_empty() && indices.len() < self.n_splits {
                return Err(EspectroError::InsufficientClassSamples {
                    class: class.to_string(),
                    available: indices.len(),
                    required: self.n_splits,
                });
            }
        }

        if self.shuffle {
            for indices in class_indices.iter_mut() {
                if let Some(seed) = self.random_state {
                    let mut rng = StdRng::seed_from_u64(seed);
                    indices.shuffle(&mut rng);
                } else {
                    let mut rng = rand::thread_rng();
                    indices.shuffle(&mut rng);
                }
            }
        }

        // Distribute each class across folds; earlier folds absorb the
        // remainder so fold sizes differ by at most one per class.
        let mut fold_indices: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        for indices in &class_indices {
            let fold_size = indices.len() / self.n_splits;
            let remainder = indices.len() % self.n_splits;

            let mut start = 0;
            for (i, fold) in fold_indices.iter_mut().enumerate() {
                let current_size = if i < remainder { fold_size + 1 } else { fold_size };
                let end = start + current_size;
                fold.extend_from_slice(&indices[start..end]);
                start = end;
            }
        }

        let mut result = Vec::with_capacity(self.n_splits);
        for i in 0..self.n_splits {
            let test_indices = fold_indices[i].clone();

            let mut train_indices = Vec::with_capacity(n_samples - test_indices.len());
            for (j, fold) in fold_indices.iter().enumerate() {
                if i != j {
                    train_indices.extend_from_slice(fold);
                }
            }

            result.push((train_indices, test_indices));
        }

        Ok(result)
    }
}

/// Hyperparameter grid for [`GridSearchCv`].
///
/// The Cartesian product of all four axes is evaluated; iteration order is
/// `k_neighbors`, then `deformation_factors`, then `truncation_factors`,
/// with `regularization` innermost.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    /// Neighbor counts for the oversampler.
    pub k_neighbors: Vec<usize>,
    /// Deformation factors for the oversampler.
    pub deformation_factors: Vec<f32>,
    /// Truncation factors for the oversampler.
    pub truncation_factors: Vec<f32>,
    /// Inverse regularization strengths for the classifier.
    pub regularization: Vec<f32>,
}

impl ParamGrid {
    /// Number of candidate combinations in the grid.
    #[must_use]
    pub fn n_candidates(&self) -> usize {
        self.k_neighbors.len()
            * self.deformation_factors.len()
            * self.truncation_factors.len()
            * self.regularization.len()
    }

    /// Enumerates every parameter combination in declaration order.
    fn candidates(&self, base: &PipelineParams) -> Vec<PipelineParams> {
        let mut out = Vec::with_capacity(self.n_candidates());
        for &k in &self.k_neighbors {
            for &deformation in &self.deformation_factors {
                for &truncation in &self.truncation_factors {
                    for &c in &self.regularization {
                        let mut params = base.clone();
                        params.k_neighbors = k;
                        params.deformation_factor = deformation;
                        params.truncation_factor = truncation;
                        params.regularization = c;
                        out.push(params);
                    }
                }
            }
        }
        out
    }
}

/// Outcome of an exhaustive grid search.
#[derive(Debug, Clone)]
pub struct GridSearchOutcome {
    /// Parameters of the winning candidate.
    pub best_params: PipelineParams,
    /// Mean cross-validated macro-F1 of the winner.
    pub best_score: f32,
    /// Winning pipeline refitted on the full training set.
    pub best_pipeline: SpectralPipeline,
    /// Number of candidates evaluated.
    pub n_candidates: usize,
}

/// Exhaustive grid search over [`SpectralPipeline`] hyperparameters.
///
/// Every candidate is scored by mean macro-F1 across stratified folds; the
/// first candidate to reach the best score wins ties, then the winner is
/// refitted on the full training set.
#[derive(Debug, Clone)]
pub struct GridSearchCv {
    grid: ParamGrid,
    cv: StratifiedKFold,
}

impl GridSearchCv {
    /// Creates a grid search over `grid`, validated with `cv`.
    #[must_use]
    pub fn new(grid: ParamGrid, cv: StratifiedKFold) -> Self {
        Self { grid, cv }
    }

    /// Runs the search and refits the best candidate.
    ///
    /// `template` supplies the parameters the grid does not vary (component
    /// count, seeds, iteration caps).
    ///
    /// # Errors
    ///
    /// Returns an error on an empty grid, a failed fold split, or a failed
    /// candidate fit.
    pub fn fit(
        &self,
        template: &SpectralPipeline,
        x: &Matrix<f32>,
        y: &[usize],
    ) -> Result<GridSearchOutcome> {
        let candidates = self.grid.candidates(template.params());
        if candidates.is_empty() {
            return Err("parameter grid is empty".into());
        }

        let folds = self.cv.split(y)?;

        let mut best_score = f32::NEG_INFINITY;
        let mut best_params = None;

        for params in candidates {
            let score = self.evaluate_candidate(template, &params, x, y, &folds)?;
            if score > best_score {
                best_score = score;
                best_params = Some(params);
            }
        }

        let best_params = best_params.ok_or_else(|| EspectroError::from("no candidate scored"))?;

        let mut best_pipeline = template.with_params(best_params.clone());
        best_pipeline.fit(x, y)?;

        Ok(GridSearchOutcome {
            best_params,
            best_score,
            best_pipeline,
            n_candidates: self.grid.n_candidates(),
        })
    }

    /// Mean macro-F1 of one candidate across all folds.
    fn evaluate_candidate(
        &self,
        template: &SpectralPipeline,
        params: &PipelineParams,
        x: &Matrix<f32>,
        y: &[usize],
        folds: &[(Vec<usize>, Vec<usize>)],
    ) -> Result<f32> {
        let mut total = 0.0;
        for (train_idx, test_idx) in folds {
            let (x_train, y_train) = extract_samples(x, y, train_idx);
            let (x_test, y_test) = extract_samples(x, y, test_idx);

            let mut pipeline = template.with_params(params.clone());
            pipeline.fit(&x_train, &y_train)?;
            let predictions = pipeline.predict(&x_test)?;

            total += f1_score(&predictions, &y_test, Average::Macro);
        }
        Ok(total / folds.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn counting_matrix(rows: usize, cols: usize) -> Matrix<f32> {
        Matrix::from_vec(rows, cols, (0..rows * cols).map(|i| i as f32).collect())
            .expect("valid dims")
    }

    #[test]
    fn test_train_test_split_sizes() {
        let x = counting_matrix(12, 3);
        let y: Vec<usize> = (0..12).map(|i| i % 2).collect();
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.25, Some(42)).expect("split");
        assert_eq!(x_train.n_rows(), 9);
        assert_eq!(x_test.n_rows(), 3);
        assert_eq!(y_train.len(), 9);
        assert_eq!(y_test.len(), 3);
    }

    #[test]
    fn test_train_test_split_reproducible() {
        let x = counting_matrix(20, 2);
        let y: Vec<usize> = (0..20).map(|i| i % 3).collect();
        let (a_train, _, a_labels, _) = train_test_split(&x, &y, 0.3, Some(7)).expect("split");
        let (b_train, _, b_labels, _) = train_test_split(&x, &y, 0.3, Some(7)).expect("split");
        assert_eq!(a_train.as_slice(), b_train.as_slice());
        assert_eq!(a_labels, b_labels);
    }

    #[test]
    fn test_train_test_split_rows_align_with_labels() {
        // Feature value encodes the label, so alignment survives shuffling.
        let mut data = Vec::new();
        let mut y = Vec::new();
        for i in 0..10 {
            data.push((i % 2) as f32);
            y.push(i % 2);
        }
        let x = Matrix::from_vec(10, 1, data).expect("valid dims");
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.4, Some(1)).expect("split");
        for (i, &label) in y_train.iter().enumerate() {
            assert_eq!(x_train.get(i, 0) as usize, label);
        }
        for (i, &label) in y_test.iter().enumerate() {
            assert_eq!(x_test.get(i, 0) as usize, label);
        }
    }

    #[test]
    fn test_train_test_split_bad_test_size() {
        let x = counting_matrix(4, 1);
        let y = vec![0, 1, 0, 1];
        assert!(train_test_split(&x, &y, 0.0, None).is_err());
        assert!(train_test_split(&x, &y, 1.0, None).is_err());
    }

    #[test]
    fn test_stratified_kfold_preserves_proportions() {
        // 40 samples: 30 of class 0, 10 of class 1.
        let mut y = vec![0usize; 30];
        y.extend(vec![1usize; 10]);

        let skf = StratifiedKFold::new(5).with_random_state(42);
        let splits = skf.split(&y).expect("split");
        assert_eq!(splits.len(), 5);

        for (train_idx, test_idx) in &splits {
            assert_eq!(train_idx.len() + test_idx.len(), 40);
            let test_ones = test_idx.iter().filter(|&&i| y[i] == 1).count();
            assert_eq!(test_ones, 2);
        }
    }

    #[test]
    fn test_stratified_kfold_folds_partition_samples() {
        let y: Vec<usize> = (0..30).map(|i| i % 3).collect();
        let skf = StratifiedKFold::new(5).with_random_state(0);
        let splits = skf.split(&y).expect("split");

        let mut seen = vec![0usize; 30];
        for (_, test_idx) in &splits {
            for &i in test_idx {
                seen[i] += 1;
            }
        }
        // Every sample lands in exactly one test fold.
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_stratified_kfold_deterministic_for_seed() {
        let y: Vec<usize> = (0..25).map(|i| i % 5).collect();
        let a = StratifiedKFold::new(5).with_random_state(9).split(&y).expect("split");
        let b = StratifiedKFold::new(5).with_random_state(9).split(&y).expect("split");
        assert_eq!(a, b);
    }

    #[test]
    fn test_stratified_kfold_small_class_fails() {
        let y = vec![0, 0, 0, 0, 0, 1, 1]; // class 1 has 2 < 5 samples
        let skf = StratifiedKFold::new(5);
        let err = skf.split(&y).expect_err("should fail");
        match err {
            EspectroError::InsufficientClassSamples { class, available, required } => {
                assert_eq!(class, "1");
                assert_eq!(available, 2);
                assert_eq!(required, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_param_grid_candidate_count() {
        let grid = ParamGrid {
            k_neighbors: vec![3, 4],
            deformation_factors: vec![0.25, 0.5, 0.75],
            truncation_factors: vec![-0.5, 0.0, 0.5],
            regularization: vec![1000.0, 100.0, 10.0, 1.0, 0.1],
        };
        assert_eq!(grid.n_candidates(), 90);
    }

    proptest! {
        #[test]
        fn prop_split_partition_sizes(
            n in 4usize..60,
            test_size in 0.1f32..0.9,
            seed in 0u64..1000,
        ) {
            let x = counting_matrix(n, 2);
            let y: Vec<usize> = (0..n).map(|i| i % 2).collect();
            let n_test = (n as f32 * test_size).round() as usize;
            prop_assume!(n_test > 0 && n_test < n);

            let (x_train, x_test, y_train, y_test) =
                train_test_split(&x, &y, test_size, Some(seed)).expect("split");

            prop_assert_eq!(x_train.n_rows(), n - n_test);
            prop_assert_eq!(x_test.n_rows(), n_test);
            prop_assert_eq!(y_train.len() + y_test.len(), n);
        }

        #[test]
        fn prop_split_is_a_permutation(n in 4usize..40, seed in 0u64..1000) {
            // First feature holds the original row index.
            let x = Matrix::from_vec(n, 1, (0..n).map(|i| i as f32).collect())
                .expect("valid dims");
            let y: Vec<usize> = (0..n).map(|i| i % 2).collect();

            let (x_train, x_test, _, _) =
                train_test_split(&x, &y, 0.33, Some(seed)).expect("split");

            let mut seen: Vec<usize> = x_train
                .as_slice()
                .iter()
                .chain(x_test.as_slice())
                .map(|&v| v as usize)
                .collect();
            seen.sort_unstable();
            let expected: Vec<usize> = (0..n).collect();
            prop_assert_eq!(seen, expected);
        }
    }
}
