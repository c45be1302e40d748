//! Espectro: hyperspectral land-use classification in pure Rust.
//!
//! Espectro implements the full Indian Pines workflow: load a banded CSV,
//! split it, reduce the 220 spectral bands with PCA, balance the minority
//! crop classes with geometric oversampling, classify one-vs-rest, and tune
//! the whole pipeline with a stratified grid search scored by macro-F1.
//!
//! # Quick Start
//!
//! ```
//! use espectro::prelude::*;
//!
//! // Two well-separated spectral clusters, class 1 in the minority.
//! let mut data = Vec::new();
//! let mut labels = Vec::new();
//! for i in 0..12 {
//!     let base = if i < 8 { 0.0 } else { 6.0 };
//!     data.extend_from_slice(&[base + i as f32 * 0.1, base, base * 0.5]);
//!     labels.push(usize::from(i >= 8));
//! }
//! let x = Matrix::from_vec(12, 3, data).unwrap();
//!
//! let params = PipelineParams { n_components: 2, k_neighbors: 2, ..Default::default() };
//! let mut pipeline = SpectralPipeline::new(params).with_random_state(0);
//! pipeline.fit(&x, &labels).unwrap();
//!
//! let predictions = pipeline.predict(&x).unwrap();
//! assert!(f1_score(&predictions, &labels, Average::Macro) > 0.9);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`dataset`]: CSV loading and label encoding
//! - [`preprocessing`]: Data transformers (PCA)
//! - [`oversample`]: Geometric SMOTE minority oversampling
//! - [`classification`]: Logistic regression and one-vs-rest
//! - [`pipeline`]: The fixed reduce/balance/classify pipeline
//! - [`model_selection`]: Splitting, stratified K-fold and grid search
//! - [`metrics`]: Evaluation metrics and the classification report
//! - [`plot`]: Confusion matrix heatmap rendering

pub mod classification;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod model_selection;
pub mod oversample;
pub mod pipeline;
pub mod plot;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod traits;

pub use error::{EspectroError, Result};
