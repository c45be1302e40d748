//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use espectro::prelude::*;
//! ```

pub use crate::classification::{LogisticRegression, OneVsRest};
pub use crate::dataset::{load_dataset, Dataset};
pub use crate::error::{EspectroError, Result};
pub use crate::metrics::{
    accuracy, classification_report, confusion_matrix, f1_score, normalize_confusion, Average,
};
pub use crate::model_selection::{train_test_split, GridSearchCv, ParamGrid, StratifiedKFold};
pub use crate::oversample::GeometricSmote;
pub use crate::pipeline::{PipelineParams, SpectralPipeline};
pub use crate::plot::plot_confusion_matrix;
pub use crate::preprocessing::Pca;
pub use crate::primitives::{Matrix, Vector};
pub use crate::traits::{Classifier, Resampler, Transformer};
