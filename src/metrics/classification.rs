//! Classification metrics for evaluating classifier performance.
//!
//! Provides accuracy, precision, recall, F1-score, confusion matrix
//! computation and a per-class text report for multi-class tasks.

use crate::primitives::Matrix;

/// Averaging strategy for multi-class metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Average {
    /// Calculate metrics for each label, return unweighted mean.
    Macro,
    /// Calculate metrics globally by counting total TP, FP, FN.
    Micro,
    /// Weighted mean by support (number of true instances per label).
    Weighted,
}

/// Compute classification accuracy.
///
/// accuracy = `correct_predictions` / `total_predictions`
///
/// # Panics
///
/// Panics if slices have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use espectro::metrics::accuracy;
///
/// let y_true = vec![0, 1, 2, 0, 1, 2];
/// let y_pred = vec![0, 2, 1, 0, 0, 1];
/// let acc = accuracy(&y_pred, &y_true);
/// assert!((acc - 0.333333).abs() < 0.001);
/// ```
#[must_use]
pub fn accuracy(y_pred: &[usize], y_true: &[usize]) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    assert!(!y_true.is_empty(), "Slices cannot be empty");

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();

    correct as f32 / y_true.len() as f32
}

/// Number of classes implied by both label slices.
fn infer_n_classes(y_pred: &[usize], y_true: &[usize]) -> usize {
    y_true
        .iter()
        .chain(y_pred.iter())
        .max()
        .map_or(0, |&m| m + 1)
}

/// Per-class true positives, false positives, false negatives and support.
fn compute_tp_fp_fn(
    y_pred: &[usize],
    y_true: &[usize],
    n_classes: usize,
) -> (Vec<usize>, Vec<usize>, Vec<usize>, Vec<usize>) {
    let mut tp = vec![0usize; n_classes];
    let mut fp = vec![0usize; n_classes];
    let mut fn_ = vec![0usize; n_classes];
    let mut support = vec![0usize; n_classes];

    for (&pred, &truth) in y_pred.iter().zip(y_true.iter()) {
        support[truth] += 1;
        if pred == truth {
            tp[truth] += 1;
        } else {
            fp[pred] += 1;
            fn_[truth] += 1;
        }
    }

    (tp, fp, fn_, support)
}

/// Safe ratio, zero when the denominator is zero.
fn ratio(num: usize, den: usize) -> f32 {
    if den == 0 {
        0.0
    } else {
        num as f32 / den as f32
    }
}

/// Averages a per-class metric according to `average`.
fn aggregate(per_class: &[f32], support: &[usize], average: Average, micro: f32) -> f32 {
    match average {
        Average::Micro => micro,
        Average::Macro => {
            if per_class.is_empty() {
                0.0
            } else {
                per_class.iter().sum::<f32>() / per_class.len() as f32
            }
        }
        Average::Weighted => {
            let total: usize = support.iter().sum();
            if total == 0 {
                return 0.0;
            }
            per_class
                .iter()
                .zip(support.iter())
                .map(|(&v, &s)| v * s as f32 / total as f32)
                .sum()
        }
    }
}

/// Compute precision score.
///
/// precision = TP / (TP + FP)
///
/// # Panics
///
/// Panics if slices have different lengths or are empty.
#[must_use]
pub fn precision(y_pred: &[usize], y_true: &[usize], average: Average) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    assert!(!y_true.is_empty(), "Slices cannot be empty");

    let n_classes = infer_n_classes(y_pred, y_true);
    let (tp, fp, _, support) = compute_tp_fp_fn(y_pred, y_true, n_classes);

    let per_class: Vec<f32> = (0..n_classes).map(|i| ratio(tp[i], tp[i] + fp[i])).collect();
    let total_tp: usize = tp.iter().sum();
    let total_fp: usize = fp.iter().sum();
    let micro = ratio(total_tp, total_tp + total_fp);

    aggregate(&per_class, &support, average, micro)
}

/// Compute recall score.
///
/// recall = TP / (TP + FN)
///
/// # Panics
///
/// Panics if slices have different lengths or are empty.
#[must_use]
pub fn recall(y_pred: &[usize], y_true: &[usize], average: Average) -> f32 {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    assert!(!y_true.is_empty(), "Slices cannot be empty");

    let n_classes = infer_n_classes(y_pred, y_true);
    let (tp, _, fn_, support) = compute_tp_fp_fn(y_pred, y_true, n_classes);

    let per_class: Vec<f32> = (0..n_classes).map(|i| ratio(tp[i], tp[i] + fn_[i])).collect();
    let total_tp: usize = tp.iter().sum();
    let total_fn: usize = fn_.iter().sum();
    let micro = ratio(total_tp, total_tp + total_fn);

    aggregate(&per_class, &support, average, micro)
}

/// Harmonic mean of one precision/recall pair.
fn harmonic(p: f32, r: f32) -> f32 {
    if p + r == 0.0 {
        0.0
    } else {
        2.0 * p * r / (p + r)
    }
}

/// Compute the F1 score for each class.
///
/// F1 = 2 * (precision * recall) / (precision + recall)
///
/// # Panics
///
/// Panics if slices have different lengths or are empty.
#[must_use]
pub fn f1_per_class(y_pred: &[usize], y_true: &[usize]) -> Vec<f32> {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    assert!(!y_true.is_empty(), "Slices cannot be empty");

    let n_classes = infer_n_classes(y_pred, y_true);
    let (tp, fp, fn_, _) = compute_tp_fp_fn(y_pred, y_true, n_classes);

    (0..n_classes)
        .map(|i| {
            let p = ratio(tp[i], tp[i] + fp[i]);
            let r = ratio(tp[i], tp[i] + fn_[i]);
            harmonic(p, r)
        })
        .collect()
}

/// Compute F1 score with the requested averaging.
///
/// # Panics
///
/// Panics if slices have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use espectro::metrics::{f1_score, Average};
///
/// let y_true = vec![0, 1, 2, 0, 1, 2];
/// let y_pred = vec![0, 1, 1, 0, 1, 2];
/// let f1 = f1_score(&y_pred, &y_true, Average::Macro);
/// assert!(f1 > 0.7 && f1 <= 1.0);
/// ```
#[must_use]
pub fn f1_score(y_pred: &[usize], y_true: &[usize], average: Average) -> f32 {
    let per_class = f1_per_class(y_pred, y_true);

    let n_classes = infer_n_classes(y_pred, y_true);
    let (tp, fp, fn_, support) = compute_tp_fp_fn(y_pred, y_true, n_classes);

    // Micro F1 equals micro precision equals micro recall.
    let total_tp: usize = tp.iter().sum();
    let total_fp: usize = fp.iter().sum();
    let total_fn: usize = fn_.iter().sum();
    let micro_p = ratio(total_tp, total_tp + total_fp);
    let micro_r = ratio(total_tp, total_tp + total_fn);
    let micro = harmonic(micro_p, micro_r);

    aggregate(&per_class, &support, average, micro)
}

/// Compute the confusion matrix.
///
/// Entry `(i, j)` counts samples of true class `i` predicted as class `j`.
///
/// # Panics
///
/// Panics if slices have different lengths or are empty.
///
/// # Examples
///
/// ```
/// use espectro::metrics::confusion_matrix;
///
/// let y_true = vec![0, 1, 1, 0];
/// let y_pred = vec![0, 1, 0, 0];
/// let cm = confusion_matrix(&y_pred, &y_true);
/// assert_eq!(cm.get(0, 0), 2); // both class-0 samples correct
/// assert_eq!(cm.get(1, 0), 1); // one class-1 sample mistaken for 0
/// ```
#[must_use]
pub fn confusion_matrix(y_pred: &[usize], y_true: &[usize]) -> Matrix<usize> {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    assert!(!y_true.is_empty(), "Slices cannot be empty");

    let n_classes = infer_n_classes(y_pred, y_true);
    let mut counts = vec![0usize; n_classes * n_classes];
    for (&pred, &truth) in y_pred.iter().zip(y_true.iter()) {
        counts[truth * n_classes + pred] += 1;
    }

    Matrix::from_vec(n_classes, n_classes, counts)
        .expect("count buffer is n_classes * n_classes by construction")
}

/// Row-normalizes a confusion matrix so each row sums to one.
///
/// Rows with no samples stay all-zero.
#[must_use]
pub fn normalize_confusion(cm: &Matrix<usize>) -> Matrix<f32> {
    let (rows, cols) = cm.shape();
    let mut data = vec![0.0f32; rows * cols];
    for i in 0..rows {
        let row_sum: usize = (0..cols).map(|j| cm.get(i, j)).sum();
        if row_sum == 0 {
            continue;
        }
        for j in 0..cols {
            data[i * cols + j] = cm.get(i, j) as f32 / row_sum as f32;
        }
    }
    Matrix::from_vec(rows, cols, data).expect("buffer matches source shape by construction")
}

/// Renders a per-class precision/recall/F1 table with accuracy and macro
/// and weighted averages, in the familiar scikit-learn layout.
///
/// `class_names` supplies the row labels, indexed by encoded class; classes
/// beyond the name list fall back to their numeric label.
///
/// # Panics
///
/// Panics if slices have different lengths or are empty.
#[must_use]
pub fn classification_report(y_pred: &[usize], y_true: &[usize], class_names: &[String]) -> String {
    assert_eq!(y_pred.len(), y_true.len(), "Slices must have same length");
    assert!(!y_true.is_empty(), "Slices cannot be empty");

    let n_classes = infer_n_classes(y_pred, y_true);
    let (tp, fp, fn_, support) = compute_tp_fp_fn(y_pred, y_true, n_classes);

    let name_width = class_names
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("weighted avg".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:>name_width$}  {:>9}  {:>9}  {:>9}  {:>9}\n\n",
        "", "precision", "recall", "f1-score", "support"
    ));

    for class in 0..n_classes {
        let p = ratio(tp[class], tp[class] + fp[class]);
        let r = ratio(tp[class], tp[class] + fn_[class]);
        let f1 = harmonic(p, r);
        let fallback = class.to_string();
        let name = class_names.get(class).map_or(fallback.as_str(), String::as_str);
        out.push_str(&format!(
            "{name:>name_width$}  {p:>9.2}  {r:>9.2}  {f1:>9.2}  {:>9}\n",
            support[class]
        ));
    }

    let total: usize = support.iter().sum();
    out.push('\n');
    out.push_str(&format!(
        "{:>name_width$}  {:>9}  {:>9}  {:>9.2}  {total:>9}\n",
        "accuracy",
        "",
        "",
        accuracy(y_pred, y_true)
    ));
    for (label, average) in [("macro avg", Average::Macro), ("weighted avg", Average::Weighted)] {
        out.push_str(&format!(
            "{label:>name_width$}  {:>9.2}  {:>9.2}  {:>9.2}  {total:>9}\n",
            precision(y_pred, y_true, average),
            recall(y_pred, y_true, average),
            f1_score(y_pred, y_true, average)
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_perfect() {
        let y = vec![0, 1, 2, 1];
        assert!((accuracy(&y, &y) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_accuracy_partial() {
        let y_true = vec![0, 1, 2, 0];
        let y_pred = vec![0, 1, 1, 1];
        assert!((accuracy(&y_pred, &y_true) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_precision_and_recall_binary() {
        // pred: 1 1 0 1; true: 1 0 0 1
        // class 1: TP=2, FP=1, FN=0 -> p=2/3, r=1
        let y_true = vec![1, 0, 0, 1];
        let y_pred = vec![1, 1, 0, 1];
        let (tp, fp, fn_, _) = compute_tp_fp_fn(&y_pred, &y_true, 2);
        assert_eq!((tp[1], fp[1], fn_[1]), (2, 1, 0));

        let p = precision(&y_pred, &y_true, Average::Macro);
        let r = recall(&y_pred, &y_true, Average::Macro);
        // class 0: p=1, r=1/2; class 1: p=2/3, r=1
        assert!((p - (1.0 + 2.0 / 3.0) / 2.0).abs() < 1e-6);
        assert!((r - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_f1_macro_perfect_predictions() {
        let y = vec![0, 1, 2, 0, 1, 2, 1];
        assert!((f1_score(&y, &y, Average::Macro) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_f1_macro_constant_predictor_below_class_ratio() {
        // Always answering the dominant class scores high on it and zero on
        // the rest, pulling macro-F1 under 1/n_classes.
        let mut y_true = vec![0usize; 8];
        y_true.push(1);
        y_true.push(2);
        let y_pred = vec![0usize; 10];
        let macro_f1 = f1_score(&y_pred, &y_true, Average::Macro);
        assert!(macro_f1 > 0.0);
        assert!(macro_f1 < 1.0 / 3.0, "macro-F1 {macro_f1} not below 1/3");
    }

    #[test]
    fn test_f1_macro_known_value() {
        let y_true = vec![1, 0, 0, 1];
        let y_pred = vec![1, 1, 0, 1];
        // class 0: f1 = 2*(1*0.5)/1.5 = 2/3; class 1: f1 = 2*(2/3)/(5/3) = 0.8
        let f1 = f1_score(&y_pred, &y_true, Average::Macro);
        assert!((f1 - (2.0 / 3.0 + 0.8) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_f1_micro_equals_accuracy_when_all_classes_present() {
        let y_true = vec![0, 1, 2, 0, 1, 2, 0];
        let y_pred = vec![0, 2, 2, 0, 1, 1, 1];
        let micro = f1_score(&y_pred, &y_true, Average::Micro);
        assert!((micro - accuracy(&y_pred, &y_true)).abs() < 1e-6);
    }

    #[test]
    fn test_f1_weighted_favors_large_classes() {
        // Class 0 (support 4) predicted perfectly, class 1 (support 1) missed.
        let y_true = vec![0, 0, 0, 0, 1];
        let y_pred = vec![0, 0, 0, 0, 0];
        let weighted = f1_score(&y_pred, &y_true, Average::Weighted);
        let macro_ = f1_score(&y_pred, &y_true, Average::Macro);
        assert!(weighted > macro_);
    }

    #[test]
    fn test_f1_per_class_absent_class_is_zero() {
        let y_true = vec![0, 0, 2, 2];
        let y_pred = vec![0, 0, 2, 2];
        let per_class = f1_per_class(&y_pred, &y_true);
        assert_eq!(per_class.len(), 3);
        assert!((per_class[1] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_confusion_matrix_layout() {
        let y_true = vec![0, 0, 1, 1, 2];
        let y_pred = vec![0, 1, 1, 1, 0];
        let cm = confusion_matrix(&y_pred, &y_true);
        assert_eq!(cm.shape(), (3, 3));
        assert_eq!(cm.get(0, 0), 1);
        assert_eq!(cm.get(0, 1), 1);
        assert_eq!(cm.get(1, 1), 2);
        assert_eq!(cm.get(2, 0), 1);
        // Total count equals the number of samples.
        let total: usize = (0..3).flat_map(|i| (0..3).map(move |j| (i, j)))
            .map(|(i, j)| cm.get(i, j))
            .sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_normalize_confusion_rows_sum_to_one() {
        let y_true = vec![0, 0, 0, 1, 1, 2];
        let y_pred = vec![0, 0, 1, 1, 1, 0];
        let norm = normalize_confusion(&confusion_matrix(&y_pred, &y_true));
        for i in 0..3 {
            let row_sum: f32 = (0..3).map(|j| norm.get(i, j)).sum();
            assert!((row_sum - 1.0).abs() < 1e-6, "row {i} sums to {row_sum}");
        }
    }

    #[test]
    fn test_normalize_confusion_empty_row_stays_zero() {
        let cm = Matrix::from_vec(2, 2, vec![3usize, 1, 0, 0]).expect("valid dims");
        let norm = normalize_confusion(&cm);
        assert!((norm.get(1, 0)).abs() < 1e-6);
        assert!((norm.get(1, 1)).abs() < 1e-6);
    }

    #[test]
    fn test_classification_report_structure() {
        let y_true = vec![0, 0, 1, 1, 1];
        let y_pred = vec![0, 1, 1, 1, 0];
        let names = vec!["corn".to_string(), "wheat".to_string()];
        let report = classification_report(&y_pred, &y_true, &names);
        assert!(report.contains("precision"));
        assert!(report.contains("corn"));
        assert!(report.contains("wheat"));
        assert!(report.contains("accuracy"));
        assert!(report.contains("macro avg"));
        assert!(report.contains("weighted avg"));
    }

    #[test]
    fn test_classification_report_numeric_fallback() {
        let y_true = vec![0, 1, 2];
        let y_pred = vec![0, 1, 2];
        let names = vec!["a".to_string()]; // too short on purpose
        let report = classification_report(&y_pred, &y_true, &names);
        assert!(report.contains('2'));
    }
}
