//! Evaluation and reporting for the held-out split and cross-validation.

use serde::Serialize;
use std::fmt;

use super::Label;

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClassReport {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Held-out evaluation: per-class metrics, overall accuracy, macro-F1 and a
/// 2x2 confusion matrix with rows = true label, columns = predicted label,
/// both ordered as [`Label::ORDERED`] (fake, real).
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub macro_f1: f64,
    pub per_class: [ClassReport; 2],
    pub confusion: [[usize; 2]; 2],
}

fn safe_div(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Computes the evaluation over parallel truth/prediction slices.
pub fn evaluate(truth: &[Label], predicted: &[Label]) -> Evaluation {
    debug_assert_eq!(truth.len(), predicted.len());

    let mut confusion = [[0usize; 2]; 2];
    for (t, p) in truth.iter().zip(predicted.iter()) {
        confusion[t.index()][p.index()] += 1;
    }

    let total = truth.len();
    let correct = confusion[0][0] + confusion[1][1];

    let mut per_class = [ClassReport {
        precision: 0.0,
        recall: 0.0,
        f1: 0.0,
        support: 0,
    }; 2];

    for (i, report) in per_class.iter_mut().enumerate() {
        let tp = confusion[i][i] as f64;
        let predicted_as = (confusion[0][i] + confusion[1][i]) as f64;
        let support = confusion[i][0] + confusion[i][1];
        let precision = safe_div(tp, predicted_as);
        let recall = safe_div(tp, support as f64);
        *report = ClassReport {
            precision,
            recall,
            f1: safe_div(2.0 * precision * recall, precision + recall),
            support,
        };
    }

    Evaluation {
        accuracy: safe_div(correct as f64, total as f64),
        macro_f1: (per_class[0].f1 + per_class[1].f1) / 2.0,
        per_class,
        confusion,
    }
}

/// Macro-averaged F1 across both classes.
pub fn macro_f1(truth: &[Label], predicted: &[Label]) -> f64 {
    evaluate(truth, predicted).macro_f1
}

/// Cross-validation stability signal: fold scores with their mean and
/// standard deviation.
#[derive(Debug, Clone, Serialize)]
pub struct CvScores {
    pub scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
}

impl CvScores {
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n = scores.len().max(1) as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Self {
            scores,
            mean,
            std: var.sqrt(),
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>10} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (label, report) in Label::ORDERED.iter().zip(self.per_class.iter()) {
            writeln!(
                f,
                "{:>10} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                label.as_str(),
                report.precision,
                report.recall,
                report.f1,
                report.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "accuracy: {:.4}  macro-F1: {:.4}", self.accuracy, self.macro_f1)?;
        writeln!(f, "confusion matrix (rows = true, cols = predicted; fake, real):")?;
        for row in &self.confusion {
            writeln!(f, "  [{:>6} {:>6}]", row[0], row[1])?;
        }
        Ok(())
    }
}

impl fmt::Display for CvScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} +/- {:.4}", self.mean, self.std)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::{Fake, Real};

    #[test]
    fn test_perfect_predictions() {
        let truth = [Fake, Fake, Real, Real];
        let eval = evaluate(&truth, &truth);
        assert_eq!(eval.accuracy, 1.0);
        assert_eq!(eval.macro_f1, 1.0);
        assert_eq!(eval.confusion, [[2, 0], [0, 2]]);
    }

    #[test]
    fn test_confusion_orientation() {
        // One real review predicted fake: row = true (real), col = predicted
        // (fake) -> confusion[1][0].
        let truth = [Real, Fake];
        let predicted = [Fake, Fake];
        let eval = evaluate(&truth, &predicted);
        assert_eq!(eval.confusion, [[1, 0], [1, 0]]);
        assert_eq!(eval.accuracy, 0.5);
    }

    #[test]
    fn test_per_class_metrics() {
        let truth = [Fake, Fake, Fake, Real, Real, Real];
        let predicted = [Fake, Fake, Real, Real, Real, Fake];
        let eval = evaluate(&truth, &predicted);
        let fake = &eval.per_class[Fake.index()];
        assert!((fake.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((fake.recall - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(fake.support, 3);
    }

    #[test]
    fn test_absent_predicted_class_is_zero_not_nan() {
        let truth = [Fake, Real];
        let predicted = [Fake, Fake];
        let eval = evaluate(&truth, &predicted);
        let real = &eval.per_class[Real.index()];
        assert_eq!(real.precision, 0.0);
        assert_eq!(real.f1, 0.0);
        assert!(eval.macro_f1.is_finite());
    }

    #[test]
    fn test_cv_scores_mean_std() {
        let cv = CvScores::from_scores(vec![0.8, 1.0]);
        assert!((cv.mean - 0.9).abs() < 1e-12);
        assert!((cv.std - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_report_renders() {
        let truth = [Fake, Real];
        let eval = evaluate(&truth, &truth);
        let rendered = eval.to_string();
        assert!(rendered.contains("fake"));
        assert!(rendered.contains("real"));
        assert!(rendered.contains("confusion matrix"));
    }
}
