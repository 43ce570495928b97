//! The trained pipeline: normalization, vectorization and classification
//! composed into one immutable artifact, plus the training procedure that
//! produces it.

use log::info;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ClassifierError;
use super::metrics::{self, CvScores, Evaluation};
use super::model::{FitConfig, LogisticRegression, LogisticRegressionCv};
use super::vectorizer::TfidfVectorizer;
use super::{ConfidenceStrategy, Label};
use crate::corpus::{stratified_kfold, stratified_split, LabeledText};
use crate::normalize::Normalizer;

/// Confidence reported when the classifier exposes neither probabilities nor
/// a decision score. An explicit "unknown confidence" placeholder, not a
/// calibrated value.
pub const FALLBACK_CONFIDENCE: f64 = 60.0;

/// Maps a decision margin onto [50, 100]. A zero margin (maximally
/// uncertain) maps to 50; large margins approach 100. Values near 50 mean
/// "near-zero margin", not "balanced between classes".
pub fn margin_confidence(score: f64) -> f64 {
    100.0 / (1.0 + (-score.abs()).exp())
}

/// Training configuration. Defaults mirror the production training job:
/// 80/20 stratified split with seed 42, 15k-feature trigram TF-IDF, 5-fold
/// cross-validated regularization selection.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub test_ratio: f64,
    pub seed: u64,
    pub max_features: usize,
    pub ngram_range: (usize, usize),
    pub cv_folds: usize,
    pub c_grid: Vec<f64>,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
            max_features: 15_000,
            ngram_range: (1, 3),
            cv_folds: 5,
            c_grid: vec![0.1, 1.0, 10.0],
        }
    }
}

/// A single prediction: the label plus a confidence percentage in [0, 100].
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub label: Label,
    pub confidence: f64,
}

impl Prediction {
    pub fn confidence_display(&self) -> String {
        format!("{:.2}%", self.confidence)
    }
}

/// One review/prediction pair included in a batch report.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSample {
    pub review: String,
    pub prediction: Label,
}

/// Aggregate over a classified batch. `fake_count + real_count` always
/// equals `total_reviews`, and the two percentages sum to 100 modulo
/// rounding to 2 decimals.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub total_reviews: usize,
    pub fake_count: usize,
    pub real_count: usize,
    pub fake_percent: f64,
    pub real_percent: f64,
    pub samples: Vec<BatchSample>,
}

/// Number of review/prediction pairs echoed back in a batch report.
const BATCH_SAMPLE_LIMIT: usize = 10;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl BatchReport {
    /// Aggregates parallel reviews and predictions. Empty input is a data
    /// error: there is nothing meaningful to aggregate.
    pub fn from_predictions(
        reviews: &[String],
        predictions: &[Prediction],
    ) -> Result<Self, ClassifierError> {
        if predictions.is_empty() {
            return Err(ClassifierError::Data(
                "no reviews to aggregate (empty batch)".into(),
            ));
        }
        let total = predictions.len();
        let fake_count = predictions
            .iter()
            .filter(|p| p.label == Label::Fake)
            .count();
        let real_count = total - fake_count;
        let samples = reviews
            .iter()
            .zip(predictions.iter())
            .take(BATCH_SAMPLE_LIMIT)
            .map(|(review, p)| BatchSample {
                review: review.clone(),
                prediction: p.label,
            })
            .collect();
        Ok(Self {
            total_reviews: total,
            fake_count,
            real_count,
            fake_percent: round2(fake_count as f64 / total as f64 * 100.0),
            real_percent: round2(real_count as f64 / total as f64 * 100.0),
            samples,
        })
    }
}

/// The fitted pipeline: frozen vectorizer state, classifier parameters and
/// the confidence strategy resolved at assembly time, persisted together as
/// one atomic artifact. Never mutated after construction; replacing it
/// requires retraining and swapping the artifact wholesale.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedPipeline {
    vectorizer: TfidfVectorizer,
    model: LogisticRegression,
    confidence_strategy: ConfidenceStrategy,
    #[serde(skip, default)]
    normalizer: Normalizer,
}

impl TrainedPipeline {
    /// Resolves the confidence strategy once, in priority order, from the
    /// capabilities the classifier actually exposes.
    fn assemble(vectorizer: TfidfVectorizer, model: LogisticRegression) -> Self {
        let probe = Array1::zeros(vectorizer.vocabulary_size());
        let confidence_strategy = if model.probabilities(&probe).is_some() {
            ConfidenceStrategy::Probability
        } else if model.decision_score(&probe).is_some() {
            ConfidenceStrategy::DecisionMargin
        } else {
            ConfidenceStrategy::Fixed
        };
        Self {
            vectorizer,
            model,
            confidence_strategy,
            normalizer: Normalizer::new(),
        }
    }

    pub fn confidence_strategy(&self) -> ConfidenceStrategy {
        self.confidence_strategy
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    /// Classifies one raw review. Blank or whitespace-only input is rejected
    /// before normalization; input that merely normalizes to the empty
    /// string (all punctuation or stopwords) still classifies, on the zero
    /// feature vector.
    pub fn predict(&self, raw: &str) -> Result<Prediction, ClassifierError> {
        if raw.trim().is_empty() {
            return Err(ClassifierError::Validation(
                "review text is blank".into(),
            ));
        }

        let normalized = self.normalizer.normalize(raw);
        let x = self.vectorizer.transform(&normalized);
        let label = self.model.predict(&x);

        let confidence = match self.confidence_strategy {
            ConfidenceStrategy::Probability => self
                .model
                .probabilities(&x)
                .map(|p| 100.0 * p[0].max(p[1]))
                .unwrap_or(FALLBACK_CONFIDENCE),
            ConfidenceStrategy::DecisionMargin => self
                .model
                .decision_score(&x)
                .map(margin_confidence)
                .unwrap_or(FALLBACK_CONFIDENCE),
            ConfidenceStrategy::Fixed => FALLBACK_CONFIDENCE,
        };

        Ok(Prediction { label, confidence })
    }

    /// Classifies a batch with the same per-item pipeline. An empty batch is
    /// a validation error.
    pub fn predict_batch(&self, raws: &[String]) -> Result<Vec<Prediction>, ClassifierError> {
        if raws.is_empty() {
            return Err(ClassifierError::Validation(
                "batch contains no reviews".into(),
            ));
        }
        raws.iter().map(|raw| self.predict(raw)).collect()
    }
}

/// Training report: held-out evaluation, whole-corpus cross-validation
/// stability, and the fitted shape.
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub held_out: Evaluation,
    pub cv: CvScores,
    pub selected_c: f64,
    pub vocabulary_size: usize,
    pub train_size: usize,
    pub test_size: usize,
}

impl fmt::Display for TrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "trained on {} reviews, evaluated on {} (vocabulary: {}, c = {})",
            self.train_size, self.test_size, self.vocabulary_size, self.selected_c
        )?;
        writeln!(f, "{}", self.held_out)?;
        write!(f, "cross-validation macro-F1: {}", self.cv)
    }
}

/// Fits the full pipeline on a normalized, labeled corpus.
///
/// Splits stratified 80/20 (seeded), fits the TF-IDF vectorizer on the
/// training split only, selects the regularization strength by stratified
/// 5-fold CV, evaluates on the held-out split, and additionally reports a
/// whole-corpus 5-fold macro-F1 mean and deviation as a stability signal.
pub fn train(
    corpus: &[LabeledText],
    options: &TrainOptions,
) -> Result<(TrainedPipeline, TrainReport), ClassifierError> {
    if corpus.is_empty() {
        return Err(ClassifierError::Data("training corpus is empty".into()));
    }

    let (train_set, test_set) = stratified_split(corpus, options.test_ratio, options.seed)?;
    info!(
        "training on {} reviews, holding out {}",
        train_set.len(),
        test_set.len()
    );

    let mut vectorizer =
        TfidfVectorizer::new(options.ngram_range, options.max_features, true);
    let train_docs: Vec<&str> = train_set.iter().map(|t| t.text.as_str()).collect();
    vectorizer.fit(&train_docs)?;

    let train_x: Vec<Array1<f64>> =
        train_docs.iter().map(|d| vectorizer.transform(d)).collect();
    let train_y: Vec<Label> = train_set.iter().map(|t| t.label).collect();

    let cv = LogisticRegressionCv {
        c_grid: options.c_grid.clone(),
        folds: options.cv_folds,
        seed: options.seed,
        base: FitConfig::default(),
    };
    let model = cv.fit(&train_x, &train_y)?;
    let selected_c = model.c();

    let truth: Vec<Label> = test_set.iter().map(|t| t.label).collect();
    let predicted: Vec<Label> = test_set
        .iter()
        .map(|t| model.predict(&vectorizer.transform(&t.text)))
        .collect();
    let held_out = metrics::evaluate(&truth, &predicted);
    info!("held-out accuracy: {:.4}", held_out.accuracy);

    let cv_scores = cross_validate(corpus, options, selected_c)?;
    info!("cross-validation macro-F1: {cv_scores}");

    let vocabulary_size = vectorizer.vocabulary_size();
    let report = TrainReport {
        held_out,
        cv: cv_scores,
        selected_c,
        vocabulary_size,
        train_size: train_set.len(),
        test_size: test_set.len(),
    };
    Ok((TrainedPipeline::assemble(vectorizer, model), report))
}

/// Stratified k-fold over the entire corpus, refitting the vectorizer and a
/// classifier (at the already-selected regularization strength) per fold.
fn cross_validate(
    corpus: &[LabeledText],
    options: &TrainOptions,
    c: f64,
) -> Result<CvScores, ClassifierError> {
    let labels: Vec<Label> = corpus.iter().map(|t| t.label).collect();
    let folds = stratified_kfold(&labels, options.cv_folds, options.seed)?;
    let config = FitConfig {
        c,
        ..FitConfig::default()
    };

    let mut scores = Vec::with_capacity(folds.len());
    for (train_idx, test_idx) in &folds {
        let mut vectorizer =
            TfidfVectorizer::new(options.ngram_range, options.max_features, true);
        let docs: Vec<&str> = train_idx.iter().map(|&i| corpus[i].text.as_str()).collect();
        vectorizer.fit(&docs)?;

        let x: Vec<Array1<f64>> = docs.iter().map(|d| vectorizer.transform(d)).collect();
        let y: Vec<Label> = train_idx.iter().map(|&i| corpus[i].label).collect();
        let model = LogisticRegression::fit(&x, &y, &config)?;

        let truth: Vec<Label> = test_idx.iter().map(|&i| corpus[i].label).collect();
        let predicted: Vec<Label> = test_idx
            .iter()
            .map(|&i| model.predict(&vectorizer.transform(&corpus[i].text)))
            .collect();
        scores.push(metrics::macro_f1(&truth, &predicted));
    }
    Ok(CvScores::from_scores(scores))
}
