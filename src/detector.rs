//! The serving-time detector: a two-state wrapper around the trained
//! pipeline.
//!
//! A `Detector` is either `Loaded` or `Unavailable`. Opening a store never
//! fails the caller: a load error produces an `Unavailable` detector whose
//! every inference call returns [`ClassifierError::ModelUnavailable`], so a
//! service can start without a model and report the condition per request
//! rather than crash.

use log::{error, info};
use std::sync::Arc;

use crate::artifact::ArtifactStore;
use crate::classifier::pipeline::{BatchReport, Prediction, TrainedPipeline};
use crate::classifier::ClassifierError;

enum State {
    Loaded(Arc<TrainedPipeline>),
    Unavailable(String),
}

/// Thread-safe review-authenticity detector.
///
/// The pipeline is immutable once loaded, so a `Detector` can be shared
/// across threads with `Arc` and serve concurrent predictions without
/// locking. There is no reload path: replacing the model means training a
/// new artifact and constructing a new detector.
pub struct Detector {
    state: State,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Detector>();
    }
};

impl Detector {
    /// Loads the artifact from `store`. Failure yields an unavailable
    /// detector, never an error.
    pub fn open(store: &ArtifactStore) -> Detector {
        match store.load() {
            Ok(pipeline) => {
                info!(
                    "detector ready ({} features, strategy {:?})",
                    pipeline.vocabulary_size(),
                    pipeline.confidence_strategy()
                );
                Self::from_pipeline(pipeline)
            }
            Err(e) => {
                error!("failed to load model artifact: {e}");
                Detector {
                    state: State::Unavailable(e.to_string()),
                }
            }
        }
    }

    /// Wraps an already-constructed pipeline (e.g. fresh from training).
    pub fn from_pipeline(pipeline: TrainedPipeline) -> Detector {
        Detector {
            state: State::Loaded(Arc::new(pipeline)),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, State::Loaded(_))
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            State::Loaded(_) => None,
            State::Unavailable(reason) => Some(reason),
        }
    }

    fn pipeline(&self) -> Result<&TrainedPipeline, ClassifierError> {
        match &self.state {
            State::Loaded(pipeline) => Ok(pipeline),
            State::Unavailable(reason) => {
                Err(ClassifierError::ModelUnavailable(reason.clone()))
            }
        }
    }

    /// Classifies one raw review string.
    pub fn predict(&self, raw: &str) -> Result<Prediction, ClassifierError> {
        self.pipeline()?.predict(raw)
    }

    /// Classifies a batch of raw review strings.
    pub fn predict_batch(&self, raws: &[String]) -> Result<Vec<Prediction>, ClassifierError> {
        self.pipeline()?.predict_batch(raws)
    }

    /// Classifies a scraped batch and aggregates per-label counts and
    /// percentages. Zero reviews (a failed or blocked scrape) is a data
    /// error, not a crash.
    pub fn analyze(&self, reviews: &[String]) -> Result<BatchReport, ClassifierError> {
        let pipeline = self.pipeline()?;
        if reviews.is_empty() {
            return Err(ClassifierError::Data(
                "no reviews to classify (empty scrape result)".into(),
            ));
        }
        let predictions = pipeline.predict_batch(reviews)?;
        BatchReport::from_predictions(reviews, &predictions)
    }
}
