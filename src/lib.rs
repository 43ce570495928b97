//! A thread-safe fake-review detector built on a TF-IDF text classification pipeline.
//!
//! The pipeline normalizes raw review text, vectorizes it with a frozen n-gram
//! TF-IDF vocabulary and classifies it with a regularized logistic regression
//! model, returning a label (`real` or `fake`) plus a confidence score.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use reviewguard::{corpus, pipeline, TrainOptions};
//!
//! let base = corpus::synth::base_templates();
//! let records = corpus::synth::enhance(&base, 5, 42);
//! let prepared = corpus::prepare(&records, &corpus::CorpusOptions::default());
//!
//! let (pipeline, report) = pipeline::train(&prepared, &TrainOptions::default())?;
//! println!("held-out accuracy: {:.2}", report.held_out.accuracy);
//!
//! let prediction = pipeline.predict("Great product, fast shipping!")?;
//! println!("{} ({:.2}%)", prediction.label, prediction.confidence);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! A loaded [`Detector`] is immutable and can be shared across threads with
//! `Arc`; concurrent `predict` calls need no locking:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use reviewguard::{corpus, pipeline, Detector, TrainOptions};
//! use std::sync::Arc;
//! use std::thread;
//!
//! # let base = corpus::synth::base_templates();
//! # let records = corpus::synth::enhance(&base, 5, 42);
//! # let prepared = corpus::prepare(&records, &corpus::CorpusOptions::default());
//! # let (trained, _) = pipeline::train(&prepared, &TrainOptions::default())?;
//! let detector = Arc::new(Detector::from_pipeline(trained));
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let detector = Arc::clone(&detector);
//!     handles.push(thread::spawn(move || {
//!         detector.predict("works exactly as described").unwrap();
//!     }));
//! }
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod classifier;
pub mod corpus;
pub mod detector;
pub mod normalize;
pub mod scraper;

pub use artifact::{ArtifactError, ArtifactStore};
pub use classifier::pipeline::{
    self, BatchReport, BatchSample, Prediction, TrainOptions, TrainReport, TrainedPipeline,
};
pub use classifier::{ClassifierError, ConfidenceStrategy, Label};
pub use detector::Detector;
pub use normalize::Normalizer;
pub use scraper::{ScrapeError, ScrapeOptions};

pub fn init_logger() {
    env_logger::init();
}
