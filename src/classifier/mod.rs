use serde::{Deserialize, Serialize};
use std::fmt;

mod error;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod vectorizer;

pub use error::ClassifierError;
pub use metrics::{CvScores, Evaluation};
pub use model::{LogisticRegression, LogisticRegressionCv};
pub use pipeline::{Prediction, TrainOptions, TrainReport, TrainedPipeline};
pub use vectorizer::TfidfVectorizer;

/// Review authenticity label. The variant order is fixed and is the order
/// used everywhere a per-class breakdown appears (confusion matrix rows and
/// columns, report lines, probability pairs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Fake,
    Real,
}

impl Label {
    pub const ORDERED: [Label; 2] = [Label::Fake, Label::Real];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Fake => "fake",
            Label::Real => "real",
        }
    }

    /// Parses a corpus label value. Anything other than exactly `"real"` or
    /// `"fake"` is rejected.
    pub fn parse(value: &str) -> Result<Label, ClassifierError> {
        match value {
            "fake" => Ok(Label::Fake),
            "real" => Ok(Label::Real),
            other => Err(ClassifierError::Data(format!(
                "unknown label value: {other:?} (expected \"real\" or \"fake\")"
            ))),
        }
    }

    /// Index of this label in [`Label::ORDERED`].
    pub fn index(&self) -> usize {
        match self {
            Label::Fake => 0,
            Label::Real => 1,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a pipeline turns classifier output into a confidence percentage.
/// Resolved once when the pipeline is assembled, in this priority order,
/// and stored in the artifact; it is never re-probed per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceStrategy {
    /// `100 x` the maximum class probability.
    Probability,
    /// `100 / (1 + e^-|score|)` over the decision margin. Maps a zero margin
    /// to 50 and large margins toward 100; it can never report below 50, so
    /// a value near 50 means "near-zero margin", not "balanced classes".
    DecisionMargin,
    /// Fixed 60.0 placeholder when the classifier exposes neither.
    Fixed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse() {
        assert_eq!(Label::parse("real").unwrap(), Label::Real);
        assert_eq!(Label::parse("fake").unwrap(), Label::Fake);
        assert!(matches!(
            Label::parse("REAL"),
            Err(ClassifierError::Data(_))
        ));
        assert!(matches!(Label::parse(""), Err(ClassifierError::Data(_))));
    }

    #[test]
    fn test_label_order() {
        assert_eq!(Label::Fake.index(), 0);
        assert_eq!(Label::Real.index(), 1);
        assert_eq!(Label::ORDERED[Label::Real.index()], Label::Real);
    }

    #[test]
    fn test_label_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Label::Real).unwrap(), "\"real\"");
        assert_eq!(
            serde_json::from_str::<Label>("\"fake\"").unwrap(),
            Label::Fake
        );
    }
}
