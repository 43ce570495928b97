/// Errors surfaced by the classification pipeline. All three variants are
/// recoverable at the serving boundary; callers are expected to translate
/// each into a distinct response rather than let any propagate unhandled.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The model artifact failed to load or was never loaded. Every
    /// inference call fails fast with this; no partial result is computed.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    /// Caller-supplied input violates a precondition (blank review, empty
    /// batch, missing product identifier).
    #[error("validation error: {0}")]
    Validation(String),
    /// Training or batch-aggregation input is structurally invalid (missing
    /// columns, unknown label values, zero usable rows, empty scrape).
    #[error("data error: {0}")]
    Data(String),
}
