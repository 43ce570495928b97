//! Weighted n-gram feature extraction.
//!
//! Converts normalized review text into a fixed-dimension TF-IDF vector over
//! a vocabulary learned once at training time. The vocabulary is frozen after
//! `fit`; serving-time `transform` never extends it.

use log::info;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::error::ClassifierError;
use crate::normalize::Normalizer;

/// TF-IDF vectorizer over word n-grams (unigrams through trigrams by
/// default), bounded to a maximum vocabulary size, with smoothed IDF,
/// optional sub-linear TF scaling and L2 row normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    ngram_range: (usize, usize),
    max_features: usize,
    sublinear_tf: bool,
    /// Term -> feature index, fixed after `fit`.
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per feature index.
    idf: Vec<f64>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new((1, 3), 15_000, true)
    }
}

impl TfidfVectorizer {
    pub fn new(ngram_range: (usize, usize), max_features: usize, sublinear_tf: bool) -> Self {
        Self {
            ngram_range: (ngram_range.0.max(1), ngram_range.1.max(ngram_range.0.max(1))),
            max_features,
            sublinear_tf,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Extracts the n-gram terms of one document. Stopwords are dropped here
    /// a second time, independently of the normalizer's own removal.
    fn terms(&self, document: &str) -> Vec<String> {
        let stop = Normalizer::shared();
        let tokens: Vec<&str> = document
            .split_whitespace()
            .filter(|t| !stop.is_stopword(t))
            .collect();

        let mut terms = Vec::new();
        for n in self.ngram_range.0..=self.ngram_range.1 {
            for ngram in tokens.windows(n) {
                terms.push(ngram.join(" "));
            }
        }
        terms
    }

    /// Learns the vocabulary and IDF weights from the training documents.
    /// Keeps the `max_features` most frequent terms (ties broken
    /// alphabetically), then indexes them in sorted order so the layout is
    /// deterministic.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<(), ClassifierError> {
        if documents.is_empty() {
            return Err(ClassifierError::Data(
                "cannot fit vectorizer on an empty corpus".into(),
            ));
        }

        let n_docs = documents.len();
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = self.terms(doc.as_ref());
            let unique: HashSet<&String> = terms.iter().collect();
            for term in &unique {
                *doc_freq.entry((*term).clone()).or_insert(0) += 1;
            }
            for term in terms {
                *term_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        if ranked.is_empty() {
            return Err(ClassifierError::Data(
                "vocabulary is empty after fitting (all documents normalized to nothing)".into(),
            ));
        }

        let mut selected: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        selected.sort();

        self.vocabulary = selected
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();

        // Smoothed IDF: ln((1 + N) / (1 + df)) + 1.
        self.idf = vec![0.0; self.vocabulary.len()];
        for (term, &idx) in &self.vocabulary {
            let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
            self.idf[idx] = ((1.0 + n_docs as f64) / (1.0 + df)).ln() + 1.0;
        }

        info!(
            "fitted vectorizer: {} features over {} documents",
            self.vocabulary.len(),
            n_docs
        );
        Ok(())
    }

    /// Maps one document onto the frozen vocabulary. Unknown terms are
    /// ignored; a document with no known terms (including the empty string)
    /// yields the zero vector.
    pub fn transform(&self, document: &str) -> Array1<f64> {
        let mut counts = vec![0.0f64; self.vocabulary.len()];
        for term in self.terms(document) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                counts[idx] += 1.0;
            }
        }

        let mut weights: Vec<f64> = counts
            .iter()
            .zip(self.idf.iter())
            .map(|(&tf, &idf)| {
                let tf = if self.sublinear_tf && tf > 0.0 {
                    1.0 + tf.ln()
                } else {
                    tf
                };
                tf * idf
            })
            .collect();

        let norm: f64 = weights.iter().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for w in &mut weights {
                *w /= norm;
            }
        }

        Array1::from_vec(weights)
    }
}
