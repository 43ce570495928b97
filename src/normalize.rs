//! Deterministic review-text normalization.
//!
//! The same [`Normalizer`] runs at training and at serving time; its output
//! must be byte-for-byte identical for the same input, so everything here is
//! a pure function of the input plus two fixed dictionaries (English
//! stopwords and an irregular-plural table) that are built once.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(r"http\S+|www\.\S+").expect("static url pattern");
    static ref SHARED: Normalizer = Normalizer::new();
}

/// English stopwords, matching the NLTK list. Contracted forms are omitted:
/// apostrophes are deleted before tokenization, so they can never match.
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very", "can", "will",
    "just", "don", "dont", "should", "shouldve", "now", "ll", "re", "ve", "ain", "aren",
    "arent", "couldn", "couldnt", "didn", "didnt", "doesn", "doesnt", "hadn", "hadnt",
    "hasn", "hasnt", "haven", "havent", "isn", "isnt", "ma", "mightn", "mightnt", "mustn",
    "mustnt", "needn", "neednt", "shan", "shant", "shouldn", "shouldnt", "wasn", "wasnt",
    "weren", "werent", "won", "wont", "wouldn", "wouldnt", "im", "ive", "youre", "youve",
    "youll", "youd", "hes", "shes", "thatll", "cant",
];

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("leaves", "leaf"),
    ("lives", "life"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("shelves", "shelf"),
    ("halves", "half"),
];

/// Normalizes raw review text into the token string consumed by the
/// vectorizer. The dictionaries are read-only after construction, so a
/// `Normalizer` is freely shareable between threads.
#[derive(Debug)]
pub struct Normalizer {
    stopwords: HashSet<&'static str>,
    irregular_plurals: HashMap<&'static str, &'static str>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
            irregular_plurals: IRREGULAR_PLURALS.iter().copied().collect(),
        }
    }

    /// Returns the process-wide shared instance.
    pub fn shared() -> &'static Normalizer {
        &SHARED
    }

    /// Whether `token` is in the fixed English stopword set. The vectorizer
    /// applies this again on its own tokens as defense in depth.
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Cleans review text by:
    /// 1. Lowercasing
    /// 2. Removing URL-shaped substrings
    /// 3. Deleting every character outside `[a-z]` and whitespace
    /// 4. Tokenizing on whitespace
    /// 5. Dropping stopwords and tokens of length <= 1
    /// 6. Reducing each surviving token to its lemma
    ///
    /// All-stopword or all-punctuation input yields the empty string.
    pub fn normalize(&self, raw: &str) -> String {
        let lowered = raw.to_lowercase();
        let without_urls = URL_PATTERN.replace_all(&lowered, " ");

        let mut cleaned = String::with_capacity(without_urls.len());
        for c in without_urls.chars() {
            if c.is_ascii_lowercase() {
                cleaned.push(c);
            } else if c.is_whitespace() {
                cleaned.push(' ');
            }
            // Digits and punctuation are deleted outright, not replaced.
        }

        cleaned
            .split_whitespace()
            .filter(|t| t.len() > 1 && !self.stopwords.contains(t))
            .map(|t| self.lemmatize(t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// WordNet-style noun lemmatization: an irregular-plural lookup followed
    /// by conservative suffix rules. Unknown forms pass through unchanged.
    fn lemmatize(&self, token: &str) -> String {
        if let Some(&lemma) = self.irregular_plurals.get(token) {
            return lemma.to_string();
        }

        if token.len() > 4 && token.ends_with("ies") {
            return format!("{}y", &token[..token.len() - 3]);
        }
        for suffix in ["sses", "ches", "shes", "xes", "zes"] {
            if token.len() > suffix.len() && token.ends_with(suffix) {
                return token[..token.len() - 2].to_string();
            }
        }
        if token.len() > 3
            && token.ends_with('s')
            && !token.ends_with("ss")
            && !token.ends_with("us")
            && !token.ends_with("is")
        {
            return token[..token.len() - 1].to_string();
        }

        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_punctuation() {
        let n = Normalizer::new();
        assert_eq!(
            n.normalize("GREAT Product!!! 100% worth it."),
            "great product worth"
        );
    }

    #[test]
    fn test_url_stripping() {
        let n = Normalizer::new();
        assert_eq!(
            n.normalize("check http://example.com/deal amazing deal"),
            "check amazing deal"
        );
        assert_eq!(n.normalize("see www.example.com now"), "see");
    }

    #[test]
    fn test_digits_deleted_not_separated() {
        let n = Normalizer::new();
        // "b4" collapses to "b", which is then dropped for length.
        assert_eq!(n.normalize("b4 buying read reviews"), "buying read review");
    }

    #[test]
    fn test_stopwords_and_short_tokens_dropped() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("it is a i o u"), "");
        assert_eq!(n.normalize("this is the best"), "best");
    }

    #[test]
    fn test_lemmatization() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("boxes of knives"), "box knife");
        assert_eq!(n.normalize("batteries included"), "battery included");
        assert_eq!(n.normalize("glasses for children"), "glass child");
        // "ss"/"us"/"is" endings are left alone.
        assert_eq!(n.normalize("the bus business"), "bus business");
    }

    #[test]
    fn test_pure_function() {
        let n = Normalizer::new();
        let input = "Running shoes, 5 stars! http://a.b/c";
        assert_eq!(n.normalize(input), n.normalize(input));
    }

    #[test]
    fn test_stable_on_own_output() {
        let n = Normalizer::new();
        for input in [
            "These boxes arrived broken, totally useless!",
            "Great product, fast shipping!",
            "batteries not included :(",
        ] {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once);
        }
    }

    #[test]
    fn test_empty_results() {
        let n = Normalizer::new();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("!!! 123 ..."), "");
        assert_eq!(n.normalize("the of and"), "");
    }

    #[test]
    fn test_shared_instance_matches_fresh() {
        let fresh = Normalizer::new();
        let input = "Absolutely loved these running shoes!";
        assert_eq!(Normalizer::shared().normalize(input), fresh.normalize(input));
    }
}
