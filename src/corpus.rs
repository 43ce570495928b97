//! Training-corpus loading and partitioning.
//!
//! The corpus is a CSV file with at least `review` and `label` columns;
//! `username`, `rating` and `date` are optional metadata columns. Rows with
//! a missing or blank review or label are dropped, matching how the training
//! job treats incomplete exports.

pub mod synth;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::classifier::{ClassifierError, Label};
use crate::normalize::Normalizer;

/// One labeled review row, with optional metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review: String,
    pub label: Label,
    pub username: Option<String>,
    pub rating: Option<u8>,
    pub date: Option<String>,
}

impl ReviewRecord {
    pub fn new(review: impl Into<String>, label: Label) -> Self {
        Self {
            review: review.into(),
            label,
            username: None,
            rating: None,
            date: None,
        }
    }
}

/// Corpus preparation options.
///
/// `include_metadata` controls whether username/rating/date are concatenated
/// into the text before normalization. It defaults to `false`: serving-time
/// input is always a bare review string, and a model must be trained with the
/// exact text convention it is served with, or accuracy silently degrades.
#[derive(Debug, Clone, Default)]
pub struct CorpusOptions {
    pub include_metadata: bool,
}

/// A normalized training example.
#[derive(Debug, Clone)]
pub struct LabeledText {
    pub text: String,
    pub label: Label,
}

/// Loads a review corpus from CSV. Fails with a data error when the file is
/// unreadable, the required columns are missing, a label value is unknown,
/// or no usable rows remain.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<ReviewRecord>, ClassifierError> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| ClassifierError::Data(format!("cannot read corpus {}: {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| ClassifierError::Data(format!("cannot read corpus headers: {e}")))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let review_col = column("review")
        .ok_or_else(|| ClassifierError::Data("corpus is missing the `review` column".into()))?;
    let label_col = column("label")
        .ok_or_else(|| ClassifierError::Data("corpus is missing the `label` column".into()))?;
    let username_col = column("username");
    let rating_col = column("rating");
    let date_col = column("date");

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for (row_idx, row) in reader.records().enumerate() {
        let row =
            row.map_err(|e| ClassifierError::Data(format!("bad csv row {}: {e}", row_idx + 1)))?;
        let review = row.get(review_col).unwrap_or("").trim();
        let label = row.get(label_col).unwrap_or("").trim();
        if review.is_empty() || label.is_empty() {
            dropped += 1;
            continue;
        }
        let field = |col: Option<usize>| {
            col.and_then(|c| row.get(c))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        records.push(ReviewRecord {
            review: review.to_string(),
            label: Label::parse(label)?,
            username: field(username_col),
            rating: field(rating_col).and_then(|r| r.parse().ok()),
            date: field(date_col),
        });
    }

    if dropped > 0 {
        warn!("dropped {dropped} rows with missing review or label");
    }
    if records.is_empty() {
        return Err(ClassifierError::Data(
            "corpus has no usable rows after dropping incomplete ones".into(),
        ));
    }
    info!("loaded {} reviews from {}", records.len(), path.display());
    Ok(records)
}

/// Writes records back out as CSV with the full column set.
pub fn write_csv(
    path: impl AsRef<Path>,
    records: &[ReviewRecord],
) -> Result<(), ClassifierError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| ClassifierError::Data(format!("cannot write {}: {e}", path.display())))?;
    writer
        .write_record(["username", "date", "rating", "review", "label"])
        .map_err(|e| ClassifierError::Data(format!("csv write failed: {e}")))?;
    for r in records {
        let rating = r.rating.map(|v| v.to_string()).unwrap_or_default();
        writer
            .write_record([
                r.username.as_deref().unwrap_or(""),
                r.date.as_deref().unwrap_or(""),
                rating.as_str(),
                r.review.as_str(),
                r.label.as_str(),
            ])
            .map_err(|e| ClassifierError::Data(format!("csv write failed: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| ClassifierError::Data(format!("csv write failed: {e}")))?;
    Ok(())
}

/// Builds the text each record trains on and normalizes it. The metadata
/// concatenation format is fixed: `{review} user:{u} rating:{r} date:{d}`,
/// with absent fields skipped.
pub fn prepare(records: &[ReviewRecord], options: &CorpusOptions) -> Vec<LabeledText> {
    let normalizer = Normalizer::shared();
    records
        .iter()
        .map(|r| {
            let text = if options.include_metadata {
                let mut combined = r.review.clone();
                if let Some(u) = &r.username {
                    combined.push_str(&format!(" user:{u}"));
                }
                if let Some(rating) = r.rating {
                    combined.push_str(&format!(" rating:{rating}"));
                }
                if let Some(d) = &r.date {
                    combined.push_str(&format!(" date:{d}"));
                }
                combined
            } else {
                r.review.clone()
            };
            LabeledText {
                text: normalizer.normalize(&text),
                label: r.label,
            }
        })
        .collect()
}

/// Splits into train and held-out sets preserving class proportions, with a
/// seeded shuffle for reproducibility.
pub fn stratified_split(
    items: &[LabeledText],
    test_ratio: f64,
    seed: u64,
) -> Result<(Vec<LabeledText>, Vec<LabeledText>), ClassifierError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut by_class: HashMap<Label, Vec<usize>> = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        by_class.entry(item.label).or_default().push(i);
    }
    if by_class.len() < 2 {
        return Err(ClassifierError::Data(
            "corpus must contain both classes for a stratified split".into(),
        ));
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    for label in Label::ORDERED {
        let Some(indices) = by_class.get_mut(&label) else {
            continue;
        };
        if indices.len() < 2 {
            return Err(ClassifierError::Data(format!(
                "class {label:?} needs at least 2 samples to stratify"
            )));
        }
        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f64 * test_ratio).round() as usize)
            .clamp(1, indices.len() - 1);
        for (pos, &i) in indices.iter().enumerate() {
            if pos < n_test {
                test.push(items[i].clone());
            } else {
                train.push(items[i].clone());
            }
        }
    }
    Ok((train, test))
}

/// Stratified k-fold partition over labels, returning (train, test) index
/// sets per fold. `k` is reduced when the minority class is smaller than the
/// requested fold count.
pub fn stratified_kfold(
    labels: &[Label],
    k: usize,
    seed: u64,
) -> Result<Vec<(Vec<usize>, Vec<usize>)>, ClassifierError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut by_class: HashMap<Label, Vec<usize>> = HashMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }
    if by_class.len() < 2 {
        return Err(ClassifierError::Data(
            "cross-validation needs both classes present".into(),
        ));
    }
    let min_count = by_class.values().map(Vec::len).min().unwrap_or(0);
    if min_count < 2 {
        return Err(ClassifierError::Data(
            "cross-validation needs at least 2 samples per class".into(),
        ));
    }
    let k = k.max(2).min(min_count);

    let mut folds: Vec<Vec<usize>> = vec![Vec::new(); k];
    for label in Label::ORDERED {
        let Some(indices) = by_class.get_mut(&label) else {
            continue;
        };
        indices.shuffle(&mut rng);
        for (pos, &i) in indices.iter().enumerate() {
            folds[pos % k].push(i);
        }
    }

    Ok((0..k)
        .map(|fold| {
            let test = folds[fold].clone();
            let train = folds
                .iter()
                .enumerate()
                .filter(|(f, _)| *f != fold)
                .flat_map(|(_, idx)| idx.iter().copied())
                .collect();
            (train, test)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(n_fake: usize, n_real: usize) -> Vec<LabeledText> {
        let mut items = Vec::new();
        for i in 0..n_fake {
            items.push(LabeledText {
                text: format!("fake text {i}"),
                label: Label::Fake,
            });
        }
        for i in 0..n_real {
            items.push(LabeledText {
                text: format!("real text {i}"),
                label: Label::Real,
            });
        }
        items
    }

    #[test]
    fn test_stratified_split_preserves_proportions() {
        let items = labeled(20, 20);
        let (train, test) = stratified_split(&items, 0.2, 42).unwrap();
        assert_eq!(train.len(), 32);
        assert_eq!(test.len(), 8);
        let test_fake = test.iter().filter(|t| t.label == Label::Fake).count();
        assert_eq!(test_fake, 4);
    }

    #[test]
    fn test_stratified_split_reproducible() {
        let items = labeled(10, 10);
        let (a_train, _) = stratified_split(&items, 0.2, 7).unwrap();
        let (b_train, _) = stratified_split(&items, 0.2, 7).unwrap();
        let a: Vec<&str> = a_train.iter().map(|t| t.text.as_str()).collect();
        let b: Vec<&str> = b_train.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stratified_split_single_class_rejected() {
        let items = labeled(10, 0);
        assert!(matches!(
            stratified_split(&items, 0.2, 42),
            Err(ClassifierError::Data(_))
        ));
    }

    #[test]
    fn test_kfold_covers_every_index_once() {
        let items = labeled(10, 15);
        let labels: Vec<Label> = items.iter().map(|t| t.label).collect();
        let folds = stratified_kfold(&labels, 5, 42).unwrap();
        assert_eq!(folds.len(), 5);
        let mut seen = vec![0usize; labels.len()];
        for (train, test) in &folds {
            assert_eq!(train.len() + test.len(), labels.len());
            for &i in test {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_kfold_each_fold_has_both_classes() {
        let items = labeled(10, 10);
        let labels: Vec<Label> = items.iter().map(|t| t.label).collect();
        for (train, test) in stratified_kfold(&labels, 5, 42).unwrap() {
            for idx_set in [&train, &test] {
                assert!(idx_set.iter().any(|&i| labels[i] == Label::Fake));
                assert!(idx_set.iter().any(|&i| labels[i] == Label::Real));
            }
        }
    }

    #[test]
    fn test_kfold_shrinks_to_minority_class() {
        let items = labeled(3, 20);
        let labels: Vec<Label> = items.iter().map(|t| t.label).collect();
        let folds = stratified_kfold(&labels, 5, 42).unwrap();
        assert_eq!(folds.len(), 3);
    }

    #[test]
    fn test_prepare_without_metadata() {
        let records = vec![ReviewRecord {
            review: "Great product, fast shipping!".into(),
            label: Label::Real,
            username: Some("buyer99".into()),
            rating: Some(5),
            date: Some("2024-03-01".into()),
        }];
        let prepared = prepare(&records, &CorpusOptions::default());
        assert_eq!(prepared[0].text, "great product fast shipping");
    }

    #[test]
    fn test_prepare_with_metadata() {
        let records = vec![ReviewRecord {
            review: "Great product".into(),
            label: Label::Real,
            username: Some("buyer99".into()),
            rating: Some(5),
            date: None,
        }];
        let prepared = prepare(
            &records,
            &CorpusOptions {
                include_metadata: true,
            },
        );
        // "user:buyer99" loses digits and punctuation; "rating:5" reduces to
        // the stopword-free token "rating".
        assert_eq!(prepared[0].text, "great product userbuyer rating");
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = std::env::temp_dir().join("reviewguard-corpus-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("reviews.csv");

        let records = vec![
            ReviewRecord {
                review: "Works as described".into(),
                label: Label::Real,
                username: Some("quiet_otter12".into()),
                rating: Some(4),
                date: Some("2024-06-12".into()),
            },
            ReviewRecord::new("Best thing ever!!!", Label::Fake),
        ];
        write_csv(&path, &records).unwrap();
        let loaded = load_csv(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].label, Label::Real);
        assert_eq!(loaded[0].rating, Some(4));
        assert_eq!(loaded[1].username, None);
    }

    #[test]
    fn test_csv_missing_column_rejected() {
        let dir = std::env::temp_dir().join("reviewguard-corpus-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("no_label.csv");
        std::fs::write(&path, "review\nsome text\n").unwrap();
        assert!(matches!(load_csv(&path), Err(ClassifierError::Data(_))));
    }

    #[test]
    fn test_csv_unknown_label_rejected() {
        let dir = std::env::temp_dir().join("reviewguard-corpus-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad_label.csv");
        std::fs::write(&path, "review,label\nsome text,maybe\n").unwrap();
        assert!(matches!(load_csv(&path), Err(ClassifierError::Data(_))));
    }

    #[test]
    fn test_csv_blank_rows_dropped() {
        let dir = std::env::temp_dir().join("reviewguard-corpus-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("blanks.csv");
        std::fs::write(&path, "review,label\n,real\ngood value,real\n ,fake\n").unwrap();
        let loaded = load_csv(&path).unwrap();
        assert_eq!(loaded.len(), 1);
    }
}
