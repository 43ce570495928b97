//! Synthetic corpus augmentation.
//!
//! Expands a small base set of templated reviews into a larger training
//! corpus by layering randomized usernames, dates and label-consistent star
//! ratings on top of each base row. Deterministic under a fixed seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ReviewRecord;
use crate::classifier::Label;

const USERNAME_ADJECTIVES: &[&str] = &[
    "quiet", "happy", "brave", "calm", "eager", "lucky", "swift", "witty", "sunny", "bold",
];
const USERNAME_NOUNS: &[&str] = &[
    "otter", "falcon", "panda", "badger", "maple", "comet", "heron", "willow", "ember", "drift",
];

/// Base review templates: ten measured "real" reviews and ten over-the-top
/// "fake" ones, mirroring the distribution the detector is sanity-checked
/// against.
pub fn base_templates() -> Vec<ReviewRecord> {
    let real = [
        "Great product, works exactly as described.",
        "Fast shipping and solid packaging, no complaints so far.",
        "Good quality for the price, though the manual is a bit thin.",
        "Does the job. Battery life could be better but overall satisfied.",
        "Arrived on time and matches the photos. Happy with the purchase.",
        "Decent build quality. Had a small issue and support resolved it quickly.",
        "Works fine after two weeks of daily use. Would buy again.",
        "The size runs a little small, but the material feels durable.",
        "Setup took ten minutes and it has worked reliably since.",
        "Fair value. Not perfect, but it does what it promises.",
    ];
    let fake = [
        "Best product ever!!! Buy it now, you will not regret it!!!",
        "Absolutely life changing, five stars, everyone must own this miracle item!",
        "AMAZING AMAZING AMAZING. Perfect in every way imaginable!",
        "This changed my life forever, unbelievable quality, order immediately!",
        "Top quality, unbeatable price, the only product you will ever need!",
        "Incredible!!! My whole family bought one, we are all obsessed!",
        "Do not think twice, this is the greatest purchase in the history of purchases!",
        "100% perfect, zero flaws, works miracles, highly highly recommend!",
        "Superb wonder product, cured all my problems overnight, stunning!",
        "Flawless masterpiece, everyone needs this right now, trust me completely!",
    ];

    real.iter()
        .map(|r| ReviewRecord::new(*r, Label::Real))
        .chain(fake.iter().map(|r| ReviewRecord::new(*r, Label::Fake)))
        .collect()
}

/// Cycles through `base` `multiplier` times, attaching a random username,
/// a random date within a two-year window and a star rating consistent with
/// the label (4-5 for real, 1-2 for fake).
pub fn enhance(base: &[ReviewRecord], multiplier: usize, seed: u64) -> Vec<ReviewRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(base.len() * multiplier);

    for i in 0..base.len() * multiplier {
        let template = &base[i % base.len()];
        let rating = match template.label {
            Label::Real => rng.gen_range(4..=5),
            Label::Fake => rng.gen_range(1..=2),
        };
        out.push(ReviewRecord {
            review: template.review.clone(),
            label: template.label,
            username: Some(random_username(&mut rng)),
            rating: Some(rating),
            date: Some(random_date(&mut rng)),
        });
    }
    out
}

fn random_username(rng: &mut StdRng) -> String {
    let adjective = USERNAME_ADJECTIVES[rng.gen_range(0..USERNAME_ADJECTIVES.len())];
    let noun = USERNAME_NOUNS[rng.gen_range(0..USERNAME_NOUNS.len())];
    format!("{adjective}_{noun}{:02}", rng.gen_range(0..100))
}

fn random_date(rng: &mut StdRng) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        rng.gen_range(2023..=2025),
        rng.gen_range(1..=12),
        rng.gen_range(1..=28)
    )
}
