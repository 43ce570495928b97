//! Retail-site review scraper.
//!
//! Harvests review text for a product so a whole listing can be classified
//! in bulk. This is a best-effort collaborator: individual page failures are
//! logged and skipped, and a fully blocked or review-less product yields an
//! empty vec, which the caller treats as "no input to classify".

use log::{info, warn};
use rand::Rng;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;

// Rotated to avoid trivially fingerprinted request streams.
const USER_AGENTS: [&str; 2] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/129.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) \
     Version/17.3 Safari/605.1.15",
];

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The URL carries no extractable product identifier.
    #[error("not a recognizable product link: {0}")]
    InvalidUrl(String),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub max_pages: usize,
    /// Reviews at or below this length are discarded as noise.
    pub min_review_len: usize,
    pub marketplace_base: String,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            max_pages: 10,
            min_review_len: 15,
            marketplace_base: "https://www.amazon.in".to_string(),
        }
    }
}

/// Pulls the ASIN out of a product or review-listing URL.
pub fn extract_asin(url: &str) -> Option<&str> {
    for marker in ["/dp/", "/product-reviews/"] {
        if let Some(rest) = url.split(marker).nth(1) {
            let asin = rest
                .split('/')
                .next()
                .and_then(|s| s.split('?').next())
                .unwrap_or("");
            if !asin.is_empty() {
                return Some(asin);
            }
        }
    }
    None
}

/// Extracts review-body text blocks from a review-listing page.
fn extract_review_bodies(html: &str, min_review_len: usize) -> Vec<String> {
    let document = scraper::Html::parse_document(html);
    let selector =
        scraper::Selector::parse(r#"span[data-hook="review-body"]"#).expect("static selector");

    document
        .select(&selector)
        .map(|block| {
            block
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| text.len() > min_review_len)
        .collect()
}

/// Scrapes up to `max_pages` of reviews for the product behind `url`.
///
/// Pages that fail (HTTP error, network error) are skipped; a page with no
/// review blocks ends the walk. Returns an empty vec when nothing could be
/// collected, never an error for that case.
pub async fn scrape_reviews(
    url: &str,
    options: &ScrapeOptions,
) -> Result<Vec<String>, ScrapeError> {
    let asin = extract_asin(url).ok_or_else(|| ScrapeError::InvalidUrl(url.to_string()))?;
    let base = format!("{}/product-reviews/{asin}", options.marketplace_base);
    info!("scraping reviews for ASIN {asin}");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(20))
        .build()?;

    let mut all_reviews = Vec::new();
    for page in 1..=options.max_pages {
        let page_url = format!("{base}?pageNumber={page}");
        let (ua, delay_ms) = {
            let mut rng = rand::thread_rng();
            (
                USER_AGENTS[rng.gen_range(0..USER_AGENTS.len())],
                rng.gen_range(1500..3000u64),
            )
        };

        let response = match client
            .get(&page_url)
            .header(USER_AGENT, ua)
            .header(ACCEPT_LANGUAGE, "en-IN,en;q=0.9")
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("page {page} failed: {e}");
                continue;
            }
        };
        if !response.status().is_success() {
            warn!("page {page} returned HTTP {}, skipping", response.status());
            continue;
        }
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!("page {page} body read failed: {e}");
                continue;
            }
        };

        let reviews = extract_review_bodies(&body, options.min_review_len);
        if reviews.is_empty() {
            info!("no more reviews on page {page}, stopping");
            break;
        }
        all_reviews.extend(reviews);
        info!("page {page} fetched, {} reviews collected so far", all_reviews.len());

        if page < options.max_pages {
            // Jittered anti-bot delay between pages.
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    info!("finished scraping, {} reviews total", all_reviews.len());
    Ok(all_reviews)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_asin_from_product_url() {
        assert_eq!(
            extract_asin("https://www.amazon.in/dp/B0B3CP96J9"),
            Some("B0B3CP96J9")
        );
        assert_eq!(
            extract_asin("https://www.amazon.in/dp/B0B3CP96J9/ref=something"),
            Some("B0B3CP96J9")
        );
        assert_eq!(
            extract_asin("https://www.amazon.in/dp/B0B3CP96J9?th=1"),
            Some("B0B3CP96J9")
        );
    }

    #[test]
    fn test_extract_asin_from_review_url() {
        assert_eq!(
            extract_asin("https://www.amazon.in/product-reviews/B0ABCDEF12/ref=x"),
            Some("B0ABCDEF12")
        );
    }

    #[test]
    fn test_extract_asin_rejects_other_urls() {
        assert_eq!(extract_asin("https://www.amazon.in/gp/bestsellers"), None);
        assert_eq!(extract_asin("https://example.com"), None);
        assert_eq!(extract_asin(""), None);
    }

    #[test]
    fn test_extract_review_bodies() {
        let html = r#"
            <html><body>
              <span data-hook="review-body"><span>Great product, works exactly as described.</span></span>
              <span data-hook="review-body"><span>ok</span></span>
              <span data-hook="rating">5 stars</span>
              <span data-hook="review-body">
                <span>Fast shipping</span> <span>and solid packaging.</span>
              </span>
            </body></html>
        "#;
        let reviews = extract_review_bodies(html, 15);
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0], "Great product, works exactly as described.");
        assert_eq!(reviews[1], "Fast shipping and solid packaging.");
    }

    #[test]
    fn test_extract_review_bodies_empty_page() {
        assert!(extract_review_bodies("<html><body></body></html>", 15).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let result = scrape_reviews("https://example.com/not-a-product", &ScrapeOptions::default())
            .await;
        assert!(matches!(result, Err(ScrapeError::InvalidUrl(_))));
    }
}
