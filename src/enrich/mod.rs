//! Detail-page enrichment
//!
//! Each game's upstream detail page carries a rich description and an age
//! rating that the catalog listing does not. The enricher rewrites the
//! game slug into the detail-page format, fetches the page and extracts
//! those fields. Enrichment is strictly best-effort: any failure degrades
//! to an empty [`GameInfo`] and the game is created without it.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::errors::EnrichError;
use crate::models::GameInfo;
use crate::utils::truncate_chars;

/// Plain-text short descriptions are bounded to this many characters.
pub const SHORT_DESCRIPTION_LIMIT: usize = 160;

const DESCRIPTION_SELECTOR: &str = ".description";
const RATING_SELECTOR: &str = ".age-restrictions__icon use";

/// Provider of scraped detail-page metadata for a game slug.
///
/// Implementations never fail: a degraded empty result stands in for any
/// fetch or parse error so one bad page cannot abort a batch.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, slug: &str) -> GameInfo;
}

/// HTTP enricher scraping the upstream detail pages.
pub struct DetailEnricher {
    client: Client,
    base_url: String,
    default_rating: String,
}

impl DetailEnricher {
    pub fn new(base_url: String, default_rating: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            default_rating,
        }
    }

    async fn fetch_info(&self, slug: &str) -> Result<GameInfo, EnrichError> {
        // Detail pages use underscore slugs
        let detail_slug = slug.replace('-', "_").to_lowercase();
        let url = format!("{}/{}", self.base_url, detail_slug);
        debug!("Fetching detail page: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EnrichError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        parse_game_info(&body, &self.default_rating)
    }
}

#[async_trait]
impl Enricher for DetailEnricher {
    async fn enrich(&self, slug: &str) -> GameInfo {
        match self.fetch_info(slug).await {
            Ok(info) => info,
            Err(e) => {
                warn!("Detail enrichment failed for slug {}: {}", slug, e);
                GameInfo::default()
            }
        }
    }
}

/// Extract description, bounded short description and rating code from
/// detail-page markup.
///
/// The rating comes from the icon reference attribute with underscores
/// stripped and the leading `#` marker removed; `default_rating` stands in
/// when the icon is absent.
pub fn parse_game_info(html: &str, default_rating: &str) -> Result<GameInfo, EnrichError> {
    let document = Html::parse_document(html);

    let description_selector = selector(DESCRIPTION_SELECTOR)?;
    let container = document
        .select(&description_selector)
        .next()
        .ok_or(EnrichError::MissingDescription)?;

    let description = container.inner_html().trim().to_string();
    let text_content = container.text().collect::<String>();
    let short_description = truncate_chars(text_content.trim(), SHORT_DESCRIPTION_LIMIT);

    let rating_selector = selector(RATING_SELECTOR)?;
    let rating = document
        .select(&rating_selector)
        .next()
        .and_then(|icon| {
            // The HTML parser namespace-adjusts xlink:href inside <svg>,
            // leaving "href" as the local attribute name
            icon.value()
                .attrs()
                .find(|(name, _)| *name == "xlink:href" || *name == "href")
                .map(|(_, value)| value)
        })
        .map(|href| href.replace('_', "").trim_start_matches('#').to_string())
        .unwrap_or_else(|| default_rating.to_string());

    Ok(GameInfo {
        description: Some(description),
        short_description: Some(short_description),
        rating: Some(rating),
    })
}

fn selector(css: &str) -> Result<Selector, EnrichError> {
    Selector::parse(css).map_err(|_| EnrichError::Selector {
        selector: css.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATED_PAGE: &str = r##"
        <html><body>
            <div class="description">
                <h2>About</h2>
                <p>A sprawling <b>open world</b> adventure.</p>
            </div>
            <div class="age-restrictions__icon">
                <svg><use xlink:href="#BR_16"></use></svg>
            </div>
        </body></html>
    "##;

    #[test]
    fn test_parse_extracts_description_and_rating() {
        let info = parse_game_info(RATED_PAGE, "BR0").unwrap();

        let description = info.description.unwrap();
        assert!(description.contains("<b>open world</b>"));

        let short = info.short_description.unwrap();
        assert!(short.contains("A sprawling open world adventure."));
        assert!(!short.contains('<'));

        // Underscores stripped, leading marker removed
        assert_eq!(info.rating.as_deref(), Some("BR16"));
    }

    #[test]
    fn test_parse_falls_back_to_default_rating() {
        let page = r#"<html><body><div class="description">Plain text.</div></body></html>"#;
        let info = parse_game_info(page, "BR0").unwrap();
        assert_eq!(info.rating.as_deref(), Some("BR0"));
    }

    #[test]
    fn test_parse_caps_short_description() {
        let long_text = "word ".repeat(100);
        let page = format!(
            r#"<html><body><div class="description"><p>{}</p></div></body></html>"#,
            long_text
        );

        let info = parse_game_info(&page, "BR0").unwrap();
        let short = info.short_description.unwrap();
        assert!(short.chars().count() <= SHORT_DESCRIPTION_LIMIT);
        assert!(long_text.starts_with(&short));
    }

    #[test]
    fn test_parse_missing_description_is_an_error() {
        let page = "<html><body><p>no container here</p></body></html>";
        let err = parse_game_info(page, "BR0").unwrap_err();
        assert!(matches!(err, EnrichError::MissingDescription));
    }
}
