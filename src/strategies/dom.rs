//! DOM fallback strategy
//!
//! Scrapes visible text when the page carries no structured payload.
//! Coordinates are never recovered here; they stay at the `(0, 0)` "unknown"
//! placeholder.

use scraper::Selector;
use tracing::{debug, info};
use url::Url;

use super::{parse_selector, read_dom_price, ExtractionStrategy};
use crate::config::{ExtractorConfig, SelectorConfig};
use crate::error::ExtractError;
use crate::listing::{ExtractionMethod, ListingData, Location};
use crate::normalize::{
    clamp_rating, count_from_label, float_from_text, parse_price, price_from_text, LabelField,
    LabelTable,
};
use crate::page::PageSnapshot;

/// Compiled [`SelectorConfig`]
#[derive(Debug, Clone)]
pub struct DomSelectors {
    pub title: Selector,
    pub price: Selector,
    pub list_items: Selector,
    pub rating: Selector,
    pub review_count: Selector,
    pub description: Selector,
    pub host_heading: Selector,
}

impl DomSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            title: parse_selector(&config.title)?,
            price: parse_selector(&config.price)?,
            list_items: parse_selector(&config.list_items)?,
            rating: parse_selector(&config.rating)?,
            review_count: parse_selector(&config.review_count)?,
            description: parse_selector(&config.description)?,
            host_heading: parse_selector(&config.host_heading)?,
        })
    }
}

pub struct DomFallbackStrategy {
    selectors: DomSelectors,
    labels: LabelTable,
    max_list_items: usize,
    max_label_chars: usize,
    room_path_marker: String,
    host_prefixes: Vec<String>,
}

impl DomFallbackStrategy {
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            selectors: DomSelectors::compile(&config.selectors)?,
            labels: LabelTable::compile(&config.label_rows())?,
            max_list_items: config.max_list_items,
            max_label_chars: config.max_label_chars,
            room_path_marker: config.room_path_marker.clone(),
            host_prefixes: config.host_prefixes.clone(),
        })
    }

    /// Short list-item texts that may be capacity or fee labels
    fn label_candidates(&self, page: &PageSnapshot) -> Vec<String> {
        page.texts(&self.selectors.list_items, self.max_list_items)
            .into_iter()
            .filter(|text| !text.is_empty() && text.chars().count() <= self.max_label_chars)
            .collect()
    }
}

impl ExtractionStrategy for DomFallbackStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::DomFallback
    }

    fn extract(&self, page: &PageSnapshot) -> Result<Option<ListingData>, ExtractError> {
        let title = page.first_text(&self.selectors.title).unwrap_or_default();
        let price = read_dom_price(page, &self.selectors.price);

        // Title and price are the only required fields
        let price = match price {
            Some(price) if !title.is_empty() => price,
            _ => {
                debug!(
                    title_found = !title.is_empty(),
                    price_found = price.is_some(),
                    "DOM fallback missing required fields"
                );
                return Ok(None);
            }
        };

        let candidates = self.label_candidates(page);
        let items: Vec<&str> = candidates.iter().map(String::as_str).collect();

        let data = ListingData {
            room_id: room_id_from_url(page.url(), &self.room_path_marker),
            title,
            price,
            cleaning_fee: self
                .labels
                .find(LabelField::CleaningFee, &items)
                .and_then(parse_price),
            capacity: self
                .labels
                .find(LabelField::Guests, &items)
                .map(count_from_label)
                .unwrap_or(0),
            bedrooms: self
                .labels
                .find(LabelField::Bedrooms, &items)
                .map(count_from_label)
                .unwrap_or(0),
            bathrooms: self
                .labels
                .find(LabelField::Bathrooms, &items)
                .map(float_from_text)
                .unwrap_or(0.0),
            location: Location::default(),
            rating: page
                .first_text(&self.selectors.rating)
                .map(|text| clamp_rating(float_from_text(&text)))
                .unwrap_or(0.0),
            review_count: page
                .first_text(&self.selectors.review_count)
                .map(|text| u32::try_from(price_from_text(&text)).unwrap_or(u32::MAX))
                .unwrap_or(0),
            description: page
                .first_text(&self.selectors.description)
                .unwrap_or_default(),
            amenities: None,
            host_name: page
                .first_text(&self.selectors.host_heading)
                .map(|text| strip_host_prefix(&text, &self.host_prefixes))
                .filter(|name| !name.is_empty()),
            is_superhost: None,
        };

        info!(
            room_id = %data.room_id,
            price = data.price,
            labels = items.len(),
            "listing scraped from DOM"
        );
        Ok(Some(data))
    }
}

/// Path segment after `marker` in the page address, without query or fragment
pub fn room_id_from_url(page_url: &str, marker: &str) -> String {
    let path = match Url::parse(page_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => page_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    path.split_once(marker)
        .and_then(|(_, rest)| rest.split('/').next())
        .unwrap_or_default()
        .to_string()
}

fn strip_host_prefix(text: &str, prefixes: &[String]) -> String {
    let text = text.trim();
    prefixes
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix.as_str()))
        .unwrap_or(text)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> DomFallbackStrategy {
        DomFallbackStrategy::new(&ExtractorConfig::default()).unwrap()
    }

    #[test]
    fn test_room_id_from_url() {
        assert_eq!(
            room_id_from_url("https://www.airbnb.jp/rooms/12345678", "/rooms/"),
            "12345678"
        );
        assert_eq!(
            room_id_from_url(
                "https://www.airbnb.com/rooms/42?check_in=2024-05-01&adults=2",
                "/rooms/"
            ),
            "42"
        );
        assert_eq!(
            room_id_from_url("https://www.airbnb.com/rooms/42/photos#top", "/rooms/"),
            "42"
        );
        assert_eq!(room_id_from_url("/rooms/77?x=1", "/rooms/"), "77");
        assert_eq!(room_id_from_url("https://www.airbnb.com/s/Tokyo", "/rooms/"), "");
    }

    #[test]
    fn test_strip_host_prefix() {
        let prefixes = ExtractorConfig::default().host_prefixes;
        assert_eq!(strip_host_prefix("Hosted by Taro", &prefixes), "Taro");
        assert_eq!(strip_host_prefix("ホスト：太郎さん", &prefixes), "太郎さん");
        assert_eq!(strip_host_prefix("Hanako", &prefixes), "Hanako");
    }

    #[test]
    fn test_requires_title_and_price() {
        let strategy = strategy();

        let no_price = PageSnapshot::from_html("<h1>Cozy flat</h1>", "");
        assert!(strategy.extract(&no_price).unwrap().is_none());

        let no_title = PageSnapshot::from_html(r#"<span class="_1y74zjx">¥15,000</span>"#, "");
        assert!(strategy.extract(&no_title).unwrap().is_none());

        let blank_title = PageSnapshot::from_html(
            r#"<h1>   </h1><span class="_1y74zjx">¥15,000</span>"#,
            "",
        );
        assert!(strategy.extract(&blank_title).unwrap().is_none());

        let digitless_price = PageSnapshot::from_html(
            r#"<h1>Cozy flat</h1><span class="_1y74zjx">Price on request</span>"#,
            "",
        );
        assert!(strategy.extract(&digitless_price).unwrap().is_none());
    }

    #[test]
    fn test_minimal_page_defaults() {
        let page = PageSnapshot::from_html(
            r#"<h1>Cozy flat</h1><span class="_1y74zjx">¥15,000</span>"#,
            "https://www.airbnb.jp/rooms/5",
        );
        let data = strategy().extract(&page).unwrap().unwrap();

        assert_eq!(data.room_id, "5");
        assert_eq!(data.title, "Cozy flat");
        assert_eq!(data.price, 15000);
        assert_eq!(data.capacity, 0);
        assert_eq!(data.bathrooms, 0.0);
        assert_eq!(data.rating, 0.0);
        assert_eq!(data.description, "");
        assert_eq!(data.host_name, None);
        assert_eq!(data.cleaning_fee, None);
        assert!(!data.has_known_location());
    }

    #[test]
    fn test_long_list_items_are_not_labels() {
        let long_item = format!("{} 9 guests", "x".repeat(100));
        let html = format!(
            r#"<h1>Flat</h1><span class="_1y74zjx">¥1</span><ul><li>{}</li><li>3 guests</li></ul>"#,
            long_item
        );
        let page = PageSnapshot::from_html(&html, "");
        let data = strategy().extract(&page).unwrap().unwrap();

        assert_eq!(data.capacity, 3);
    }

    #[test]
    fn test_list_items_are_bounded() {
        let config = ExtractorConfig {
            max_list_items: 2,
            ..Default::default()
        };
        let strategy = DomFallbackStrategy::new(&config).unwrap();
        let page = PageSnapshot::from_html(
            r#"<h1>Flat</h1><span class="_1y74zjx">¥1</span>
               <ul><li>Wifi</li><li>Kitchen</li><li>4 guests</li></ul>"#,
            "",
        );
        let data = strategy.extract(&page).unwrap().unwrap();

        assert_eq!(data.capacity, 0);
    }

    #[test]
    fn test_invalid_selector_config() {
        let mut config = ExtractorConfig::default();
        config.selectors.rating = "div[".to_string();

        let err = DomFallbackStrategy::new(&config).err().unwrap();
        assert!(matches!(err, ExtractError::InvalidSelector { .. }));
    }
}
