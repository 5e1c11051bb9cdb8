//! Extractor configuration
//!
//! Defaults describe the marketplace layout the extractor was built against.
//! Everything is overridable from JSON so a markup change means a config
//! change, not a code change.

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::normalize::{default_label_rows, LabelRow};

/// CSS selectors used by the DOM fallback (and the price override)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub title: String,
    /// Narrow element holding the currently rendered nightly price
    pub price: String,
    pub list_items: String,
    pub rating: String,
    pub review_count: String,
    pub description: String,
    pub host_heading: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: "h1".to_string(),
            price: "span._1y74zjx".to_string(),
            list_items: "li".to_string(),
            rating: ".r1lutz1s".to_string(),
            review_count: "a.l1ovpqvx".to_string(),
            description: ".d1czm02p span".to_string(),
            host_heading: "h2.st22bf".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Candidate paths to the structured listing object. The first segment
    /// names a page global; the rest are object keys.
    pub structured_paths: Vec<Vec<String>>,
    pub selectors: SelectorConfig,
    /// Upper bound on list items inspected for capacity labels
    pub max_list_items: usize,
    /// List items longer than this are not treated as labels
    pub max_label_chars: usize,
    /// Path marker preceding the room id in the page URL
    pub room_path_marker: String,
    /// Prefixes stripped from the host heading
    pub host_prefixes: Vec<String>,
    /// Rows appended to the built-in label table
    pub extra_labels: Vec<LabelRow>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let next_data_path = [
            "__NEXT_DATA__",
            "props",
            "pageProps",
            "initialState",
            "pdp",
            "listingInfo",
            "listing",
        ];

        Self {
            structured_paths: vec![next_data_path.iter().map(|s| s.to_string()).collect()],
            selectors: SelectorConfig::default(),
            max_list_items: 50,
            max_label_chars: 80,
            room_path_marker: "/rooms/".to_string(),
            host_prefixes: vec!["Hosted by ".to_string(), "ホスト：".to_string()],
            extra_labels: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    /// Parse a (possibly partial) JSON config; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ExtractError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Built-in label rows followed by `extra_labels`
    pub fn label_rows(&self) -> Vec<LabelRow> {
        let mut rows = default_label_rows();
        rows.extend(self.extra_labels.iter().cloned());
        rows
    }
}
