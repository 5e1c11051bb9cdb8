//! Types at the boundary with the AI analysis service.
//!
//! The extractor never reads or writes settings. These types only describe
//! what the downstream service receives alongside a listing.

use serde::{Deserialize, Serialize};

use crate::listing::{ExtractionResult, ListingData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Claude,
}

/// Settings record persisted by the host shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub provider: AiProvider,
    pub api_key: String,
    pub terms_accepted: bool,
    /// Milliseconds since the Unix epoch
    pub updated_at: u64,
}

impl UserSettings {
    /// Terms accepted and a key present
    pub fn is_ready(&self) -> bool {
        self.terms_accepted && !self.api_key.trim().is_empty()
    }
}

/// Input handed to the analysis service. Zero or empty listing fields mean
/// "unknown" to the service, not a real value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput {
    pub listing: ListingData,
    pub settings: UserSettings,
}

impl AnalysisInput {
    /// Only successful extractions are analysable
    pub fn from_result(
        result: ExtractionResult<ListingData>,
        settings: UserSettings,
    ) -> Option<Self> {
        let listing = result.into_data()?;
        Some(Self { listing, settings })
    }
}
