//! Canonical listing record and the extraction result envelope

use serde::{Deserialize, Serialize};

/// Geolocation of a listing. `(0, 0)` means the coordinates are unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

/// Normalized property listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListingData {
    /// Stable listing identifier
    pub room_id: String,
    pub title: String,
    /// Nightly price in the page's currency, digits only
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaning_fee: Option<u64>,
    pub capacity: u32,
    pub bedrooms: u32,
    /// May be fractional, e.g. 1.5
    pub bathrooms: f64,
    pub location: Location,
    /// Average rating in [0, 5]
    pub rating: f64,
    pub review_count: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_superhost: Option<bool>,
}

impl ListingData {
    /// False when the coordinates are the `(0, 0)` placeholder
    pub fn has_known_location(&self) -> bool {
        self.location.lat != 0.0 || self.location.lon != 0.0
    }
}

/// Which strategy produced a successful result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    WindowObject,
    DomFallback,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::WindowObject => "window_object",
            ExtractionMethod::DomFallback => "dom_fallback",
        }
    }
}

/// Success/failure envelope returned across the invocation boundary.
///
/// Fields are private: `success` always agrees with the presence of `data`,
/// and `method` only accompanies data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<ExtractionMethod>,
}

impl<T> ExtractionResult<T> {
    pub fn success(data: T, method: ExtractionMethod) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            method: Some(method),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            method: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn method(&self) -> Option<ExtractionMethod> {
        self.method
    }
}
