//! Structured payload strategy
//!
//! Reads the listing object the page's framework embeds (`__NEXT_DATA__`).
//! The payload is authoritative for every field except the nightly price,
//! which is always re-read from the rendered price element: dynamic pricing
//! updates the screen without touching the embedded payload.

use scraper::Selector;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{read_dom_price, ExtractionStrategy};
use crate::error::ExtractError;
use crate::listing::{ExtractionMethod, ListingData, Location};
use crate::normalize::{clamp_rating, count_from_label, float_from_text, parse_price};
use crate::page::PageSnapshot;

pub struct StructuredDataStrategy {
    paths: Vec<Vec<String>>,
    price_selector: Selector,
}

impl StructuredDataStrategy {
    pub fn new(paths: Vec<Vec<String>>, price_selector: Selector) -> Self {
        Self {
            paths,
            price_selector,
        }
    }
}

impl ExtractionStrategy for StructuredDataStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::WindowObject
    }

    fn extract(&self, page: &PageSnapshot) -> Result<Option<ListingData>, ExtractError> {
        let Some((path, listing)) = self
            .paths
            .iter()
            .find_map(|path| navigate(page, path).map(|listing| (path, listing)))
        else {
            debug!("no structured listing payload on page");
            return Ok(None);
        };

        let listing = listing.as_object().ok_or_else(|| {
            ExtractError::MalformedPayload(format!(
                "`{}` is {}, expected an object",
                path.join("."),
                json_type_name(listing)
            ))
        })?;

        let price = read_dom_price(page, &self.price_selector).unwrap_or(0);
        let data = map_listing(listing, price);

        info!(
            path = %path.join("."),
            room_id = %data.room_id,
            price = data.price,
            "listing read from structured payload"
        );
        Ok(Some(data))
    }
}

/// Walk `path` from a page global. Any missing link, or an empty value
/// (null, false, zero, ""), ends the walk.
fn navigate<'a>(page: &'a PageSnapshot, path: &[String]) -> Option<&'a Value> {
    let (global, keys) = path.split_first()?;
    let mut current = page.global(global)?;

    for key in keys {
        if is_empty_value(current) {
            return None;
        }
        current = current.get(key.as_str())?;
    }

    (!is_empty_value(current)).then_some(current)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn map_listing(listing: &Map<String, Value>, price: u64) -> ListingData {
    let location = listing.get("location");
    let host = listing.get("host");

    ListingData {
        room_id: string_field(listing.get("id")),
        title: string_field(listing.get("name")),
        price,
        cleaning_fee: listing.get("cleaningFee").and_then(price_field),
        capacity: count_field(listing.get("personCapacity")),
        bedrooms: count_field(listing.get("bedroomLabel")),
        bathrooms: float_field(listing.get("bathroomLabel")),
        location: Location {
            lat: float_field(location.and_then(|l| l.get("lat"))),
            lon: float_field(location.and_then(|l| l.get("lng"))),
            name: string_field(listing.get("p3SummaryTitle")),
        },
        rating: clamp_rating(float_field(listing.get("avgRating"))),
        review_count: count_field(listing.get("reviewCount")),
        description: string_field(
            listing
                .get("sectionedDescription")
                .and_then(|d| d.get("description")),
        ),
        amenities: amenities(listing.get("listingAmenities")),
        host_name: host
            .and_then(|h| h.get("name"))
            .and_then(Value::as_str)
            .map(String::from),
        is_superhost: host.and_then(|h| h.get("isSuperhost")).and_then(Value::as_bool),
    }
}

fn string_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Numbers are copied; labels like "2 bedrooms" go through the normalizer
fn count_field(value: Option<&Value>) -> u32 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
            .or_else(|| n.as_f64().filter(|v| *v > 0.0).map(|v| v as u32))
            .unwrap_or(0),
        Some(Value::String(s)) => count_from_label(s),
        _ => 0,
    }
}

fn float_field(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => float_from_text(s),
        _ => 0.0,
    }
}

fn price_field(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| v.round() as u64)),
        Value::String(s) => parse_price(s),
        _ => None,
    }
}

/// Amenity titles in payload order, skipping ones marked unavailable
fn amenities(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;

    let titles = items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(obj) => {
                if obj.get("available").and_then(Value::as_bool) == Some(false) {
                    return None;
                }
                obj.get("title")
                    .and_then(Value::as_str)
                    .map(|s| s.trim().to_string())
            }
            _ => None,
        })
        .filter(|title| !title.is_empty())
        .collect();

    Some(titles)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
