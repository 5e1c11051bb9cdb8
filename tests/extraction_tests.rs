//! End-to-end extraction tests against HTML fixtures
//!
//! Covers:
//! - structured payload extraction (JSON data script and `window.X =` script)
//! - DOM fallback in English and Japanese
//! - priority ordering and fall-through
//! - price re-read on every call
//! - failure shape on empty pages

mod common;

use common::fixtures::{load_fixture, load_page, ROOM_URL};
use listing_extractor::{
    extract_listing, ExtractionMethod, Extractor, ListingData, Location, PageSnapshot,
};

fn extract(page: &PageSnapshot) -> listing_extractor::ExtractionResult<ListingData> {
    Extractor::with_defaults().unwrap().extract(page)
}

#[test]
fn test_structured_payload_extraction() {
    let result = extract(&load_page("structured_listing.html"));

    assert!(result.is_success());
    assert_eq!(result.method(), Some(ExtractionMethod::WindowObject));

    let expected = ListingData {
        room_id: "12345678".to_string(),
        title: "Cozy Apartment in Shibuya".to_string(),
        price: 15000,
        cleaning_fee: None,
        capacity: 4,
        bedrooms: 1,
        bathrooms: 1.5,
        location: Location {
            lat: 35.658034,
            lon: 139.701636,
            name: "Entire rental unit in Shibuya City".to_string(),
        },
        rating: 4.85,
        review_count: 120,
        description: "A beautiful place to stay.".to_string(),
        amenities: Some(vec!["Wifi".to_string(), "Air conditioning".to_string()]),
        host_name: Some("Taro".to_string()),
        is_superhost: Some(true),
    };
    assert_eq!(result.data(), Some(&expected));
}

#[test]
fn test_structured_wins_over_dom_markers() {
    // The fixture also carries a full set of DOM fallback markers
    let result = extract(&load_page("structured_listing.html"));
    let data = result.data().unwrap();

    assert_eq!(result.method(), Some(ExtractionMethod::WindowObject));
    assert_eq!(data.title, "Cozy Apartment in Shibuya");
    assert_eq!(data.bedrooms, 1);
    assert_eq!(data.host_name.as_deref(), Some("Taro"));
}

#[test]
fn test_structured_price_reread_from_dom() {
    let html = load_fixture("structured_listing.html");
    let first = extract(&PageSnapshot::from_html(&html, ROOM_URL));
    let second = extract(&PageSnapshot::from_html(
        &html.replace("¥15,000", "¥17,500"),
        ROOM_URL,
    ));

    let first = first.into_data().unwrap();
    let second = second.into_data().unwrap();
    assert_eq!(first.price, 15000);
    assert_eq!(second.price, 17500);

    let second_at_old_price = ListingData {
        price: first.price,
        ..second
    };
    assert_eq!(first, second_at_old_price);
}

#[test]
fn test_extraction_is_idempotent() {
    let page = load_page("structured_listing.html");
    let extractor = Extractor::with_defaults().unwrap();

    let first = serde_json::to_string(&extractor.extract(&page)).unwrap();
    let second = serde_json::to_string(&extractor.extract(&page)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_window_assignment_payload() {
    let result = extract(&load_page("window_assignment.html"));
    let data = result.data().unwrap();

    assert_eq!(result.method(), Some(ExtractionMethod::WindowObject));
    assert_eq!(data.room_id, "555");
    assert_eq!(data.title, "Machiya near Gion");
    assert_eq!(data.price, 22400);
    assert_eq!(data.capacity, 3);
    assert_eq!(data.bedrooms, 1);
    assert_eq!(data.bathrooms, 1.0);
    assert_eq!(data.is_superhost, Some(false));
    assert_eq!(data.amenities, None);
    assert!(data.has_known_location());
}

#[test]
fn test_dom_fallback_extraction() {
    let result = extract(&load_page("dom_listing.html"));

    assert!(result.is_success());
    assert_eq!(result.method(), Some(ExtractionMethod::DomFallback));

    let data = result.data().unwrap();
    assert_eq!(data.room_id, "12345678");
    assert_eq!(data.title, "Cozy Apartment in Shibuya");
    assert_eq!(data.price, 15000);
    assert_eq!(data.cleaning_fee, Some(5500));
    assert_eq!(data.capacity, 4);
    assert_eq!(data.bedrooms, 1);
    assert_eq!(data.bathrooms, 1.5);
    assert_eq!(data.rating, 4.85);
    assert_eq!(data.review_count, 1204);
    assert_eq!(data.description, "A beautiful place to stay.");
    assert_eq!(data.host_name.as_deref(), Some("Taro"));
    assert_eq!(data.is_superhost, None);
    assert_eq!(data.location, Location::default());
    assert!(!data.has_known_location());
}

#[test]
fn test_dom_fallback_japanese_labels() {
    let result = extract(&load_page("dom_listing_ja.html"));
    let data = result.data().unwrap();

    assert_eq!(result.method(), Some(ExtractionMethod::DomFallback));
    assert_eq!(data.title, "渋谷の快適なアパート");
    assert_eq!(data.price, 12800);
    assert_eq!(data.capacity, 6);
    assert_eq!(data.bedrooms, 2);
    assert_eq!(data.bathrooms, 1.0);
    assert_eq!(data.rating, 4.72);
    assert_eq!(data.review_count, 33);
    assert_eq!(data.host_name.as_deref(), Some("太郎さん"));
    assert_eq!(data.description, "");
}

#[test]
fn test_payload_without_listing_falls_through() {
    let result = extract(&load_page("stale_payload.html"));
    let data = result.data().unwrap();

    assert_eq!(result.method(), Some(ExtractionMethod::DomFallback));
    assert_eq!(data.title, "Loft by the river");
    assert_eq!(data.price, 240);
    assert_eq!(data.capacity, 2);
    assert_eq!(data.bedrooms, 0);
}

#[test]
fn test_empty_page_fails() {
    let result = extract_listing("", ROOM_URL);

    assert!(!result.is_success());
    assert!(result.data().is_none());
    assert!(result.method().is_none());
    assert!(!result.error().unwrap().is_empty());

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["success"], false);
    assert!(json.get("data").is_none());
    assert!(json.get("method").is_none());
}

#[test]
fn test_malformed_listing_does_not_fall_through() {
    let html = r#"
    <script id="__NEXT_DATA__" type="application/json">
        {"props": {"pageProps": {"initialState": {"pdp": {"listingInfo": {"listing": [1, 2]}}}}}}
    </script>
    <h1>Has a title</h1>
    <span class="_1y74zjx">¥9,000</span>
    "#;
    let result = extract_listing(html, ROOM_URL);

    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("malformed listing payload"));
}

#[test]
fn test_falsy_listing_falls_through_to_dom() {
    let html = r#"
    <script id="__NEXT_DATA__" type="application/json">
        {"props": {"pageProps": {"initialState": {"pdp": {"listingInfo": {"listing": false}}}}}}
    </script>
    <h1>Has a title</h1>
    <span class="_1y74zjx">¥9,000</span>
    "#;
    let result = extract_listing(html, ROOM_URL);

    assert!(result.is_success());
    assert_eq!(result.method(), Some(ExtractionMethod::DomFallback));
    assert_eq!(result.data().unwrap().price, 9000);
}
