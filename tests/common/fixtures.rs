use std::path::PathBuf;

use listing_extractor::PageSnapshot;

pub const ROOM_URL: &str = "https://www.airbnb.jp/rooms/12345678?check_in=2025-04-01&adults=2";

pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

pub fn load_fixture(relative: &str) -> String {
    std::fs::read_to_string(fixture_path(relative))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", relative))
}

pub fn load_page(relative: &str) -> PageSnapshot {
    PageSnapshot::from_html(&load_fixture(relative), ROOM_URL)
}
