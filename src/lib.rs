//! Rental listing extractor
//!
//! Turns a rendered listing page into a normalized [`ListingData`] record:
//! - embedded structured payload first (`__NEXT_DATA__`)
//! - visible DOM text as fallback
//! - provenance tag on every success

pub mod config;
pub mod consumer;
pub mod error;
pub mod ffi;
pub mod listing;
pub mod logging;
pub mod normalize;
pub mod orchestrator;
pub mod page;
pub mod relay;
pub mod strategies;

pub use config::{ExtractorConfig, SelectorConfig};
pub use error::ExtractError;
pub use listing::{ExtractionMethod, ExtractionResult, ListingData, Location};
pub use orchestrator::{extract_listing, Extractor};
pub use page::PageSnapshot;
pub use relay::{handle_request, handle_request_json, Request};
