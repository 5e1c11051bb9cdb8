//! Extraction strategies
//!
//! Each strategy reads a [`PageSnapshot`] and either produces a listing,
//! declines (`Ok(None)`) so the next strategy runs, or fails outright.

mod dom;
mod structured;

pub use dom::*;
pub use structured::*;

use scraper::Selector;

use crate::error::ExtractError;
use crate::listing::{ExtractionMethod, ListingData};
use crate::normalize::parse_price;
use crate::page::PageSnapshot;

pub trait ExtractionStrategy {
    /// Provenance tag attached to this strategy's successes
    fn method(&self) -> ExtractionMethod;

    fn extract(&self, page: &PageSnapshot) -> Result<Option<ListingData>, ExtractError>;
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Price currently rendered in the page's price element
pub(crate) fn read_dom_price(page: &PageSnapshot, selector: &Selector) -> Option<u64> {
    page.first_text(selector).as_deref().and_then(parse_price)
}
