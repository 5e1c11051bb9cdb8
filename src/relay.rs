//! Request/response boundary
//!
//! The panel sends `{"action": "extractListing"}` into the page context and
//! gets a serialized [`ExtractionResult`] back. Messages with any other action
//! belong to someone else and are ignored.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::listing::{ExtractionResult, ListingData};
use crate::orchestrator::Extractor;
use crate::page::PageSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ExtractListing,
}

pub fn handle_request(
    extractor: &Extractor,
    request: &Request,
    page: &PageSnapshot,
) -> ExtractionResult<ListingData> {
    match request {
        Request::ExtractListing => extractor.extract(page),
    }
}

/// Decode a request, handle it, and encode the response.
/// Returns `None` for messages this handler does not answer.
pub fn handle_request_json(
    extractor: &Extractor,
    request_json: &str,
    page: &PageSnapshot,
) -> Option<String> {
    let request: Request = match serde_json::from_str(request_json) {
        Ok(r) => r,
        Err(e) => {
            debug!(error = %e, "ignoring message without a known action");
            return None;
        }
    };

    let response = handle_request(extractor, &request, page);
    serde_json::to_string(&response).ok()
}
