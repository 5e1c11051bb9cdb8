//! Strategy orchestration
//!
//! Runs strategies in priority order and resolves every outcome (success,
//! fall-through, error, panic) to a single [`ExtractionResult`].

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, info, warn};

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, UNKNOWN_FAILURE_MESSAGE};
use crate::listing::{ExtractionResult, ListingData};
use crate::page::PageSnapshot;
use crate::strategies::{
    parse_selector, DomFallbackStrategy, ExtractionStrategy, StructuredDataStrategy,
};

pub struct Extractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Extractor {
    /// Structured payload first, then DOM fallback
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        let structured = StructuredDataStrategy::new(
            config.structured_paths.clone(),
            parse_selector(&config.selectors.price)?,
        );
        let dom = DomFallbackStrategy::new(config)?;

        Ok(Self::with_strategies(vec![Box::new(structured), Box::new(dom)]))
    }

    pub fn with_defaults() -> Result<Self, ExtractError> {
        Self::new(&ExtractorConfig::default())
    }

    /// Custom chain, tried in the given order
    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Single pass over the strategy chain. Never panics or returns `Err`.
    pub fn extract(&self, page: &PageSnapshot) -> ExtractionResult<ListingData> {
        for strategy in &self.strategies {
            let method = strategy.method();
            let outcome = catch_unwind(AssertUnwindSafe(|| strategy.extract(page)));

            match outcome {
                Ok(Ok(Some(data))) => {
                    info!(method = method.as_str(), "listing extracted");
                    return ExtractionResult::success(data, method);
                }
                Ok(Ok(None)) => {
                    debug!(method = method.as_str(), "strategy yielded nothing, falling through");
                }
                Ok(Err(e)) => {
                    warn!(method = method.as_str(), error = %e, "strategy failed");
                    return ExtractionResult::failure(e.to_string());
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    warn!(method = method.as_str(), error = %message, "strategy panicked");
                    return ExtractionResult::failure(message);
                }
            }
        }

        warn!(url = page.url(), "no strategy could locate title and price");
        ExtractionResult::failure(ExtractError::IncompleteDomData.to_string())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_FAILURE_MESSAGE.to_string())
}

/// Extract a listing from raw HTML with the default configuration
pub fn extract_listing(html: &str, url: &str) -> ExtractionResult<ListingData> {
    match Extractor::with_defaults() {
        Ok(extractor) => extractor.extract(&PageSnapshot::from_html(html, url)),
        Err(e) => ExtractionResult::failure(e.to_string()),
    }
}
