use url::Url;

use crate::domain::{ArticleRecord, ExtractionRule};
use crate::errors::GeneratorResult;

/// Details scraped from an article's own page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub author: Option<String>,
    pub image: Option<Url>,
}

pub trait Extractor: Send + Sync {
    /// Identifies which site markup this extractor understands
    fn rule(&self) -> ExtractionRule;

    /// Pull article entries out of a listing page, in page order.
    /// Entries missing a title or a usable link are skipped.
    fn extract(&self, html: &str, base: &Url) -> GeneratorResult<Vec<ArticleRecord>>;

    /// Whether article pages can be scraped for their body
    fn supports_full_content(&self) -> bool {
        false
    }

    /// Cleaned body HTML of a single article page
    fn extract_content(&self, _html: &str) -> Option<String> {
        None
    }

    fn extract_metadata(&self, _html: &str, _base: &Url) -> PageMetadata {
        PageMetadata::default()
    }
}
