use std::collections::HashSet;

use url::Url;

use crate::domain::{ArticleRecord, ExtractionRule};
use crate::errors::{GeneratorError, GeneratorResult};
use crate::sources::traits::Extractor;
use crate::sources::{
    diariodominho::DiarioDoMinhoExtractor, immich::ImmichExtractor,
    newalbumreleases::NewAlbumReleasesExtractor,
};

pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            extractors: Vec::new(),
        };

        registry.register(Box::new(ImmichExtractor::new()));
        registry.register(Box::new(DiarioDoMinhoExtractor::new()));
        registry.register(Box::new(NewAlbumReleasesExtractor::new()));

        registry
    }

    pub fn register(&mut self, extractor: Box<dyn Extractor>) {
        self.extractors.push(extractor);
    }

    /// Find the extractor for a rule
    pub fn get(&self, rule: ExtractionRule) -> GeneratorResult<&dyn Extractor> {
        self.extractors
            .iter()
            .find(|e| e.rule() == rule)
            .map(|e| e.as_ref())
            .ok_or_else(|| GeneratorError::Parse(format!("No extractor for rule {}", rule)))
    }

    /// Extract articles from a listing page.
    ///
    /// Repeated links keep their first occurrence. A page that yields no
    /// articles at all means the site layout no longer matches the rule.
    pub fn extract(
        &self,
        html: &str,
        rule: ExtractionRule,
        base: &Url,
    ) -> GeneratorResult<Vec<ArticleRecord>> {
        let articles = self.get(rule)?.extract(html, base)?;
        let found = articles.len();

        let mut seen = HashSet::new();
        let articles: Vec<ArticleRecord> = articles
            .into_iter()
            .filter(|a| !a.title.trim().is_empty() && seen.insert(a.link.clone()))
            .collect();

        if articles.is_empty() {
            return Err(GeneratorError::Parse(format!(
                "no articles found on {} (rule {}); the page layout may have changed",
                base, rule
            )));
        }

        tracing::debug!(
            rule = %rule,
            found,
            kept = articles.len(),
            "Extracted articles"
        );

        Ok(articles)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
