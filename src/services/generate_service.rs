use crate::domain::{ArticleRecord, SiteDescriptor};
use crate::errors::GeneratorResult;
use crate::services::feed_service::FeedBuilder;
use crate::services::fetch_service::PageFetcher;
use crate::services::upload_service::UploadService;
use crate::sources::{Extractor, ExtractorRegistry};
use crate::storage::traits::ObjectStore;

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Fetch every article page and embed its cleaned body
    pub full_content: bool,
}

/// What a successful pipeline run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReport {
    pub site_id: String,
    pub key: String,
    pub location: String,
    pub items: usize,
    pub bytes: usize,
}

/// Outcome of one site in a batch run.
#[derive(Debug)]
pub struct SiteOutcome {
    pub site_id: String,
    pub result: GeneratorResult<GenerateReport>,
}

/// fetch -> extract -> build -> upload, one site at a time.
pub struct GenerateService<F: PageFetcher, S: ObjectStore> {
    fetcher: F,
    uploader: UploadService<S>,
    extractors: ExtractorRegistry,
    builder: FeedBuilder,
    options: GenerateOptions,
}

impl<F: PageFetcher, S: ObjectStore> GenerateService<F, S> {
    pub fn new(fetcher: F, store: S, options: GenerateOptions) -> Self {
        Self {
            fetcher,
            uploader: UploadService::new(store),
            extractors: ExtractorRegistry::new(),
            builder: FeedBuilder::new(),
            options,
        }
    }

    pub fn generate(&self, site: &SiteDescriptor) -> GeneratorResult<GenerateReport> {
        let span = tracing::info_span!("generate", site = %site.id);
        let _enter = span.enter();

        let html = self.fetcher.fetch(&site.url)?;
        let mut articles = self.extractors.extract(&html, site.rule, &site.url)?;

        if site.max_articles > 0 {
            articles.truncate(site.max_articles);
        }

        if self.options.full_content {
            let extractor = self.extractors.get(site.rule)?;
            articles = self.enrich(extractor, articles);
        }

        let bytes = self.builder.build(site, &articles)?;
        let key = site.object_key();
        let location = self.uploader.upload(&bytes, &key)?;

        tracing::info!(items = articles.len(), key = %key, "Feed published");

        Ok(GenerateReport {
            site_id: site.id.clone(),
            key,
            location,
            items: articles.len(),
            bytes: bytes.len(),
        })
    }

    /// Run every site. A failing site is logged and recorded; the rest still run.
    pub fn generate_all(&self, sites: &[SiteDescriptor]) -> Vec<SiteOutcome> {
        sites
            .iter()
            .map(|site| {
                let result = self.generate(site);
                if let Err(e) = &result {
                    tracing::error!(site = %site.id, error = %e, "Site failed");
                }
                SiteOutcome {
                    site_id: site.id.clone(),
                    result,
                }
            })
            .collect()
    }

    /// Add body, author and image from each article's own page.
    /// An article whose page cannot be fetched is published as scraped.
    fn enrich(
        &self,
        extractor: &dyn Extractor,
        articles: Vec<ArticleRecord>,
    ) -> Vec<ArticleRecord> {
        if !extractor.supports_full_content() {
            tracing::debug!(rule = %extractor.rule(), "Full content not supported, skipping");
            return articles;
        }

        articles
            .into_iter()
            .map(|article| match self.fetcher.fetch(&article.link) {
                Ok(html) => {
                    let content = extractor.extract_content(&html);
                    let metadata = extractor.extract_metadata(&html, &article.link);
                    let author = metadata.author.or_else(|| article.author.clone());
                    let image = metadata.image.or_else(|| article.image.clone());

                    article
                        .with_content(content)
                        .with_author(author)
                        .with_image(image)
                }
                Err(e) => {
                    tracing::warn!(url = %article.link, error = %e, "Could not fetch article page");
                    article
                }
            })
            .collect()
    }
}
