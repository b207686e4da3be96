use chrono::{DateTime, Utc};
use url::Url;

use super::{ArticleRecord, SiteDescriptor};

/// A site's feed, ready to be serialized. Items keep extractor order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedDocument {
    pub title: String,
    pub link: Url,
    pub description: String,
    pub language: String,
    pub managing_editor: String,
    pub items: Vec<ArticleRecord>,
}

impl FeedDocument {
    /// Takes at most `site.max_articles` items from the front of `articles`.
    pub fn from_site(site: &SiteDescriptor, articles: &[ArticleRecord]) -> Self {
        let limit = if site.max_articles == 0 {
            articles.len()
        } else {
            site.max_articles
        };

        Self {
            title: site.name.clone(),
            link: site.url.clone(),
            description: site.description.clone(),
            language: site.language.clone(),
            managing_editor: format!("{} ({})", site.email, site.name),
            items: articles.iter().take(limit).cloned().collect(),
        }
    }

    /// Newest item date. Derived from content so rebuilding is reproducible.
    pub fn last_build_date(&self) -> Option<DateTime<Utc>> {
        self.items.iter().filter_map(|item| item.published).max()
    }
}
