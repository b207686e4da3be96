use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// One entry scraped from a site's listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub link: Url,
    pub published: Option<DateTime<Utc>>,
    pub summary: String,
    pub category: Option<String>,
    pub author: Option<String>,
    pub image: Option<Url>,
    /// Cleaned body HTML, only present after full-content enrichment
    pub content: Option<String>,
}

impl ArticleRecord {
    /// Summary defaults to the title until something better is found.
    pub fn new(title: String, link: Url) -> Self {
        Self {
            summary: title.clone(),
            title,
            link,
            published: None,
            category: None,
            author: None,
            image: None,
            content: None,
        }
    }

    pub fn with_published(mut self, published: Option<DateTime<Utc>>) -> Self {
        self.published = published;
        self
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        if let Some(summary) = summary.filter(|s| !s.trim().is_empty()) {
            self.summary = summary;
        }
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn with_image(mut self, image: Option<Url>) -> Self {
        self.image = image;
        self
    }

    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = content;
        self
    }
}
