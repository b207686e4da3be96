use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::domain::{ArticleRecord, ExtractionRule};
use crate::errors::GeneratorResult;
use crate::sources::html;
use crate::sources::traits::{Extractor, PageMetadata};

static NEWS_LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href*='/noticias/']").unwrap());
static TITLE_ELEMENTS: Lazy<Selector> = Lazy::new(|| Selector::parse("h1, h2, h3, h4, span").unwrap());
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static SECTIONS: Lazy<Selector> = Lazy::new(|| Selector::parse("div, section").unwrap());
static BYLINES: Lazy<Selector> = Lazy::new(|| Selector::parse("span, div, p").unwrap());
static IMAGES: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());

/// "/noticias/desporto/2025-10-01-braga-vence"
static URL_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(\d{4}-\d{2}-\d{2})-").unwrap());
static CATEGORY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/noticias/([^/]+)/").unwrap());

/// Headlines shorter than this are icons, counters or "Ler mais" buttons.
const MIN_TITLE_CHARS: usize = 6;

/// Diário do Minho front page (https://www.diariodominho.pt/).
pub struct DiarioDoMinhoExtractor;

impl DiarioDoMinhoExtractor {
    pub fn new() -> Self {
        Self
    }

    fn usable_title(text: String) -> Option<String> {
        (text.chars().count() >= MIN_TITLE_CHARS).then_some(text)
    }

    fn entry(anchor: ElementRef, base: &Url) -> Option<ArticleRecord> {
        let link = html::resolve(base, anchor.value().attr("href")?)?;

        let title = html::first(&anchor, &TITLE_ELEMENTS)
            .and_then(|el| Self::usable_title(html::element_text(&el)))
            .or_else(|| Self::usable_title(html::element_text(&anchor)))?;

        let published = URL_DATE_RE
            .captures(link.as_str())
            .and_then(|caps| html::parse_date(&caps[1]));

        let category = CATEGORY_RE
            .captures(link.as_str())
            .map(|caps| html::title_case(&caps[1]));

        let summary = html::first(&anchor, &PARAGRAPHS).map(|p| html::element_text(&p));

        Some(
            ArticleRecord::new(title, link)
                .with_published(published)
                .with_category(category)
                .with_summary(summary),
        )
    }

    fn article_body(document: &Html) -> Option<ElementRef<'_>> {
        document.select(&ARTICLE).next().or_else(|| {
            document
                .select(&SECTIONS)
                .find(|el| html::class_contains(el, &["article", "content"]))
        })
    }
}

impl Default for DiarioDoMinhoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for DiarioDoMinhoExtractor {
    fn rule(&self) -> ExtractionRule {
        ExtractionRule::DiarioDoMinho
    }

    fn extract(&self, html: &str, base: &Url) -> GeneratorResult<Vec<ArticleRecord>> {
        let document = Html::parse_document(html);

        Ok(document
            .select(&NEWS_LINKS)
            .filter_map(|anchor| Self::entry(anchor, base))
            .collect())
    }

    fn supports_full_content(&self) -> bool {
        true
    }

    fn extract_content(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let body = Self::article_body(&document)?;

        Some(html::clean_html(&body.html())).filter(|c| !c.is_empty())
    }

    fn extract_metadata(&self, html: &str, base: &Url) -> PageMetadata {
        let document = Html::parse_document(html);

        let author = document
            .select(&BYLINES)
            .find(|el| html::class_contains(el, &["author"]))
            .map(|el| html::element_text(&el))
            .filter(|author| !author.is_empty());

        let image = document
            .select(&ARTICLE)
            .next()
            .and_then(|article| html::first(&article, &IMAGES))
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| html::resolve(base, src));

        PageMetadata { author, image }
    }
}
