use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::domain::{ArticleRecord, ExtractionRule};
use crate::errors::GeneratorResult;
use crate::sources::html::{self, LONG_DATE_RE, SHORT_DATE_RE};
use crate::sources::traits::{Extractor, PageMetadata};

static CANDIDATES: Lazy<Selector> = Lazy::new(|| Selector::parse("article, div").unwrap());
static BLOG_LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href*='/blog/']").unwrap());
static HEADINGS: Lazy<Selector> = Lazy::new(|| Selector::parse("h1, h2, h3, h4").unwrap());
static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time").unwrap());
static DATED: Lazy<Selector> = Lazy::new(|| Selector::parse("time, span, div").unwrap());
static SUMMARY_BLOCKS: Lazy<Selector> = Lazy::new(|| Selector::parse("p, div").unwrap());
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static IMAGES: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());
static BODY_FALLBACK: Lazy<Selector> = Lazy::new(|| Selector::parse("article, main").unwrap());

/// "/2023-12-30-some-title"
static URL_DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(\d{4}-\d{2}-\d{2})").unwrap());
/// Trailing "— Author"
static AUTHOR_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"—.*$").unwrap());

/// Immich blog listing (https://immich.app/blog).
pub struct ImmichExtractor;

impl ImmichExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Post cards, or bare blog links when the page has no recognizable cards
    fn candidates<'a>(document: &'a Html) -> Vec<ElementRef<'a>> {
        let cards: Vec<_> = document
            .select(&CANDIDATES)
            .filter(|el| html::class_contains(el, &["post", "blog"]))
            .collect();

        if !cards.is_empty() {
            return cards;
        }

        document
            .select(&BLOG_LINKS)
            .filter(|a| {
                let href = a.value().attr("href").unwrap_or_default().trim();
                href != "/blog" && href != "/blog/"
            })
            .collect()
    }

    /// Listing headings run into the byline: "TitleDecember 30, 2023 — Alex"
    fn clean_title(raw: &str) -> String {
        let mut title = raw.to_string();

        for re in [&*LONG_DATE_RE, &*SHORT_DATE_RE] {
            if let Some(start) = re.find(&title).map(|m| m.start()) {
                title.truncate(start);
            }
        }

        AUTHOR_SUFFIX_RE.replace(&title, "").trim().to_string()
    }

    fn entry(element: ElementRef, base: &Url) -> Option<ArticleRecord> {
        let is_link = element.value().name() == "a";

        let title = match html::first(&element, &HEADINGS) {
            Some(heading) => html::element_text(&heading),
            None if is_link => html::element_text(&element),
            None => return None,
        };
        let title = Self::clean_title(&title);
        if title.is_empty() {
            return None;
        }

        let link_element = if is_link {
            element
        } else {
            html::first(&element, &LINKS)?
        };
        let href = link_element.value().attr("href")?;
        let link = html::resolve(base, href)?;

        let published = Self::published(&element, href);

        let summary = element
            .select(&SUMMARY_BLOCKS)
            .find(|el| html::class_contains(el, &["excerpt", "description"]))
            .or_else(|| html::first(&element, &PARAGRAPHS))
            .map(|el| html::element_text(&el));

        Some(
            ArticleRecord::new(title, link)
                .with_published(published)
                .with_summary(summary),
        )
    }

    fn published(element: &ElementRef, href: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        let from_time = html::first(element, &TIME)
            .and_then(|t| t.value().attr("datetime"))
            .and_then(html::parse_date);

        from_time
            .or_else(|| {
                element
                    .select(&DATED)
                    .find(|el| html::class_contains(el, &["date"]))
                    .and_then(|el| match el.value().attr("datetime") {
                        Some(datetime) => html::parse_date(datetime),
                        None => html::parse_date(&html::element_text(&el)),
                    })
            })
            .or_else(|| {
                URL_DATE_RE
                    .captures(href)
                    .and_then(|caps| html::parse_date(&caps[1]))
            })
            .or_else(|| html::find_date_in_text(&html::element_text(element)))
    }

    /// The post body sits two levels above its h1
    fn content_container(document: &Html) -> Option<ElementRef<'_>> {
        document
            .select(&H1)
            .next()
            .and_then(|h1| h1.parent())
            .and_then(|parent| parent.parent())
            .and_then(ElementRef::wrap)
    }
}

impl Default for ImmichExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for ImmichExtractor {
    fn rule(&self) -> ExtractionRule {
        ExtractionRule::Immich
    }

    fn extract(&self, html: &str, base: &Url) -> GeneratorResult<Vec<ArticleRecord>> {
        let document = Html::parse_document(html);

        Ok(Self::candidates(&document)
            .into_iter()
            .filter_map(|element| Self::entry(element, base))
            .collect())
    }

    fn supports_full_content(&self) -> bool {
        true
    }

    fn extract_content(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);

        let container = Self::content_container(&document)
            .or_else(|| document.select(&BODY_FALLBACK).next())?;

        Some(html::clean_html(&container.html())).filter(|c| !c.is_empty())
    }

    fn extract_metadata(&self, html: &str, base: &Url) -> PageMetadata {
        let document = Html::parse_document(html);

        // Byline paragraph reads "— Alex Tran"
        let author = document
            .select(&PARAGRAPHS)
            .map(|p| html::element_text(&p))
            .find(|text| text.starts_with('—'))
            .map(|text| text.replace('—', "").trim().to_string())
            .filter(|author| !author.is_empty());

        let image = Self::content_container(&document)
            .and_then(|container| html::first(&container, &IMAGES))
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| html::resolve(base, src));

        PageMetadata { author, image }
    }
}
