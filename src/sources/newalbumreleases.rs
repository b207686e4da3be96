use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::domain::{ArticleRecord, ExtractionRule};
use crate::errors::GeneratorResult;
use crate::sources::html;
use crate::sources::traits::Extractor;

static SINGLES: Lazy<Selector> = Lazy::new(|| Selector::parse("div.single").unwrap());
static HEADLINE_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("h2 a[href]").unwrap());
static CLOCK: Lazy<Selector> = Lazy::new(|| Selector::parse("div.date span.clock").unwrap());
static ENTRY: Lazy<Selector> = Lazy::new(|| Selector::parse("div.entry").unwrap());
static IMAGES: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").unwrap());

/// " On September - 29 - 2025"
static CLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"On\s+(January|February|March|April|May|June|July|August|September|October|November|December)\s+-\s+(\d{1,2})\s+-\s+(\d{4})").unwrap()
});

/// Labelled lines inside an album entry, in the order they are shown.
const DETAIL_FIELDS: &[&str] = &["Artist", "Album", "Released", "Style", "Format", "Size"];

/// One "Label: value" line per field, value running to the end of the line.
static DETAIL_RES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    DETAIL_FIELDS
        .iter()
        .map(|field| {
            let re = Regex::new(&format!(r"{}:[ \t]*([^\n]+)", field)).unwrap();
            (*field, re)
        })
        .collect()
});

/// New Album Releases category listing (https://www.newalbumreleases.cc/category/metal/).
pub struct NewAlbumReleasesExtractor;

impl NewAlbumReleasesExtractor {
    pub fn new() -> Self {
        Self
    }

    fn published(single: &ElementRef) -> Option<DateTime<Utc>> {
        let clock = html::first(single, &CLOCK)?;
        let text = html::element_text(&clock);
        let caps = CLOCK_RE.captures(&text)?;

        let month = html::month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    /// Cover image plus the album details as an HTML list.
    fn description(entry: &ElementRef, base: &Url) -> String {
        let mut parts = Vec::new();

        let image = html::first(entry, &IMAGES)
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| html::resolve(base, src));
        if let Some(image) = image {
            parts.push(format!(
                r#"<p><img src="{}" alt="Album cover" /></p>"#,
                html::escape(image.as_str())
            ));
        }

        let lines = html::element_lines(entry);

        parts.push("<p><strong>Album Details:</strong></p>".to_string());
        parts.push("<ul>".to_string());
        for (field, re) in DETAIL_RES.iter() {
            if let Some(caps) = re.captures(&lines) {
                parts.push(format!(
                    "<li><strong>{}:</strong> {}</li>",
                    field,
                    html::escape(caps[1].trim())
                ));
            }
        }
        parts.push("</ul>".to_string());

        parts.concat()
    }

    fn entry(single: ElementRef, base: &Url) -> Option<ArticleRecord> {
        let anchor = html::first(&single, &HEADLINE_LINK)?;
        let title = html::element_text(&anchor);
        if title.is_empty() {
            return None;
        }
        let link = html::resolve(base, anchor.value().attr("href")?)?;

        let summary = html::first(&single, &ENTRY).map(|entry| Self::description(&entry, base));

        Some(
            ArticleRecord::new(title, link)
                .with_published(Self::published(&single))
                .with_summary(summary),
        )
    }
}

impl Default for NewAlbumReleasesExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for NewAlbumReleasesExtractor {
    fn rule(&self) -> ExtractionRule {
        ExtractionRule::NewAlbumReleases
    }

    fn extract(&self, html: &str, base: &Url) -> GeneratorResult<Vec<ArticleRecord>> {
        let document = Html::parse_document(html);

        Ok(document
            .select(&SINGLES)
            .filter_map(|single| Self::entry(single, base))
            .collect())
    }
}
