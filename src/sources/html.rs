//! Helpers shared by the site extractors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

pub(crate) const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// "December 30, 2023"
pub(crate) static LONG_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},\s+\d{4}").unwrap()
});

/// "Dec 30, 2023"
pub(crate) static SHORT_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2},\s+\d{4}").unwrap()
});

static BLANK_LINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"  +").unwrap());

static MUTED: Lazy<Selector> = Lazy::new(|| Selector::parse(".muted").unwrap());
static LISTS: Lazy<Selector> = Lazy::new(|| Selector::parse("ul, ol").unwrap());
static ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// Tags dropped together with everything inside them.
const CHROME_TAGS: &[&str] = &["nav", "header", "footer", "aside"];
const DISCARDED_TAGS: &[&str] = &["svg", "button", "form"];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table", "section",
    "article", "blockquote", "pre",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Text content with whitespace collapsed, roughly what a reader sees.
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rendered lines of an element, for label/value scraping. Only `<br>` and
/// block elements break a line; inline markup stays on the line it sits in.
pub fn element_lines(element: &ElementRef) -> String {
    let mut raw = String::new();
    push_lines(element, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_lines(element: &ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            // Source newlines are just whitespace when rendered
            Node::Text(text) => out.extend(text.chars().map(|c| match c {
                '\n' | '\r' => ' ',
                c => c,
            })),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            Node::Element(el) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&el.name());
                if block {
                    out.push('\n');
                }
                push_lines(&child, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

pub fn first<'a>(element: &ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// True when any class on the element contains one of `needles`, ignoring case.
pub fn class_contains(element: &ElementRef, needles: &[&str]) -> bool {
    element.value().classes().any(|class| {
        let class = class.to_lowercase();
        needles.iter().any(|needle| class.contains(needle))
    })
}

/// Resolve `href` against the page URL. Only http(s) links count.
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    base.join(href)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Parse the date shapes found on the scraped sites. Naive dates are taken as UTC midnight.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

/// First "Month D, YYYY" or "Mon D, YYYY" found anywhere in `text`.
pub fn find_date_in_text(text: &str) -> Option<DateTime<Utc>> {
    [&*LONG_DATE_RE, &*SHORT_DATE_RE]
        .iter()
        .find_map(|re| re.find(text))
        .and_then(|m| parse_date(m.as_str()))
}

pub fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|month| month.eq_ignore_ascii_case(name))
        .map(|index| index as u32 + 1)
}

/// "braga-e-regiao" -> "Braga-E-Regiao"
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;

    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                result.extend(ch.to_uppercase());
            } else {
                result.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(ch);
            at_word_start = true;
        }
    }

    result
}

pub fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

/// Strip page chrome out of an article body and keep a small set of tags and attributes.
pub fn clean_html(fragment: &str) -> String {
    let mut document = Html::parse_fragment(fragment);

    // Breadcrumbs and short link lists are navigation, not content
    let mut doomed: Vec<_> = document.select(&MUTED).map(|el| el.id()).collect();
    doomed.extend(
        document
            .select(&LISTS)
            .filter(|list| {
                element_text(list).chars().count() < 100 && list.select(&ANCHORS).next().is_some()
            })
            .map(|list| list.id()),
    );

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let remaining = document.root_element().inner_html();

    let mut cleaner = ammonia::Builder::default();
    cleaner
        .rm_tags(CHROME_TAGS)
        .add_clean_content_tags(CHROME_TAGS)
        .add_clean_content_tags(DISCARDED_TAGS)
        .add_generic_attributes(&["class"]);

    let cleaned = cleaner.clean(&remaining).to_string();
    let cleaned = BLANK_LINES_RE.replace_all(&cleaned, "\n");
    SPACES_RE.replace_all(&cleaned, " ").trim().to_string()
}
