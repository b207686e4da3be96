use std::borrow::Cow;
use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use url::Url;

use crate::domain::{ArticleRecord, FeedDocument, SiteDescriptor};
use crate::errors::{GeneratorError, GeneratorResult};

const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";
const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
const GENERATOR: &str = "rss-generator";
const DEFAULT_STYLESHEET: &str = "feed.xsl";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn xml_error(e: impl std::fmt::Display) -> GeneratorError {
    GeneratorError::Feed(e.to_string())
}

/// Serializes feeds as RSS 2.0.
///
/// Output depends only on the site and the articles, so rebuilding an
/// unchanged page produces the same bytes.
pub struct FeedBuilder {
    stylesheet: Option<String>,
}

impl FeedBuilder {
    pub fn new() -> Self {
        Self {
            stylesheet: Some(DEFAULT_STYLESHEET.to_string()),
        }
    }

    /// XSL stylesheet referenced from the document so browsers render it; `None` omits it.
    pub fn with_stylesheet(mut self, stylesheet: Option<String>) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    /// Build and serialize the feed, then check that a feed reader accepts it.
    pub fn build(
        &self,
        site: &SiteDescriptor,
        articles: &[ArticleRecord],
    ) -> GeneratorResult<Vec<u8>> {
        let document = FeedDocument::from_site(site, articles);
        let bytes = self.render(&document)?;

        let parsed = validate(&bytes)?;
        if parsed.entries.len() != document.items.len() {
            return Err(GeneratorError::Feed(format!(
                "feed for {} has {} items after parsing, expected {}",
                site.id,
                parsed.entries.len(),
                document.items.len()
            )));
        }

        Ok(bytes)
    }

    pub fn render(&self, document: &FeedDocument) -> GeneratorResult<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;

        if let Some(stylesheet) = &self.stylesheet {
            let instruction = format!(
                r#"xml-stylesheet type="text/xsl" href="{}""#,
                quick_xml::escape::escape(stylesheet.as_str())
            );
            writer
                .write_event(Event::PI(BytesPI::new(instruction)))
                .map_err(xml_error)?;
        }

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        rss.push_attribute(("xmlns:content", CONTENT_NS));
        rss.push_attribute(("xmlns:dc", DC_NS));
        writer.write_event(Event::Start(rss)).map_err(xml_error)?;
        writer
            .write_event(Event::Start(BytesStart::new("channel")))
            .map_err(xml_error)?;

        write_text(&mut writer, "title", &document.title)?;
        write_text(&mut writer, "link", document.link.as_str())?;
        write_text(&mut writer, "description", &document.description)?;
        write_text(&mut writer, "language", &document.language)?;
        write_text(&mut writer, "managingEditor", &document.managing_editor)?;
        write_text(&mut writer, "generator", GENERATOR)?;
        if let Some(last_build) = document.last_build_date() {
            write_text(&mut writer, "lastBuildDate", &last_build.to_rfc2822())?;
        }

        for item in &document.items {
            write_item(&mut writer, item)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("channel")))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("rss")))
            .map_err(xml_error)?;

        let mut bytes = writer.into_inner().into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }
}

impl Default for FeedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a feed the way a reader would.
pub fn validate(bytes: &[u8]) -> GeneratorResult<feed_rs::model::Feed> {
    feed_rs::parser::parse(bytes)
        .map_err(|e| GeneratorError::Feed(format!("generated feed does not parse: {}", e)))
}

/// Drop characters XML 1.0 does not allow. Scraped text can carry C0
/// controls that the HTML parser keeps.
fn xml_chars(text: &str) -> Cow<'_, str> {
    let allowed = |c: char| {
        matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
    };

    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| allowed(*c)).collect())
    }
}

fn image_html(image: &Url) -> String {
    format!(
        r#"<p><img src="{}" alt="" /></p>"#,
        quick_xml::escape::escape(image.as_str())
    )
}

fn write_text(writer: &mut XmlWriter, name: &str, text: &str) -> GeneratorResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(&xml_chars(text))))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)?;
    Ok(())
}

fn write_item(writer: &mut XmlWriter, item: &ArticleRecord) -> GeneratorResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new("item")))
        .map_err(xml_error)?;

    write_text(writer, "title", &item.title)?;
    write_text(writer, "link", item.link.as_str())?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "true"));
    writer.write_event(Event::Start(guid)).map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(item.link.as_str())))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("guid")))
        .map_err(xml_error)?;

    // Without a body the lead image would be lost, so it goes in the description
    match (&item.image, &item.content) {
        (Some(image), None) => {
            let description = format!("{}{}", image_html(image), item.summary);
            write_text(writer, "description", &description)?;
        }
        _ => write_text(writer, "description", &item.summary)?,
    }

    if let Some(published) = item.published {
        write_text(writer, "pubDate", &published.to_rfc2822())?;
    }
    if let Some(category) = &item.category {
        write_text(writer, "category", category)?;
    }
    if let Some(author) = &item.author {
        write_text(writer, "dc:creator", author)?;
    }
    if let Some(content) = &item.content {
        let body = match &item.image {
            Some(image) => format!("{}{}", image_html(image), content),
            None => content.clone(),
        };
        write_text(writer, "content:encoded", &body)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("item")))
        .map_err(xml_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExtractionRule;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn site() -> SiteDescriptor {
        SiteDescriptor {
            id: "immich".to_string(),
            name: "Immich Blog".to_string(),
            url: Url::parse("https://immich.app/blog").unwrap(),
            rule: ExtractionRule::Immich,
            description: "Latest posts from the Immich blog".to_string(),
            language: "en".to_string(),
            email: "noreply@immich.app".to_string(),
            max_articles: 10,
        }
    }

    fn articles() -> Vec<ArticleRecord> {
        vec![
            ArticleRecord::new(
                "Immich v1.99 & friends".to_string(),
                Url::parse("https://immich.app/blog/2024-03-01-v1.99").unwrap(),
            )
            .with_published(Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()))
            .with_summary(Some("Search <em>much</em> faster".to_string()))
            .with_category(Some("Release".to_string())),
            ArticleRecord::new(
                "Year in review".to_string(),
                Url::parse("https://immich.app/blog/year-in-review").unwrap(),
            ),
            ArticleRecord::new(
                "Stable".to_string(),
                Url::parse("https://immich.app/blog/2023-11-15-stable").unwrap(),
            )
            .with_published(Some(Utc.with_ymd_and_hms(2023, 11, 15, 0, 0, 0).unwrap()))
            .with_author(Some("Alex".to_string()))
            .with_content(Some("<p>Body</p>".to_string())),
        ]
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = FeedBuilder::new();

        let first = builder.build(&site(), &articles()).unwrap();
        let second = builder.build(&site(), &articles()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_built_feed_parses_with_items_in_order() {
        let bytes = FeedBuilder::new().build(&site(), &articles()).unwrap();
        let feed = validate(&bytes).unwrap();

        assert_eq!(feed.title.unwrap().content, "Immich Blog");
        let titles: Vec<_> = feed
            .entries
            .iter()
            .map(|e| e.title.as_ref().unwrap().content.clone())
            .collect();
        assert_eq!(titles, vec!["Immich v1.99 & friends", "Year in review", "Stable"]);
        assert_eq!(
            feed.entries[0].links[0].href,
            "https://immich.app/blog/2024-03-01-v1.99"
        );
        assert!(feed.entries[0].published.is_some());
        assert!(feed.entries[1].published.is_none());
    }

    #[test]
    fn test_document_layout() {
        let bytes = FeedBuilder::new().build(&site(), &articles()).unwrap();
        let xml = String::from_utf8(bytes).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<?xml-stylesheet type=\"text/xsl\" href=\"feed.xsl\"?>"));
        assert!(xml.contains("<language>en</language>"));
        assert!(xml.contains("<managingEditor>noreply@immich.app (Immich Blog)</managingEditor>"));
        // Newest item date, not the wall clock
        assert!(xml.contains("<lastBuildDate>Fri, "));
        assert!(xml.contains("Mar 2024 00:00:00 +0000</lastBuildDate>"));
        assert!(xml.contains("<title>Immich v1.99 &amp; friends</title>"));
        assert!(xml.contains("<description>Search &lt;em&gt;much&lt;/em&gt; faster</description>"));
        assert!(xml.contains("<category>Release</category>"));
        assert!(xml.contains("<dc:creator>Alex</dc:creator>"));
        assert!(xml.contains("<content:encoded>&lt;p&gt;Body&lt;/p&gt;</content:encoded>"));
        assert!(xml.contains(
            "<guid isPermaLink=\"true\">https://immich.app/blog/year-in-review</guid>"
        ));
    }

    #[test]
    fn test_without_stylesheet() {
        let bytes = FeedBuilder::new()
            .with_stylesheet(None)
            .build(&site(), &articles())
            .unwrap();
        let xml = String::from_utf8(bytes).unwrap();

        assert!(!xml.contains("xml-stylesheet"));
    }

    #[test]
    fn test_respects_max_articles() {
        let mut site = site();
        site.max_articles = 2;

        let bytes = FeedBuilder::new().build(&site, &articles()).unwrap();
        assert_eq!(validate(&bytes).unwrap().entries.len(), 2);
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let article = ArticleRecord::new(
            "Release \u{1}notes\u{1}".to_string(),
            Url::parse("https://immich.app/blog/release-notes").unwrap(),
        )
        .with_summary(Some("Tab\tstays, bell\u{7} goes".to_string()));

        let bytes = FeedBuilder::new().build(&site(), &[article]).unwrap();
        let xml = String::from_utf8(bytes).unwrap();

        assert!(!xml
            .chars()
            .any(|c| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')));
        assert!(xml.contains("<title>Release notes</title>"));
        assert!(xml.contains("<description>Tab\tstays, bell goes</description>"));
    }

    #[test]
    fn test_xml_chars_borrows_clean_text() {
        assert!(matches!(xml_chars("plain text"), Cow::Borrowed(_)));
        assert_eq!(xml_chars("a\u{0}b\u{FFFF}c"), "abc");
    }

    #[test]
    fn test_image_without_content_goes_in_description() {
        let article = ArticleRecord::new(
            "Obras na avenida".to_string(),
            Url::parse("https://www.diariodominho.pt/noticias/local/obras").unwrap(),
        )
        .with_image(Some(
            Url::parse("https://www.diariodominho.pt/uploads/obras.jpg").unwrap(),
        ));

        let bytes = FeedBuilder::new().build(&site(), &[article]).unwrap();
        let xml = String::from_utf8(bytes.clone()).unwrap();
        assert!(!xml.contains("content:encoded>"));

        let feed = validate(&bytes).unwrap();
        let summary = feed.entries[0].summary.as_ref().unwrap().content.clone();
        assert!(summary.contains("https://www.diariodominho.pt/uploads/obras.jpg"));
        assert!(summary.ends_with("Obras na avenida"));
    }

    #[test]
    fn test_image_with_content_stays_in_body() {
        let article = ArticleRecord::new(
            "Obras na avenida".to_string(),
            Url::parse("https://www.diariodominho.pt/noticias/local/obras").unwrap(),
        )
        .with_image(Some(
            Url::parse("https://www.diariodominho.pt/uploads/obras.jpg").unwrap(),
        ))
        .with_content(Some("<p>Body</p>".to_string()));

        let bytes = FeedBuilder::new().build(&site(), &[article]).unwrap();
        let xml = String::from_utf8(bytes).unwrap();

        assert!(xml.contains("<description>Obras na avenida</description>"));
        assert_eq!(xml.matches("uploads/obras.jpg").count(), 1);
    }

    #[test]
    fn test_empty_feed_is_still_valid() {
        let bytes = FeedBuilder::new().build(&site(), &[]).unwrap();
        let xml = String::from_utf8(bytes).unwrap();

        assert!(!xml.contains("<item>"));
        assert!(!xml.contains("lastBuildDate"));
    }
}
