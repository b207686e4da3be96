use serde::{Deserialize, Serialize};
use url::Url;

/// Which extractor understands a site's markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionRule {
    Immich,
    DiarioDoMinho,
    NewAlbumReleases,
}

impl ExtractionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionRule::Immich => "immich",
            ExtractionRule::DiarioDoMinho => "diariodominho",
            ExtractionRule::NewAlbumReleases => "newalbumreleases",
        }
    }
}

impl std::str::FromStr for ExtractionRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "immich" => Ok(ExtractionRule::Immich),
            "diariodominho" => Ok(ExtractionRule::DiarioDoMinho),
            "newalbumreleases" => Ok(ExtractionRule::NewAlbumReleases),
            _ => Err(format!("Unknown extraction rule: {}", s)),
        }
    }
}

impl std::fmt::Display for ExtractionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One scrapeable source. Loaded from the embedded site table, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    pub id: String,
    pub name: String,
    pub url: Url,
    pub rule: ExtractionRule,
    pub description: String,
    pub language: String,
    pub email: String,
    pub max_articles: usize,
}

impl SiteDescriptor {
    /// Object key the site's feed is published under.
    pub fn object_key(&self) -> String {
        format!("{}.xml", self.id)
    }
}
