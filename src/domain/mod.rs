pub mod article;
pub mod feed;
pub mod site;

pub use article::ArticleRecord;
pub use feed::FeedDocument;
pub use site::{ExtractionRule, SiteDescriptor};
