pub mod fetch_service;
pub mod feed_service;
pub mod upload_service;
pub mod generate_service;

pub use fetch_service::{HttpFetcher, PageFetcher};
pub use feed_service::FeedBuilder;
pub use upload_service::UploadService;
pub use generate_service::{GenerateOptions, GenerateReport, GenerateService, SiteOutcome};
