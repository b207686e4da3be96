pub mod traits;
pub mod html;
pub mod immich;
pub mod diariodominho;
pub mod newalbumreleases;
pub mod registry;
pub mod sites;

pub use traits::{Extractor, PageMetadata};
pub use registry::ExtractorRegistry;
pub use sites::SiteRegistry;
