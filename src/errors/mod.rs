use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Registry errors
    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    // Extraction errors
    #[error("Page parsing failed: {0}")]
    Parse(String),

    // Feed building errors
    #[error("Feed generation failed: {0}")]
    Feed(String),

    // Upload errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Output errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Batch errors
    #[error("{failed} of {total} sites failed")]
    SitesFailed { failed: usize, total: usize },
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;
