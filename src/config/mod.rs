use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::errors::{GeneratorError, GeneratorResult};

pub const ACCESS_KEY_VAR: &str = "MINIO_ACCESS_KEY";
pub const SECRET_KEY_VAR: &str = "MINIO_SECRET_KEY";
pub const ENDPOINT_VAR: &str = "MINIO_ENDPOINT";
pub const BUCKET_VAR: &str = "MINIO_BUCKET";
pub const REGION_VAR: &str = "MINIO_REGION";
pub const TIMEOUT_VAR: &str = "RSS_HTTP_TIMEOUT_SECS";
pub const USER_AGENT_VAR: &str = "RSS_USER_AGENT";

const DEFAULT_BUCKET: &str = "rss-feeds";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = concat!("rss-generator/", env!("CARGO_PKG_VERSION"));

/// Credentials for the object store. Read-only for the life of the process.
pub struct StorageCredentials {
    pub access_key: String,
    pub secret_key: SecretString,
    pub endpoint: Url,
}

impl StorageCredentials {
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

/// A single problem found by [`Config::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    Missing(&'static str),
    Malformed { var: &'static str, reason: String },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::Missing(var) => write!(f, "{} is not set", var),
            ConfigIssue::Malformed { var, reason } => write!(f, "{} is malformed: {}", var, reason),
        }
    }
}

pub struct Config {
    pub access_key: Option<String>,
    pub secret_key: Option<SecretString>,
    pub endpoint: Option<String>,
    pub bucket: String,
    pub region: String,
    /// Raw `RSS_HTTP_TIMEOUT_SECS`; parsed by [`Config::http_timeout`]
    pub timeout_secs: Option<String>,
    pub user_agent: String,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> GeneratorResult<Self> {
        // Try to load .env from executable's directory first
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        Ok(Self::from_lookup(|name| std::env::var(name).ok()))
    }

    /// Build a config from an arbitrary variable source. Empty values count as unset.
    /// Nothing is validated here; see [`Config::check`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            access_key: get(ACCESS_KEY_VAR),
            secret_key: get(SECRET_KEY_VAR).map(SecretString::from),
            endpoint: get(ENDPOINT_VAR),
            bucket: get(BUCKET_VAR).unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            region: get(REGION_VAR).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            timeout_secs: get(TIMEOUT_VAR),
            user_agent: get(USER_AGENT_VAR).unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }

    /// HTTP client timeout, 30 seconds unless overridden.
    pub fn http_timeout(&self) -> GeneratorResult<Duration> {
        match self.timeout_secs.as_deref() {
            Some(raw) => parse_timeout(raw)
                .map_err(|reason| GeneratorError::Config(format!("{}: {}", TIMEOUT_VAR, reason))),
            None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Storage credentials, failing on the first missing or malformed value.
    pub fn credentials(&self) -> GeneratorResult<StorageCredentials> {
        let access_key = self
            .access_key
            .clone()
            .ok_or_else(|| GeneratorError::MissingEnvVar(ACCESS_KEY_VAR.to_string()))?;

        let secret_key = self
            .secret_key
            .as_ref()
            .map(|secret| SecretString::from(secret.expose_secret()))
            .ok_or_else(|| GeneratorError::MissingEnvVar(SECRET_KEY_VAR.to_string()))?;

        let raw_endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| GeneratorError::MissingEnvVar(ENDPOINT_VAR.to_string()))?;

        let endpoint = parse_endpoint(raw_endpoint)
            .map_err(|reason| GeneratorError::Config(format!("{}: {}", ENDPOINT_VAR, reason)))?;

        Ok(StorageCredentials {
            access_key,
            secret_key,
            endpoint,
        })
    }

    /// Every configuration problem at once. Empty means the config is usable.
    pub fn check(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.access_key.is_none() {
            issues.push(ConfigIssue::Missing(ACCESS_KEY_VAR));
        }
        if self.secret_key.is_none() {
            issues.push(ConfigIssue::Missing(SECRET_KEY_VAR));
        }
        match self.endpoint.as_deref() {
            None => issues.push(ConfigIssue::Missing(ENDPOINT_VAR)),
            Some(raw) => {
                if let Err(reason) = parse_endpoint(raw) {
                    issues.push(ConfigIssue::Malformed {
                        var: ENDPOINT_VAR,
                        reason,
                    });
                }
            }
        }
        if let Some(Err(reason)) = self.timeout_secs.as_deref().map(parse_timeout) {
            issues.push(ConfigIssue::Malformed {
                var: TIMEOUT_VAR,
                reason,
            });
        }

        issues
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| format!("expected whole seconds, got {:?}", raw))
}

/// Endpoints without a scheme are assumed to be https.
pub fn parse_endpoint(raw: &str) -> Result<Url, String> {
    let raw = raw.trim();
    let lowered = raw.to_ascii_lowercase();
    let candidate = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let url = Url::parse(&candidate).map_err(|e| e.to_string())?;
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    fn full_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            (ACCESS_KEY_VAR, "access"),
            (SECRET_KEY_VAR, "secret"),
            (ENDPOINT_VAR, "minio.example.com"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.bucket, "rss-feeds");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.http_timeout().unwrap(), Duration::from_secs(30));
        assert!(config.user_agent.starts_with("rss-generator/"));
    }

    #[test]
    fn test_check_reports_every_missing_var() {
        let config = config_from(&[]);
        let issues = config.check();

        assert_eq!(
            issues,
            vec![
                ConfigIssue::Missing(ACCESS_KEY_VAR),
                ConfigIssue::Missing(SECRET_KEY_VAR),
                ConfigIssue::Missing(ENDPOINT_VAR),
            ]
        );
    }

    #[test]
    fn test_check_passes_with_all_values() {
        let config = config_from(&full_vars());
        assert!(config.check().is_empty());
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let config = config_from(&[(ACCESS_KEY_VAR, "   "), (SECRET_KEY_VAR, "s"), (ENDPOINT_VAR, "e.com")]);
        assert_eq!(config.check(), vec![ConfigIssue::Missing(ACCESS_KEY_VAR)]);
    }

    #[test]
    fn test_check_flags_malformed_endpoint() {
        let config = config_from(&[
            (ACCESS_KEY_VAR, "a"),
            (SECRET_KEY_VAR, "s"),
            (ENDPOINT_VAR, "http://"),
        ]);

        let issues = config.check();
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0], ConfigIssue::Malformed { var: ENDPOINT_VAR, .. }));
    }

    #[test]
    fn test_credentials_adds_https_scheme() {
        let config = config_from(&full_vars());
        let creds = config.credentials().unwrap();

        assert_eq!(creds.endpoint.as_str(), "https://minio.example.com/");
        assert_eq!(creds.access_key, "access");
        assert_eq!(creds.secret_key(), "secret");
    }

    #[test]
    fn test_credentials_keeps_explicit_scheme() {
        let endpoint = parse_endpoint("http://localhost:9000").unwrap();
        assert_eq!(endpoint.scheme(), "http");
        assert_eq!(endpoint.port(), Some(9000));
    }

    #[test]
    fn test_credentials_missing_secret() {
        let config = config_from(&[(ACCESS_KEY_VAR, "a"), (ENDPOINT_VAR, "e.com")]);
        let err = config.credentials().unwrap_err();
        assert!(matches!(err, GeneratorError::MissingEnvVar(ref v) if v == SECRET_KEY_VAR));
    }

    #[test]
    fn test_invalid_timeout_is_reported_not_fatal() {
        let mut vars = full_vars();
        vars.push((TIMEOUT_VAR, "soon"));
        let config = config_from(&vars);

        assert!(matches!(config.http_timeout(), Err(GeneratorError::Config(_))));
        assert_eq!(config.check().len(), 1);
        assert!(matches!(config.check()[0], ConfigIssue::Malformed { var: TIMEOUT_VAR, .. }));
    }

    #[test]
    fn test_custom_timeout() {
        let config = config_from(&[(TIMEOUT_VAR, " 5 ")]);
        assert_eq!(config.http_timeout().unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_uppercase_scheme_is_kept() {
        let endpoint = parse_endpoint("HTTP://minio.local:9000").unwrap();
        assert_eq!(endpoint.scheme(), "http");
        assert_eq!(endpoint.host_str(), Some("minio.local"));
        assert_eq!(endpoint.port(), Some(9000));

        let endpoint = parse_endpoint("Https://minio.example.com").unwrap();
        assert_eq!(endpoint.as_str(), "https://minio.example.com/");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = config_from(&full_vars());
        let creds = config.credentials().unwrap();

        assert!(!format!("{:?}", config).contains("secret\""));
        assert!(format!("{:?}", creds).contains("[REDACTED]"));
        assert!(!format!("{:?}", creds).contains("\"secret\""));
    }
}
