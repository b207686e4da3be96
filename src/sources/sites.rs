use std::collections::HashSet;

use crate::domain::SiteDescriptor;
use crate::errors::{GeneratorError, GeneratorResult};

/// Built-in site table
const SITE_TABLE: &str = include_str!("sites.json");

pub struct SiteRegistry {
    sites: Vec<SiteDescriptor>,
}

impl SiteRegistry {
    /// Registry of the built-in sites.
    pub fn new() -> GeneratorResult<Self> {
        Self::from_json(SITE_TABLE)
    }

    pub fn from_json(table: &str) -> GeneratorResult<Self> {
        let sites: Vec<SiteDescriptor> = serde_json::from_str(table)
            .map_err(|e| GeneratorError::Config(format!("Invalid site table: {}", e)))?;

        let mut ids = HashSet::new();
        for site in &sites {
            if site.id.trim().is_empty() {
                return Err(GeneratorError::Config("Site with empty id".to_string()));
            }
            if !ids.insert(site.id.as_str()) {
                return Err(GeneratorError::Config(format!("Duplicate site id: {}", site.id)));
            }
        }

        Ok(Self { sites })
    }

    /// All sites in table order
    pub fn list_sites(&self) -> &[SiteDescriptor] {
        &self.sites
    }

    pub fn get_site(&self, id: &str) -> GeneratorResult<&SiteDescriptor> {
        self.sites
            .iter()
            .find(|site| site.id == id)
            .ok_or_else(|| GeneratorError::UnknownSite(id.to_string()))
    }
}
