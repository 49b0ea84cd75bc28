pub mod http;
pub mod local;

use crate::error::LoadError;
use crate::types::{Config, DataSource, TableKind};
use anyhow::Result;
use async_trait::async_trait;

/// A place the raw CSV tables can be read from
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Human-readable location of a table, used in logs and errors
    fn location(&self, table: TableKind) -> String;

    async fn fetch_table(&self, table: TableKind) -> Result<Vec<u8>, LoadError>;
}

/// Interpret a `--data` argument: URLs are remote, anything else is a directory
pub fn parse_data_source(location: &str) -> DataSource {
    if location.starts_with("http://") || location.starts_with("https://") {
        DataSource::Remote(location.trim_end_matches('/').to_string())
    } else {
        DataSource::Local(location.into())
    }
}

pub fn create_source(source: &DataSource, config: &Config) -> Result<Box<dyn TableSource>> {
    match source {
        DataSource::Remote(base_url) => Ok(Box::new(http::HttpSource::new(
            base_url.clone(),
            &config.cache_dir,
            config.refresh,
            config.timeout_secs,
        )?)),
        DataSource::Local(dir) => Ok(Box::new(local::LocalSource::new(dir.clone()))),
    }
}
