use crate::dataset::{load_dataset, Dataset};
use crate::error::LoadError;
use crate::sources::TableSource;
use anyhow::Result;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

/// Manages caching of raw downloaded tables
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Create a new cache manager with the specified cache directory
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    /// Get the cache path for a given URL
    pub fn get_cache_path(&self, url: &str) -> PathBuf {
        let hash = Self::hash_url(url);
        self.cache_dir.join(format!("{}.csv", hash))
    }

    pub fn is_cached(&self, url: &str) -> bool {
        self.get_cache_path(url).exists()
    }

    fn hash_url(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Read a cached table into memory
    pub fn read_cached(&self, url: &str) -> Result<Vec<u8>> {
        let path = self.get_cache_path(url);
        let mut file = fs::File::open(&path)?;
        let metadata = file.metadata()?;
        let mut buffer = Vec::with_capacity(metadata.len() as usize);
        file.read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Write a downloaded table to the cache (via a `.part` file, then rename)
    pub fn write_cached(&self, url: &str, data: &[u8]) -> Result<()> {
        let path = self.get_cache_path(url);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("part");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

/// Holds the loaded dataset for the lifetime of the process.
///
/// The first call to [`DatasetCache::get_or_load`] fetches and parses every
/// table; concurrent callers wait for that single population and then share
/// the same `Arc<Dataset>`. A failed load leaves the cache empty.
#[derive(Default)]
pub struct DatasetCache {
    cell: OnceCell<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load(&self, source: &dyn TableSource) -> Result<Arc<Dataset>, LoadError> {
        if let Some(dataset) = self.cell.get() {
            debug!("Using already loaded dataset");
            return Ok(Arc::clone(dataset));
        }

        self.cell
            .get_or_try_init(|| async { load_dataset(source).await.map(Arc::new) })
            .await
            .map(Arc::clone)
    }

    pub fn get(&self) -> Option<Arc<Dataset>> {
        self.cell.get().cloned()
    }
}
