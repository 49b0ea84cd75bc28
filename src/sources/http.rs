use crate::cache::CacheManager;
use crate::error::LoadError;
use crate::sources::TableSource;
use crate::types::TableKind;
use anyhow::Result;
use async_trait::async_trait;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches tables over HTTP, backed by the on-disk download cache
pub struct HttpSource {
    agent: Arc<ureq::Agent>,
    base_url: String,
    cache: Arc<CacheManager>,
    refresh: bool,
    progress: Arc<MultiProgress>, // tables download concurrently
}

impl HttpSource {
    pub fn new(
        base_url: String,
        cache_dir: &Path,
        refresh: bool,
        timeout_secs: u64,
    ) -> Result<Self> {
        Ok(Self {
            agent: Arc::new(
                ureq::AgentBuilder::new()
                    .timeout(std::time::Duration::from_secs(timeout_secs))
                    .build(),
            ),
            base_url,
            cache: Arc::new(CacheManager::new(cache_dir.to_path_buf())?),
            refresh,
            progress: Arc::new(MultiProgress::new()),
        })
    }

    fn table_url(&self, table: TableKind) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), table.file_name())
    }

    fn download(
        agent: &ureq::Agent,
        progress: &MultiProgress,
        url: &str,
        table: TableKind,
    ) -> Result<Vec<u8>> {
        debug!("Downloading: {}", url);

        let response = agent
            .get(url)
            .call()
            .map_err(|e| anyhow::anyhow!("request failed: {}", e))?;

        let total_size = response
            .header("content-length")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        let pb = progress.add(ProgressBar::new(total_size));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {prefix:<22} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_prefix(table.to_string());

        let mut reader = response.into_reader();
        let mut data = Vec::with_capacity(total_size as usize);
        let mut buffer = [0; 8192];

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .map_err(|e| anyhow::anyhow!("failed to read response: {}", e))?;
            if bytes_read == 0 {
                break;
            }
            data.extend_from_slice(&buffer[..bytes_read]);
            pb.set_position(data.len() as u64);
        }

        pb.finish_and_clear();
        Ok(data)
    }
}

#[async_trait]
impl TableSource for HttpSource {
    fn location(&self, table: TableKind) -> String {
        self.table_url(table)
    }

    async fn fetch_table(&self, table: TableKind) -> Result<Vec<u8>, LoadError> {
        let url = self.table_url(table);
        let fetch_error = |message: String| LoadError::Fetch {
            table,
            location: url.clone(),
            message,
        };

        if !self.refresh && self.cache.is_cached(&url) {
            debug!("Using cached table {}: {}", table, self.cache.get_cache_path(&url).display());
            match self.cache.read_cached(&url) {
                Ok(data) => return Ok(data),
                Err(e) => warn!("Ignoring unreadable cache entry for {}: {}", table, e),
            }
        }

        info!("Fetching table {} from {}", table, url);

        // ureq is blocking
        let agent = self.agent.clone();
        let progress = self.progress.clone();
        let url_copy = url.clone();
        let data = tokio::task::spawn_blocking(move || {
            Self::download(&agent, &progress, &url_copy, table)
        })
        .await
        .map_err(|e| fetch_error(e.to_string()))?
        .map_err(|e| fetch_error(e.to_string()))?;

        if let Err(e) = self.cache.write_cached(&url, &data) {
            warn!("Failed to cache table {} in {}: {}", table, self.cache.cache_dir().display(), e);
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::path::PathBuf;

    fn temp_cache_dir(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join("ecommerce_report_tests")
            .join(format!("http-{}-{}", name, std::process::id()))
    }

    /// Serve one HTTP response with `body` on a random local port
    fn serve_once(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = [0u8; 4096];
                let _ = stream.read(&mut request);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}/data", addr)
    }

    #[tokio::test]
    async fn test_cached_table_skips_network_unless_refreshing() {
        let dir = temp_cache_dir("cached");
        // nothing listens on port 1
        let base_url = "http://127.0.0.1:1/data".to_string();
        let url = format!("{}/{}", base_url, TableKind::Sellers.file_name());
        CacheManager::new(dir.clone())
            .unwrap()
            .write_cached(&url, b"seller_id\ns1\n")
            .unwrap();

        let cached = HttpSource::new(base_url.clone(), &dir, false, 5).unwrap();
        let data = cached.fetch_table(TableKind::Sellers).await.unwrap();
        assert_eq!(data, b"seller_id\ns1\n");

        let refreshing = HttpSource::new(base_url, &dir, true, 5).unwrap();
        let err = refreshing.fetch_table(TableKind::Sellers).await.unwrap_err();
        match err {
            LoadError::Fetch { table, location, .. } => {
                assert_eq!(table, TableKind::Sellers);
                assert_eq!(location, url);
            }
            other => panic!("unexpected error: {}", other),
        }

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_download_fills_cache() {
        let dir = temp_cache_dir("download");
        let base_url = serve_once("seller_id\ns1\ns2\n");

        let source = HttpSource::new(base_url, &dir, false, 5).unwrap();
        let url = source.location(TableKind::Sellers);
        assert!(!source.cache.is_cached(&url));

        let data = source.fetch_table(TableKind::Sellers).await.unwrap();

        assert_eq!(data, b"seller_id\ns1\ns2\n");
        assert!(source.cache.is_cached(&url));
        assert_eq!(source.cache.read_cached(&url).unwrap(), data);

        let _ = std::fs::remove_dir_all(dir);
    }
}
