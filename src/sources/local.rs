use crate::error::LoadError;
use crate::sources::TableSource;
use crate::types::TableKind;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Reads tables from a directory holding the eight CSV files
pub struct LocalSource {
    dir: PathBuf,
}

impl LocalSource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn table_path(&self, table: TableKind) -> PathBuf {
        self.dir.join(table.file_name())
    }
}

#[async_trait]
impl TableSource for LocalSource {
    fn location(&self, table: TableKind) -> String {
        self.table_path(table).display().to_string()
    }

    async fn fetch_table(&self, table: TableKind) -> Result<Vec<u8>, LoadError> {
        let path = self.table_path(table);
        debug!("Reading table {} from {}", table, path.display());
        tokio::fs::read(&path).await.map_err(|e| LoadError::Fetch {
            table,
            location: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
