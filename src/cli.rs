use crate::sources::parse_data_source;
use crate::types::{Config, OutFormat, DEFAULT_DATA_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOP_N};
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL or local directory holding the eight CSV tables
    #[arg(long, default_value = DEFAULT_DATA_URL)]
    pub data: String,

    /// First purchase date to include (YYYY-MM-DD); defaults to the earliest order
    #[arg(long)]
    pub start: Option<String>,

    /// Last purchase date to include (YYYY-MM-DD); defaults to the latest order
    #[arg(long)]
    pub end: Option<String>,

    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// none, json or parquet
    #[arg(long, default_value = "none")]
    pub out_format: String,

    #[arg(long, default_value = "./cache")]
    pub cache_dir: PathBuf,

    #[arg(long, default_value = "./output")]
    pub output_dir: PathBuf,

    /// Download every table again instead of using the cache
    #[arg(long)]
    pub refresh: bool,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl Args {
    pub fn into_config(self) -> Result<Config> {
        let start = self.start.as_deref().map(parse_date).transpose()?;
        let end = self.end.as_deref().map(parse_date).transpose()?;

        let out_format = match self.out_format.as_str() {
            "none" => OutFormat::None,
            "json" => OutFormat::Json,
            "parquet" => OutFormat::Parquet,
            other => return Err(anyhow!("Invalid output format: {}", other)),
        };

        if self.top == 0 {
            return Err(anyhow!("--top must be at least 1"));
        }

        Ok(Config {
            data: parse_data_source(&self.data),
            start,
            end,
            top_n: self.top,
            out_format,
            cache_dir: self.cache_dir,
            output_dir: self.output_dir,
            refresh: self.refresh,
            timeout_secs: self.timeout_secs,
        })
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow!("Invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
}
