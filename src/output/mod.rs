use crate::report::{Chart, DashboardReport};
use crate::types::{Config, OutFormat};
use anyhow::Result;
use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Writes a finished report to the output directory
pub struct OutputWriter;

impl OutputWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the report in the configured format, returning the files created
    pub fn write_report(&self, config: &Config, report: &DashboardReport) -> Result<Vec<PathBuf>> {
        if config.out_format == OutFormat::None {
            return Ok(Vec::new());
        }

        std::fs::create_dir_all(&config.output_dir)?;
        let suffix = Self::window_suffix(report);

        let paths = match config.out_format {
            OutFormat::None => Vec::new(),
            OutFormat::Json => {
                let path = config.output_dir.join(format!("report_{}.json", suffix));
                let file = File::create(&path)?;
                serde_json::to_writer_pretty(file, report)?;
                vec![path]
            }
            OutFormat::Parquet => {
                let mut paths = Vec::new();

                let path = config.output_dir.join(format!("metrics_{}.parquet", suffix));
                Self::write_metrics(&path, report)?;
                paths.push(path);

                for chart in report.charts() {
                    let path = config.output_dir.join(format!("{}_{}.parquet", chart.id, suffix));
                    Self::write_chart(&path, &chart)?;
                    paths.push(path);
                }
                paths
            }
        };

        for path in &paths {
            info!("Wrote {}", path.display());
        }
        Ok(paths)
    }

    fn window_suffix(report: &DashboardReport) -> String {
        format!(
            "{}-{}",
            report.window.start.format("%Y%m%d"),
            report.window.end.format("%Y%m%d")
        )
    }

    fn write_chart(path: &Path, chart: &Chart) -> Result<()> {
        let labels: Vec<&str> = chart.points.iter().map(|(l, _)| l.as_str()).collect();
        let values: Vec<f64> = chart.points.iter().map(|(_, v)| *v).collect();

        let schema = Arc::new(Schema::new(vec![
            Field::new("label", DataType::Utf8, false),
            Field::new("value", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(labels)) as ArrayRef,
                Arc::new(Float64Array::from(values)) as ArrayRef,
            ],
        )?;

        Self::write_batch(path, schema, &batch)
    }

    fn write_metrics(path: &Path, report: &DashboardReport) -> Result<()> {
        let tiles = report.metric_tiles();
        let labels: Vec<&str> = tiles.iter().map(|m| m.label).collect();
        let values: Vec<u64> = tiles.iter().map(|m| m.value).collect();

        let schema = Arc::new(Schema::new(vec![
            Field::new("metric", DataType::Utf8, false),
            Field::new("value", DataType::UInt64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(labels)) as ArrayRef,
                Arc::new(UInt64Array::from(values)) as ArrayRef,
            ],
        )?;

        Self::write_batch(path, schema, &batch)
    }

    fn write_batch(path: &Path, schema: Arc<Schema>, batch: &RecordBatch) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema, None)?;
        writer.write(batch)?;
        writer.close()?;
        Ok(())
    }
}

impl Default for OutputWriter {
    fn default() -> Self {
        Self::new()
    }
}
