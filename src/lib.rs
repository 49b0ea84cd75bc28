pub mod aggregation;
pub mod cache;
pub mod cli;
pub mod dataset;
pub mod display;
pub mod error;
pub mod filter;
pub mod output;
pub mod report;
pub mod sources;
pub mod types;

// Re-exports for library users
pub use aggregation::{Count, MonthlyRevenue, SummaryMetrics};
pub use cache::{CacheManager, DatasetCache};
pub use dataset::{load_dataset, Dataset};
pub use display::display_report;
pub use error::LoadError;
pub use filter::{FilteredView, TimeWindow};
pub use report::{build_report, Chart, ChartKind, DashboardReport};
pub use sources::{create_source, TableSource};
pub use types::{Config, DataSource, OutFormat, TableKind, DEFAULT_DATA_URL, DEFAULT_TOP_N};
