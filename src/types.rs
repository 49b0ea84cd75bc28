use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Location of the public copy of the dataset
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/arnandaaaa/Proyek-Analisis-Data/refs/heads/main/data";

/// Row limit for the "top N" charts
pub const DEFAULT_TOP_N: usize = 10;

/// Timeout for a single table download, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Format of `order_purchase_timestamp`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Above this many rows the order filter runs on the rayon pool
pub const PARALLEL_THRESHOLD: usize = 10_000;

/// The eight tables that make up the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Customers,
    Orders,
    Payments,
    Reviews,
    Items,
    Products,
    Sellers,
    CategoryTranslation,
}

impl TableKind {
    pub const ALL: [TableKind; 8] = [
        TableKind::Customers,
        TableKind::Orders,
        TableKind::Payments,
        TableKind::Reviews,
        TableKind::Items,
        TableKind::Products,
        TableKind::Sellers,
        TableKind::CategoryTranslation,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            TableKind::Customers => "customers_dataset.csv",
            TableKind::Orders => "orders_dataset.csv",
            TableKind::Payments => "order_payments_dataset.csv",
            TableKind::Reviews => "order_reviews_dataset.csv",
            TableKind::Items => "order_items_dataset.csv",
            TableKind::Products => "products_dataset.csv",
            TableKind::Sellers => "sellers_dataset.csv",
            TableKind::CategoryTranslation => "product_category_name_translation.csv",
        }
    }

    /// Columns the pipeline reads from this table
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            TableKind::Customers => &["customer_id", "customer_city", "customer_state"],
            TableKind::Orders => &[
                "order_id",
                "customer_id",
                "order_status",
                "order_purchase_timestamp",
            ],
            TableKind::Payments => &["order_id", "payment_type", "payment_value"],
            TableKind::Reviews => &["order_id", "review_score"],
            TableKind::Items => &["order_id", "product_id"],
            TableKind::Products => &["product_id", "product_category_name"],
            TableKind::Sellers => &["seller_id"],
            TableKind::CategoryTranslation => {
                &["product_category_name", "product_category_name_english"]
            }
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TableKind::Customers => "customers",
            TableKind::Orders => "orders",
            TableKind::Payments => "payments",
            TableKind::Reviews => "reviews",
            TableKind::Items => "items",
            TableKind::Products => "products",
            TableKind::Sellers => "sellers",
            TableKind::CategoryTranslation => "category_translation",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub customer_city: String,
    pub customer_state: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    pub order_status: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub order_purchase_timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderItem {
    pub order_id: String,
    pub product_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Payment {
    pub order_id: String,
    pub payment_type: String,
    pub payment_value: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Review {
    pub order_id: String,
    pub review_score: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_category_name: Option<String>, // empty cell in the source
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryTranslation {
    pub product_category_name: String,
    pub product_category_name_english: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Seller {
    pub seller_id: String,
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

/// Where the tables come from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Remote(String),
    Local(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutFormat {
    None,
    Json,
    Parquet,
}

impl std::fmt::Display for OutFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutFormat::None => write!(f, "none"),
            OutFormat::Json => write!(f, "json"),
            OutFormat::Parquet => write!(f, "parquet"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data: DataSource,
    pub start: Option<NaiveDate>, // None: earliest purchase date
    pub end: Option<NaiveDate>,   // None: latest purchase date
    pub top_n: usize,
    pub out_format: OutFormat,
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    pub refresh: bool,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataSource::Remote(DEFAULT_DATA_URL.to_string()),
            start: None,
            end: None,
            top_n: DEFAULT_TOP_N,
            out_format: OutFormat::None,
            cache_dir: PathBuf::from("./cache"),
            output_dir: PathBuf::from("./output"),
            refresh: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Format a count with thousands separators, e.g. `99441` -> `99,441`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
