use crate::error::LoadError;
use crate::sources::TableSource;
use crate::types::{
    CategoryTranslation, Customer, Order, OrderItem, Payment, Product, Review, Seller, TableKind,
};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Every table of the dataset, parsed into typed records.
///
/// Built once per process and only ever read afterwards; share it behind an
/// `Arc` (see [`crate::cache::DatasetCache`]).
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    pub payments: Vec<Payment>,
    pub reviews: Vec<Review>,
    pub items: Vec<OrderItem>,
    pub products: Vec<Product>,
    pub sellers: Vec<Seller>,
    pub category_translation: Vec<CategoryTranslation>,
}

impl Dataset {
    pub fn row_count(&self, table: TableKind) -> usize {
        match table {
            TableKind::Customers => self.customers.len(),
            TableKind::Orders => self.orders.len(),
            TableKind::Payments => self.payments.len(),
            TableKind::Reviews => self.reviews.len(),
            TableKind::Items => self.items.len(),
            TableKind::Products => self.products.len(),
            TableKind::Sellers => self.sellers.len(),
            TableKind::CategoryTranslation => self.category_translation.len(),
        }
    }
}

/// Parse one CSV table, checking its header for the columns the pipeline needs
pub fn parse_table<T: DeserializeOwned>(table: TableKind, data: &[u8]) -> Result<Vec<T>, LoadError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(data);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Malformed { table, source })?
        .clone();

    for column in table.required_columns() {
        if !headers.iter().any(|h| h == *column) {
            return Err(LoadError::MissingColumn {
                table,
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for (i, result) in reader.deserialize::<T>().enumerate() {
        let row = result.map_err(|source| LoadError::Parse {
            table,
            row: i as u64 + 1,
            source,
        })?;
        rows.push(row);
    }

    debug!("Parsed {} rows from table {}", rows.len(), table);
    Ok(rows)
}

/// Fetch all eight tables concurrently and parse them.
///
/// The first failing table aborts the load; nothing is retried.
pub async fn load_dataset(source: &dyn TableSource) -> Result<Dataset, LoadError> {
    info!("Loading {} tables", TableKind::ALL.len());

    let (customers, orders, payments, reviews, items, products, sellers, translation) = tokio::try_join!(
        source.fetch_table(TableKind::Customers),
        source.fetch_table(TableKind::Orders),
        source.fetch_table(TableKind::Payments),
        source.fetch_table(TableKind::Reviews),
        source.fetch_table(TableKind::Items),
        source.fetch_table(TableKind::Products),
        source.fetch_table(TableKind::Sellers),
        source.fetch_table(TableKind::CategoryTranslation),
    )?;

    let dataset = Dataset {
        customers: parse_table(TableKind::Customers, &customers)?,
        orders: parse_table(TableKind::Orders, &orders)?,
        payments: parse_table(TableKind::Payments, &payments)?,
        reviews: parse_table(TableKind::Reviews, &reviews)?,
        items: parse_table(TableKind::Items, &items)?,
        products: parse_table(TableKind::Products, &products)?,
        sellers: parse_table(TableKind::Sellers, &sellers)?,
        category_translation: parse_table(TableKind::CategoryTranslation, &translation)?,
    };

    for table in TableKind::ALL {
        info!("Loaded {:>8} rows from {}", dataset.row_count(table), source.location(table));
    }

    Ok(dataset)
}
