use crate::aggregation::{
    monthly_revenue, order_status_distribution, payment_method_distribution,
    review_score_distribution, summary_metrics, top_categories, top_cities, Count, MonthlyRevenue,
    SummaryMetrics,
};
use crate::dataset::Dataset;
use crate::filter::{FilteredView, TimeWindow};
use serde::Serialize;
use tracing::{info, warn};

/// Every dataset the dashboard shows, for one time window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub window: TimeWindow,
    pub metrics: SummaryMetrics,
    pub top_categories: Vec<Count<String>>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub top_cities: Vec<Count<String>>,
    pub order_status: Vec<Count<String>>,
    pub payment_methods: Vec<Count<String>>,
    pub review_scores: Vec<Count<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    HorizontalBar,
    Line,
    VerticalBar,
    Count,
}

/// One chart ready for a display surface: axis labels plus (label, value) points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub id: &'static str,
    pub kind: ChartKind,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<(String, f64)>,
}

impl Chart {
    fn from_counts<K: ToString>(
        id: &'static str,
        kind: ChartKind,
        title: &'static str,
        x_label: &'static str,
        y_label: &'static str,
        counts: &[Count<K>],
    ) -> Self {
        Self {
            id,
            kind,
            title,
            x_label,
            y_label,
            points: counts
                .iter()
                .map(|c| (c.key.to_string(), c.count as f64))
                .collect(),
        }
    }
}

/// Labelled metric tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub value: u64,
}

impl DashboardReport {
    pub fn metric_tiles(&self) -> Vec<Metric> {
        let m = &self.metrics;
        vec![
            Metric { label: "Total Orders", value: m.total_orders },
            Metric { label: "Total Customers", value: m.total_customers },
            Metric { label: "Total Products", value: m.total_products },
            Metric { label: "Total Sellers", value: m.total_sellers },
            Metric { label: "Total Reviews", value: m.total_reviews },
            Metric { label: "Total Payments", value: m.total_payments },
        ]
    }

    /// Charts in page order
    pub fn charts(&self) -> Vec<Chart> {
        vec![
            Chart::from_counts(
                "top_categories",
                ChartKind::HorizontalBar,
                "Best-Selling Product Categories",
                "Order Count",
                "Product Category",
                &self.top_categories,
            ),
            Chart {
                id: "monthly_revenue",
                kind: ChartKind::Line,
                title: "Revenue per Month",
                x_label: "Month",
                y_label: "Total Revenue",
                points: self
                    .monthly_revenue
                    .iter()
                    .map(|m| (m.month.clone(), m.revenue))
                    .collect(),
            },
            Chart::from_counts(
                "top_cities",
                ChartKind::HorizontalBar,
                "Cities with Most Customers",
                "Customer Count",
                "City",
                &self.top_cities,
            ),
            Chart::from_counts(
                "order_status",
                ChartKind::VerticalBar,
                "Order Status",
                "Status",
                "Count",
                &self.order_status,
            ),
            Chart::from_counts(
                "payment_methods",
                ChartKind::VerticalBar,
                "Payment Methods",
                "Method",
                "Count",
                &self.payment_methods,
            ),
            Chart::from_counts(
                "review_scores",
                ChartKind::Count,
                "Product Ratings",
                "Review Score",
                "Count",
                &self.review_scores,
            ),
        ]
    }
}

/// Filter the dataset to `window` and run every aggregation on the rayon pool
pub fn build_report(dataset: &Dataset, window: TimeWindow, top_n: usize) -> DashboardReport {
    let view = FilteredView::new(dataset, window);

    info!(
        "Window {} .. {}: {} orders, {} payments, {} items",
        window.start,
        window.end,
        view.orders.len(),
        view.payments.len(),
        view.items.len()
    );
    if view.is_empty() {
        warn!("No orders in the selected window");
    }

    let ((metrics, (categories, revenue)), ((cities, status), (methods, scores))) = rayon::join(
        || {
            rayon::join(
                || summary_metrics(dataset, &view),
                || {
                    rayon::join(
                        || top_categories(&view.items, &dataset.products, &dataset.category_translation, top_n),
                        || monthly_revenue(&view.payments, &view.orders),
                    )
                },
            )
        },
        || {
            rayon::join(
                || {
                    rayon::join(
                        || top_cities(&dataset.customers, top_n),
                        || order_status_distribution(&view.orders),
                    )
                },
                || {
                    rayon::join(
                        || payment_method_distribution(&view.payments),
                        || review_score_distribution(&dataset.reviews),
                    )
                },
            )
        },
    );

    DashboardReport {
        window,
        metrics,
        top_categories: categories,
        monthly_revenue: revenue,
        top_cities: cities,
        order_status: status,
        payment_methods: methods,
        review_scores: scores,
    }
}
