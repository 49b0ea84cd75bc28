use crate::dataset::Dataset;
use crate::types::{Order, OrderItem, Payment, PARALLEL_THRESHOLD};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

/// Inclusive purchase-date range selected by the user.
///
/// Both bounds are compared against the full purchase timestamp at midnight,
/// so the end day itself only matches orders placed exactly at 00:00:00.
/// A window whose start lies after its end is allowed and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Dates of the earliest and latest purchase, or `None` without orders
    pub fn observed(orders: &[Order]) -> Option<Self> {
        let min = orders.iter().map(|o| o.order_purchase_timestamp).min()?;
        let max = orders.iter().map(|o| o.order_purchase_timestamp).max()?;
        Some(Self::new(min.date(), max.date()))
    }

    /// Window from optional user bounds, falling back to the observed range
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        orders: &[Order],
    ) -> Option<Self> {
        let observed = Self::observed(orders);
        let start = start.or(observed.map(|w| w.start))?;
        let end = end.or(observed.map(|w| w.end))?;
        Some(Self::new(start, end))
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.start.and_time(NaiveTime::MIN)
            && timestamp <= self.end.and_time(NaiveTime::MIN)
    }
}

/// Orders inside a window plus the payments and items that belong to them
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    pub window: TimeWindow,
    pub orders: Vec<&'a Order>,
    pub payments: Vec<&'a Payment>,
    pub items: Vec<&'a OrderItem>,
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a Dataset, window: TimeWindow) -> Self {
        let orders = filter_orders(&dataset.orders, &window);

        let order_ids: HashSet<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();

        let payments = dataset
            .payments
            .iter()
            .filter(|p| order_ids.contains(p.order_id.as_str()))
            .collect();
        let items = dataset
            .items
            .iter()
            .filter(|i| order_ids.contains(i.order_id.as_str()))
            .collect();

        Self {
            window,
            orders,
            payments,
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Orders whose purchase timestamp lies in the window, in input order
pub fn filter_orders<'a>(orders: &'a [Order], window: &TimeWindow) -> Vec<&'a Order> {
    if orders.len() > PARALLEL_THRESHOLD {
        orders
            .par_iter()
            .filter(|o| window.contains(o.order_purchase_timestamp))
            .collect()
    } else {
        orders
            .iter()
            .filter(|o| window.contains(o.order_purchase_timestamp))
            .collect()
    }
}
