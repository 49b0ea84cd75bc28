use crate::dataset::Dataset;
use crate::filter::FilteredView;
use crate::types::{CategoryTranslation, Customer, Order, OrderItem, Payment, Product, Review};
use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Number of rows sharing one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count<K> {
    pub key: K,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: String, // YYYY-MM
    pub revenue: f64,
}

/// Raw row counts shown as metric tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SummaryMetrics {
    pub total_orders: u64,    // filtered
    pub total_customers: u64,
    pub total_products: u64,
    pub total_sellers: u64,
    pub total_reviews: u64,
    pub total_payments: u64,  // filtered
}

/// Count rows per key, keeping keys in order of first appearance.
///
/// Rows whose key extractor returns `None` are skipped.
pub fn count_by<'a, T, K, I, F>(rows: I, key: F) -> Vec<Count<K>>
where
    T: 'a,
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&'a T) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<Count<K>> = Vec::new();

    for row in rows {
        let Some(k) = key(row) else { continue };
        match index.get(&k) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(k.clone(), counts.len());
                counts.push(Count { key: k, count: 1 });
            }
        }
    }

    counts
}

/// Sort by count, largest first. Ties keep their input order.
pub fn sort_by_count_desc<K>(counts: &mut [Count<K>]) {
    counts.sort_by(|a, b| b.count.cmp(&a.count));
}

pub fn summary_metrics(dataset: &Dataset, view: &FilteredView<'_>) -> SummaryMetrics {
    SummaryMetrics {
        total_orders: view.orders.len() as u64,
        total_customers: dataset.customers.len() as u64,
        total_products: dataset.products.len() as u64,
        total_sellers: dataset.sellers.len() as u64,
        total_reviews: dataset.reviews.len() as u64,
        total_payments: view.payments.len() as u64,
    }
}

/// Best-selling categories by number of order items.
///
/// Each item's product and each product's English category name come from a
/// lookup (first match per key). Items without a product, a category or a
/// translation have no English name and are left out of the ranking.
pub fn top_categories(
    items: &[&OrderItem],
    products: &[Product],
    translations: &[CategoryTranslation],
    limit: usize,
) -> Vec<Count<String>> {
    // first occurrence wins on duplicate keys
    let mut category_of: HashMap<&str, Option<&str>> = HashMap::with_capacity(products.len());
    for product in products {
        category_of
            .entry(product.product_id.as_str())
            .or_insert(product.product_category_name.as_deref());
    }

    let mut english_of: HashMap<&str, &str> = HashMap::with_capacity(translations.len());
    for t in translations {
        english_of
            .entry(t.product_category_name.as_str())
            .or_insert(t.product_category_name_english.as_str());
    }

    let mut counts = count_by(items.iter().copied(), |item: &OrderItem| {
        let raw = category_of.get(item.product_id.as_str()).copied().flatten()?;
        english_of.get(raw).map(|name| name.to_string())
    });

    sort_by_count_desc(&mut counts);
    counts.truncate(limit);
    counts
}

/// Sum of payment values per purchase month, oldest month first.
///
/// Each payment's order is found by lookup in `orders` (first match per
/// order id); a payment whose order is not in `orders` contributes nothing.
pub fn monthly_revenue(payments: &[&Payment], orders: &[&Order]) -> Vec<MonthlyRevenue> {
    let mut purchased_at = HashMap::with_capacity(orders.len());
    for order in orders {
        purchased_at
            .entry(order.order_id.as_str())
            .or_insert(order.order_purchase_timestamp);
    }

    let mut by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for payment in payments {
        if let Some(ts) = purchased_at.get(payment.order_id.as_str()) {
            *by_month.entry((ts.year(), ts.month())).or_insert(0.0) += payment.payment_value;
        }
    }

    by_month
        .into_iter()
        .map(|((year, month), revenue)| MonthlyRevenue {
            month: format!("{:04}-{:02}", year, month),
            revenue,
        })
        .collect()
}

/// Cities with the most customers, over the whole customers table
pub fn top_cities(customers: &[Customer], limit: usize) -> Vec<Count<String>> {
    let mut counts = count_by(customers, |c: &Customer| Some(c.customer_city.clone()));
    sort_by_count_desc(&mut counts);
    counts.truncate(limit);
    counts
}

pub fn order_status_distribution(orders: &[&Order]) -> Vec<Count<String>> {
    let mut counts = count_by(orders.iter().copied(), |o: &Order| Some(o.order_status.clone()));
    sort_by_count_desc(&mut counts);
    counts
}

pub fn payment_method_distribution(payments: &[&Payment]) -> Vec<Count<String>> {
    let mut counts = count_by(payments.iter().copied(), |p: &Payment| Some(p.payment_type.clone()));
    sort_by_count_desc(&mut counts);
    counts
}

/// Reviews per score, lowest score first.
///
/// Takes the full reviews table: the date window does not apply to ratings.
pub fn review_score_distribution(reviews: &[Review]) -> Vec<Count<u8>> {
    let mut counts = count_by(reviews, |r: &Review| Some(r.review_score));
    counts.sort_by_key(|c| c.key);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TimeWindow;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn order(id: &str, at: NaiveDateTime, status: &str) -> Order {
        Order {
            order_id: id.to_string(),
            customer_id: format!("c{}", id),
            order_status: status.to_string(),
            order_purchase_timestamp: at,
        }
    }

    fn payment(order_id: &str, kind: &str, value: f64) -> Payment {
        Payment {
            order_id: order_id.to_string(),
            payment_type: kind.to_string(),
            payment_value: value,
        }
    }

    fn item(order_id: &str, product_id: &str) -> OrderItem {
        OrderItem {
            order_id: order_id.to_string(),
            product_id: product_id.to_string(),
        }
    }

    fn product(id: &str, category: Option<&str>) -> Product {
        Product {
            product_id: id.to_string(),
            product_category_name: category.map(str::to_string),
        }
    }

    fn translation(raw: &str, english: &str) -> CategoryTranslation {
        CategoryTranslation {
            product_category_name: raw.to_string(),
            product_category_name_english: english.to_string(),
        }
    }

    fn customer(id: &str, city: &str) -> Customer {
        Customer {
            customer_id: id.to_string(),
            customer_city: city.to_string(),
            customer_state: "SP".to_string(),
        }
    }

    fn review(order_id: &str, score: u8) -> Review {
        Review {
            order_id: order_id.to_string(),
            review_score: score,
        }
    }

    #[test]
    fn test_count_by_first_seen_order() {
        let rows = vec!["b", "a", "b", "c", "a", "b"];
        let counts = count_by(&rows, |r: &&str| Some(r.to_string()));

        let keys: Vec<_> = counts.iter().map(|c| (c.key.as_str(), c.count)).collect();
        assert_eq!(keys, vec![("b", 3), ("a", 2), ("c", 1)]);
    }

    #[test]
    fn test_sort_desc_is_stable_on_ties() {
        let mut counts = vec![
            Count { key: "x", count: 1 },
            Count { key: "y", count: 2 },
            Count { key: "z", count: 1 },
            Count { key: "w", count: 2 },
        ];
        sort_by_count_desc(&mut counts);

        let keys: Vec<_> = counts.iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn test_top_categories_counts_items() {
        let items = vec![
            item("o1", "p1"),
            item("o1", "p1"),
            item("o2", "p2"),
            item("o3", "p3"), // no translation
            item("o4", "p4"), // no category
            item("o5", "missing"),
            item("o6", "p5"),
        ];
        let refs: Vec<&OrderItem> = items.iter().collect();
        let products = vec![
            product("p1", Some("cama_mesa_banho")),
            product("p2", Some("beleza_saude")),
            product("p3", Some("pc_gamer")),
            product("p4", None),
            product("p5", Some("beleza_saude")),
        ];
        let translations = vec![
            translation("cama_mesa_banho", "bed_bath_table"),
            translation("beleza_saude", "health_beauty"),
        ];

        let top = top_categories(&refs, &products, &translations, 10);

        assert_eq!(
            top,
            vec![
                Count { key: "bed_bath_table".to_string(), count: 2 },
                Count { key: "health_beauty".to_string(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_top_categories_truncates() {
        let products: Vec<Product> = (0..15)
            .map(|i| product(&format!("p{}", i), Some(format!("raw{}", i).as_str())))
            .collect();
        let translations: Vec<CategoryTranslation> = (0..15)
            .map(|i| translation(&format!("raw{}", i), &format!("cat{}", i)))
            .collect();
        let mut items = Vec::new();
        for i in 0..15 {
            for _ in 0..=i {
                items.push(item("o", &format!("p{}", i)));
            }
        }
        let refs: Vec<&OrderItem> = items.iter().collect();

        let top = top_categories(&refs, &products, &translations, 10);

        assert_eq!(top.len(), 10);
        assert_eq!(top[0].key, "cat14");
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_monthly_revenue_sums_and_orders_by_month() {
        let orders = vec![
            order("1", ts(2017, 5, 3), "delivered"),
            order("2", ts(2017, 1, 20), "delivered"),
            order("3", ts(2017, 5, 28), "shipped"),
        ];
        let order_refs: Vec<&Order> = orders.iter().collect();
        let payments = vec![
            payment("1", "credit_card", 10.5),
            payment("2", "boleto", 20.0),
            payment("3", "voucher", 4.5),
            payment("1", "voucher", 5.0),
            payment("unknown", "boleto", 99.0),
        ];
        let payment_refs: Vec<&Payment> = payments.iter().collect();

        let revenue = monthly_revenue(&payment_refs, &order_refs);

        assert_eq!(
            revenue,
            vec![
                MonthlyRevenue { month: "2017-01".to_string(), revenue: 20.0 },
                MonthlyRevenue { month: "2017-05".to_string(), revenue: 20.0 },
            ]
        );
    }

    #[test]
    fn test_monthly_revenue_crosses_year() {
        let orders = vec![
            order("1", ts(2018, 1, 2), "delivered"),
            order("2", ts(2017, 12, 30), "delivered"),
        ];
        let order_refs: Vec<&Order> = orders.iter().collect();
        let payments = vec![payment("1", "boleto", 1.0), payment("2", "boleto", 2.0)];
        let payment_refs: Vec<&Payment> = payments.iter().collect();

        let months: Vec<_> = monthly_revenue(&payment_refs, &order_refs)
            .into_iter()
            .map(|m| m.month)
            .collect();

        assert_eq!(months, vec!["2017-12", "2018-01"]);
    }

    #[test]
    fn test_duplicate_keys_use_first_match() {
        let items = vec![item("o1", "p1"), item("o2", "p1")];
        let item_refs: Vec<&OrderItem> = items.iter().collect();
        let products = vec![
            product("p1", Some("beleza_saude")),
            product("p1", Some("cama_mesa_banho")),
        ];
        let translations = vec![
            translation("beleza_saude", "health_beauty"),
            translation("beleza_saude", "beauty"),
            translation("cama_mesa_banho", "bed_bath_table"),
        ];

        let top = top_categories(&item_refs, &products, &translations, 10);
        assert_eq!(top, vec![Count { key: "health_beauty".to_string(), count: 2 }]);

        let orders = vec![
            order("1", ts(2017, 3, 1), "delivered"),
            order("1", ts(2017, 4, 1), "delivered"),
        ];
        let order_refs: Vec<&Order> = orders.iter().collect();
        let payments = vec![payment("1", "boleto", 7.0)];
        let payment_refs: Vec<&Payment> = payments.iter().collect();

        let revenue = monthly_revenue(&payment_refs, &order_refs);
        assert_eq!(
            revenue,
            vec![MonthlyRevenue { month: "2017-03".to_string(), revenue: 7.0 }]
        );
    }

    #[test]
    fn test_top_cities() {
        let mut customers = Vec::new();
        for i in 0..12 {
            for j in 0..(12 - i) {
                customers.push(customer(&format!("{}-{}", i, j), &format!("city{}", i)));
            }
        }

        let top = top_cities(&customers, 10);

        assert_eq!(top.len(), 10);
        assert_eq!(top[0], Count { key: "city0".to_string(), count: 12 });
        assert_eq!(top[9], Count { key: "city9".to_string(), count: 3 });
    }

    #[test]
    fn test_status_and_payment_distributions() {
        let orders = vec![
            order("1", ts(2017, 1, 1), "shipped"),
            order("2", ts(2017, 1, 2), "delivered"),
            order("3", ts(2017, 1, 3), "delivered"),
        ];
        let order_refs: Vec<&Order> = orders.iter().collect();
        let payments = vec![
            payment("1", "voucher", 1.0),
            payment("2", "credit_card", 1.0),
            payment("3", "credit_card", 1.0),
            payment("3", "voucher", 1.0),
            payment("3", "voucher", 1.0),
        ];
        let payment_refs: Vec<&Payment> = payments.iter().collect();

        let status = order_status_distribution(&order_refs);
        assert_eq!(status[0], Count { key: "delivered".to_string(), count: 2 });
        assert_eq!(status[1], Count { key: "shipped".to_string(), count: 1 });

        let methods = payment_method_distribution(&payment_refs);
        assert_eq!(methods[0], Count { key: "voucher".to_string(), count: 3 });
        assert_eq!(methods[1], Count { key: "credit_card".to_string(), count: 2 });
    }

    #[test]
    fn test_review_scores_ascending() {
        let reviews = vec![review("a", 5), review("b", 1), review("c", 5), review("d", 3)];

        let scores = review_score_distribution(&reviews);

        assert_eq!(
            scores,
            vec![
                Count { key: 1, count: 1 },
                Count { key: 3, count: 1 },
                Count { key: 5, count: 2 },
            ]
        );
    }

    #[test]
    fn test_summary_metrics_mix_filtered_and_full_counts() {
        let dataset = Dataset {
            customers: vec![customer("c1", "sao paulo"), customer("c2", "rio de janeiro")],
            orders: vec![
                order("1", ts(2017, 1, 5), "delivered"),
                order("2", ts(2017, 2, 10), "canceled"),
            ],
            payments: vec![payment("1", "boleto", 100.0), payment("2", "boleto", 50.0)],
            reviews: vec![review("1", 5), review("2", 1), review("2", 2)],
            ..Default::default()
        };
        let window = TimeWindow::new(
            NaiveDate::from_ymd_opt(2017, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2017, 1, 31).unwrap(),
        );
        let view = FilteredView::new(&dataset, window);

        let metrics = summary_metrics(&dataset, &view);

        assert_eq!(
            metrics,
            SummaryMetrics {
                total_orders: 1,
                total_customers: 2,
                total_products: 0,
                total_sellers: 0,
                total_reviews: 3,
                total_payments: 1,
            }
        );
    }
}
