//! Pure derivation of view-model structures from a fetched batch.
//!
//! Stateless and synchronous: the same input always yields the same output,
//! and nothing here ever fails. Derivations that cannot be completed degrade
//! to zeroed or empty results.

use crate::model::{
    CategorySummary, DateRange, ProductSummary, ReportView, SourceBatch, TransactionRecord,
    TrendPoint,
};
use crate::util::{month_label, month_starts_in_range, next_month_start};

/// Template applied when a total is known but nothing tells us how it
/// splits. The shares are an estimate, not observed data.
const DEFAULT_SPLIT: [(&str, f64); 3] =
    [("Product Sales", 70.0), ("Services", 20.0), ("Other", 10.0)];

/// Share assumed for a category that appears in no known breakdown.
const DEFAULT_CATEGORY_SHARE: f64 = 10.0;

/// Derives the full view-model for one fetched batch.
pub fn aggregate(batch: SourceBatch, range: DateRange, category: Option<&str>) -> ReportView {
    let breakdown = category_breakdown(&batch);
    let products = product_rollup(&batch.records);
    let trend = monthly_trend(&batch, range, category, &breakdown);

    ReportView {
        range,
        records: batch.records,
        breakdown,
        products,
        trend,
    }
}

/// Category breakdown, in order of preference: the upstream breakdown
/// verbatim, a grouping of the raw records, or the fixed template against a
/// known total.
pub fn category_breakdown(batch: &SourceBatch) -> Vec<CategorySummary> {
    if let Some(summary) = &batch.summary {
        if !summary.breakdown.is_empty() {
            return summary.breakdown.clone();
        }
    }

    if !batch.records.is_empty() {
        return group_by_category(&batch.records);
    }

    let total = batch.summary.as_ref().map(|s| s.total).unwrap_or(0.0);
    if total > 0.0 {
        return DEFAULT_SPLIT
            .iter()
            .map(|(name, share)| CategorySummary {
                category: name.to_string(),
                amount: total * share / 100.0,
                percentage: *share,
            })
            .collect();
    }

    Vec::new()
}

/// Groups records by category, using the free-text note as a pseudo-category
/// for records that carry none. Percentages close to 100 when the total is
/// positive; a zero total yields all-zero percentages.
fn group_by_category(records: &[TransactionRecord]) -> Vec<CategorySummary> {
    let mut groups: Vec<(String, f64)> = Vec::new();
    let mut total = 0.0;

    for record in records {
        let key = record
            .category
            .as_deref()
            .or(record.note.as_deref())
            .unwrap_or("Uncategorized");
        total += record.amount;
        match groups.iter_mut().find(|(name, _)| name == key) {
            Some((_, amount)) => *amount += record.amount,
            None => groups.push((key.to_string(), record.amount)),
        }
    }

    let mut breakdown: Vec<CategorySummary> = groups
        .into_iter()
        .map(|(category, amount)| CategorySummary {
            category,
            amount,
            percentage: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
        })
        .collect();

    breakdown.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(std::cmp::Ordering::Equal));
    breakdown
}

/// Folds every line item across every record into per-product totals, keyed
/// by item id, then SKU, then a generated key. Products that end with no
/// positive quantity are dropped; the result is sorted by total, descending.
pub fn product_rollup(records: &[TransactionRecord]) -> Vec<ProductSummary> {
    let mut keyed: Vec<(String, ProductSummary)> = Vec::new();
    let mut generated = 0usize;

    for record in records {
        for item in &record.items {
            let key = item
                .item_id
                .clone()
                .or_else(|| item.sku.clone())
                .unwrap_or_else(|| {
                    generated += 1;
                    format!("item-{generated}")
                });

            match keyed.iter_mut().find(|(k, _)| *k == key) {
                Some((_, product)) => {
                    product.quantity += item.quantity;
                    product.total += item.price * item.quantity as f64;
                }
                None => keyed.push((
                    key,
                    ProductSummary {
                        name: item.name.clone(),
                        sku: item.sku.clone(),
                        quantity: item.quantity,
                        total: item.price * item.quantity as f64,
                    },
                )),
            }
        }
    }

    let mut products: Vec<ProductSummary> = keyed
        .into_iter()
        .map(|(_, product)| product)
        .filter(|product| product.quantity > 0)
        .collect();

    products.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));
    products
}

/// Chronological per-month series for the range.
///
/// Upstream per-category values are used directly. When the upstream trend
/// only carries period totals, a category's contribution is approximated as
/// `total * share / 100` using the share from `breakdown` (10% when the
/// category appears nowhere) -- an estimate, not a measurement. With no
/// upstream trend at all, the series is derived by summing records per month.
pub fn monthly_trend(
    batch: &SourceBatch,
    range: DateRange,
    category: Option<&str>,
    breakdown: &[CategorySummary],
) -> Vec<TrendPoint> {
    if let Some(summary) = &batch.summary {
        if !summary.trend.is_empty() {
            return summary
                .trend
                .iter()
                .map(|entry| {
                    let amount = match category {
                        Some(name) => entry
                            .category_amounts
                            .get(name)
                            .copied()
                            .unwrap_or_else(|| {
                                entry.total * category_share(breakdown, name) / 100.0
                            }),
                        None => entry.total,
                    };
                    TrendPoint {
                        period: entry.period.clone(),
                        amount,
                    }
                })
                .collect();
        }
    }

    month_starts_in_range(range.start, range.end)
        .into_iter()
        .map(|month| {
            let next = next_month_start(month);
            let amount = batch
                .records
                .iter()
                .filter(|r| r.date >= month && r.date < next)
                .map(|r| r.amount)
                .sum();
            TrendPoint {
                period: month_label(month),
                amount,
            }
        })
        .collect()
}

fn category_share(breakdown: &[CategorySummary], category: &str) -> f64 {
    breakdown
        .iter()
        .find(|c| c.category.eq_ignore_ascii_case(category))
        .map(|c| c.percentage)
        .unwrap_or(DEFAULT_CATEGORY_SHARE)
}
