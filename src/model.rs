use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inclusive calendar date range with no time-of-day component.
///
/// The constructor normalizes a reversed pair, so `start <= end` always
/// holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One line of a sale: a product at a price and quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: Option<String>,
    pub name: String,
    pub sku: Option<String>,
    pub price: f64,
    pub quantity: i64,
}

/// A generic sale/expense/cash-drawer event, normalized from whichever
/// source produced it. Lives for one resolve-fetch-aggregate cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: Option<String>,
    /// Free-text note; used as a pseudo-category for cash-drawer events
    /// that carry no structured category.
    pub note: Option<String>,
    pub payment_method: String,
    pub status: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl TransactionRecord {
    /// Decodes a loosely-shaped JSON object into a record, defaulting every
    /// missing or malformed field rather than failing: numeric strings are
    /// parsed, an absent date becomes `today`, and descriptive fields get
    /// domain placeholders.
    pub fn from_value(value: &Value, today: NaiveDate) -> Self {
        let date = value
            .get("date")
            .and_then(Value::as_str)
            .and_then(|s| {
                // Tolerate full timestamps by reading only the date part.
                let head = s.get(..10).unwrap_or(s);
                NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
            })
            .unwrap_or(today);

        let amount = value
            .get("amount")
            .or_else(|| value.get("total"))
            .map(coerce_amount)
            .unwrap_or(0.0);

        let items = value
            .get("items")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(LineItem::from_value).collect())
            .unwrap_or_default();

        Self {
            date,
            amount,
            category: non_empty_string(value.get("category")),
            note: non_empty_string(value.get("note")),
            payment_method: non_empty_string(value.get("payment_method"))
                .unwrap_or_else(|| "Cash".to_string()),
            status: non_empty_string(value.get("status")).unwrap_or_else(|| "Paid".to_string()),
            items,
        }
    }
}

impl LineItem {
    pub fn from_value(value: &Value) -> Self {
        Self {
            item_id: non_empty_string(value.get("item_id").or_else(|| value.get("id"))),
            name: non_empty_string(value.get("name")).unwrap_or_else(|| "Unknown item".to_string()),
            sku: non_empty_string(value.get("sku")),
            price: value.get("price").map(coerce_amount).unwrap_or(0.0).max(0.0),
            quantity: value
                .get("quantity")
                .map(coerce_quantity)
                .unwrap_or(0)
                .max(0),
        }
    }
}

/// One slice of a category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

/// Per-product rollup across all line items in a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: String,
    pub sku: Option<String>,
    pub quantity: i64,
    pub total: f64,
}

/// One period-labeled amount in a chronological trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: String,
    pub amount: f64,
}

/// A backend-supplied (or synthetic) rollup that may accompany raw records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: f64,
    /// Pre-computed breakdown, used verbatim when present.
    #[serde(default)]
    pub breakdown: Vec<CategorySummary>,
    #[serde(default)]
    pub trend: Vec<SummaryTrendEntry>,
}

/// Upstream trend data: always a period total, sometimes with per-category
/// amounts attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTrendEntry {
    pub period: String,
    pub total: f64,
    #[serde(default)]
    pub category_amounts: BTreeMap<String, f64>,
}

/// Records plus optional summary, as returned by any source tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceBatch {
    pub records: Vec<TransactionRecord>,
    pub summary: Option<ReportSummary>,
}

/// How trustworthy the data behind a view-model is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFidelity {
    /// Primary source answered.
    Live,
    /// A lower-priority real source answered after at least one failure.
    Degraded,
    /// Every real source failed; the data is generated.
    Synthetic,
}

/// The self-contained view-model handed to presentation code. Only primitive
/// numeric/string/date types; safe to discard if a newer load supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportView {
    pub range: DateRange,
    /// Sorted by date, most recent first.
    pub records: Vec<TransactionRecord>,
    pub breakdown: Vec<CategorySummary>,
    /// Sorted by total, descending.
    pub products: Vec<ProductSummary>,
    /// Chronological, one point per month in the range.
    pub trend: Vec<TrendPoint>,
}

/// Parses an amount that may arrive as a JSON number or a numeric string.
/// Anything unparseable becomes 0.0 so arithmetic never sees garbage.
pub fn coerce_amount(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn coerce_quantity(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()
    }

    #[test]
    fn test_range_normalizes_reversed_pair() {
        let a = NaiveDate::from_ymd_opt(2023, 3, 7).unwrap();
        let b = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        let range = DateRange::new(a, b);
        assert!(range.start <= range.end);
        assert_eq!(range.start, b);
    }

    #[test]
    fn test_record_from_complete_value() {
        let value = json!({
            "date": "2023-03-07",
            "amount": "149.50",
            "category": "Rent",
            "payment_method": "Card",
            "status": "Pending",
            "items": [
                {"item_id": "p1", "name": "Widget", "sku": "W-1", "price": "9.99", "quantity": 3}
            ]
        });

        let record = TransactionRecord::from_value(&value, today());
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2023, 3, 7).unwrap());
        assert_eq!(record.amount, 149.50);
        assert_eq!(record.category.as_deref(), Some("Rent"));
        assert_eq!(record.payment_method, "Card");
        assert_eq!(record.status, "Pending");
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].price, 9.99);
        assert_eq!(record.items[0].quantity, 3);
    }

    #[test]
    fn test_record_defaults_for_missing_fields() {
        let record = TransactionRecord::from_value(&json!({}), today());
        assert_eq!(record.date, today());
        assert_eq!(record.amount, 0.0);
        assert_eq!(record.category, None);
        assert_eq!(record.payment_method, "Cash");
        assert_eq!(record.status, "Paid");
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_record_tolerates_timestamp_dates() {
        let value = json!({"date": "2023-03-07T14:22:09Z", "amount": 5});
        let record = TransactionRecord::from_value(&value, today());
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2023, 3, 7).unwrap());
    }

    #[test]
    fn test_coerce_amount_variants() {
        assert_eq!(coerce_amount(&json!(12.5)), 12.5);
        assert_eq!(coerce_amount(&json!("12.5")), 12.5);
        assert_eq!(coerce_amount(&json!(" 7 ")), 7.0);
        assert_eq!(coerce_amount(&json!("not a number")), 0.0);
        assert_eq!(coerce_amount(&json!(null)), 0.0);
        assert_eq!(coerce_amount(&json!([1])), 0.0);
    }

    #[test]
    fn test_line_item_clamps_negative_values() {
        let value = json!({"name": "Widget", "price": -5.0, "quantity": -2});
        let item = LineItem::from_value(&value);
        assert_eq!(item.price, 0.0);
        assert_eq!(item.quantity, 0);
    }
}
