//! Ordered data-source fallback.
//!
//! Sources are tried strictly in priority order; a failure is logged and the
//! next tier is attempted. The synthetic generator is the unconditional last
//! resort, so the chain itself never errors: callers always receive a usable
//! batch, tagged with how trustworthy it is.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use serde_json::Value;

use crate::error::SourceError;
use crate::model::{
    coerce_amount, CategorySummary, DataFidelity, DateRange, ReportSummary, SourceBatch,
    SummaryTrendEntry, TransactionRecord,
};
use crate::synthetic::SyntheticGenerator;

/// One tier in the fallback chain. Implementations decide their own
/// transport; the chain only cares about the typed result.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    async fn attempt(
        &self,
        range: DateRange,
        filter: Option<&str>,
    ) -> Result<SourceBatch, SourceError>;
}

/// What the chain produced and how it got there.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub batch: SourceBatch,
    pub fidelity: DataFidelity,
    /// One human-readable entry per failed tier, in attempt order.
    pub failures: Vec<String>,
}

pub struct SourceChain {
    sources: Vec<Box<dyn DataSource>>,
    generator: SyntheticGenerator,
}

impl SourceChain {
    pub fn new(sources: Vec<Box<dyn DataSource>>, generator: SyntheticGenerator) -> Self {
        Self { sources, generator }
    }

    /// Tries each source in order, falling through on failure, and lands on
    /// the synthetic generator when every real tier fails. Infallible by
    /// construction.
    pub async fn fetch(&self, range: DateRange, filter: Option<&str>) -> FetchOutcome {
        let mut failures = Vec::new();

        for (tier, source) in self.sources.iter().enumerate() {
            match source.attempt(range, filter).await {
                Ok(mut batch) => {
                    debug!(
                        "source '{}' answered with {} records",
                        source.name(),
                        batch.records.len()
                    );
                    apply_filter(&mut batch.records, filter);
                    sort_most_recent_first(&mut batch.records);
                    let fidelity = if tier == 0 {
                        DataFidelity::Live
                    } else {
                        DataFidelity::Degraded
                    };
                    return FetchOutcome {
                        batch,
                        fidelity,
                        failures,
                    };
                }
                Err(err) => {
                    warn!("source '{}' failed: {}", source.name(), err);
                    failures.push(format!("{}: {}", source.name(), err));
                }
            }
        }

        let mut batch = self.generator.generate(range, filter);
        sort_most_recent_first(&mut batch.records);
        FetchOutcome {
            batch,
            fidelity: DataFidelity::Synthetic,
            failures,
        }
    }
}

/// Case-insensitive exact category match, applied only when there is
/// something to filter. An authoritative empty result stays empty.
fn apply_filter(records: &mut Vec<TransactionRecord>, filter: Option<&str>) {
    let Some(filter) = filter else { return };
    if records.is_empty() {
        return;
    }
    records.retain(|r| {
        r.category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(filter))
    });
}

fn sort_most_recent_first(records: &mut [TransactionRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Decodes a source response into a batch. Accepts either the structured
/// envelope `{success, data?, summary?}` or a bare JSON array; anything else
/// is a malformed payload and triggers fallthrough.
pub fn decode_envelope(value: &Value, today: NaiveDate) -> Result<SourceBatch, SourceError> {
    match value {
        Value::Array(rows) => Ok(SourceBatch {
            records: decode_records(rows, today),
            summary: None,
        }),
        Value::Object(map) => {
            let success = map.get("success").and_then(Value::as_bool).unwrap_or(false);
            if !success {
                return Err(SourceError::Unsuccessful);
            }
            let records = match map.get("data") {
                Some(Value::Array(rows)) => decode_records(rows, today),
                Some(_) => {
                    return Err(SourceError::MalformedPayload(
                        "'data' is not an array".to_string(),
                    ))
                }
                None => Vec::new(),
            };
            let summary = map.get("summary").map(decode_summary);
            Ok(SourceBatch { records, summary })
        }
        other => Err(SourceError::MalformedPayload(format!(
            "unexpected envelope shape: {}",
            shape_of(other)
        ))),
    }
}

fn decode_records(rows: &[Value], today: NaiveDate) -> Vec<TransactionRecord> {
    rows.iter()
        .map(|row| TransactionRecord::from_value(row, today))
        .collect()
}

/// Coerces a loosely-shaped summary object. Breakdown lives under
/// `breakdown`, `revenueBreakdown`, or `expenseBreakdown` depending on which
/// backend screen produced it.
fn decode_summary(value: &Value) -> ReportSummary {
    let total = value.get("total").map(coerce_amount).unwrap_or(0.0);

    let breakdown = ["breakdown", "revenueBreakdown", "expenseBreakdown"]
        .iter()
        .find_map(|key| value.get(*key))
        .and_then(Value::as_array)
        .map(|rows| rows.iter().map(decode_breakdown_row).collect())
        .unwrap_or_default();

    let trend = ["trend", "monthlyTrend"]
        .iter()
        .find_map(|key| value.get(*key))
        .and_then(Value::as_array)
        .map(|rows| rows.iter().map(decode_trend_row).collect())
        .unwrap_or_default();

    ReportSummary {
        total,
        breakdown,
        trend,
    }
}

fn decode_breakdown_row(row: &Value) -> CategorySummary {
    CategorySummary {
        category: row
            .get("category")
            .or_else(|| row.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("Uncategorized")
            .to_string(),
        amount: row.get("amount").map(coerce_amount).unwrap_or(0.0),
        percentage: row.get("percentage").map(coerce_amount).unwrap_or(0.0),
    }
}

fn decode_trend_row(row: &Value) -> SummaryTrendEntry {
    let category_amounts = row
        .get("categories")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(name, amount)| (name.clone(), coerce_amount(amount)))
                .collect()
        })
        .unwrap_or_default();

    SummaryTrendEntry {
        period: row
            .get("period")
            .or_else(|| row.get("month"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        total: row
            .get("total")
            .or_else(|| row.get("amount"))
            .map(coerce_amount)
            .unwrap_or(0.0),
        category_amounts,
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
