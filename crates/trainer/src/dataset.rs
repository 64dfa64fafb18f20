//! Sales CSV loading and cleaning
//!
//! Reads the raw export (currency-formatted amounts, a date column that is
//! not used) and keeps only rows where every model column is present and
//! parseable.

use anyhow::{Context, Result};
use choco_model::{CategoricalColumn, OrderFeatures};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Dataset file name expected in the working directory
pub const DEFAULT_DATASET_FILE: &str = "Chocolate Sales.csv";

/// Columns that must be present in the CSV header
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Sales Person",
    "Country",
    "Product",
    "Boxes Shipped",
    "Amount",
];

#[derive(Debug, Deserialize)]
struct RawSale {
    #[serde(rename = "Sales Person")]
    sales_person: Option<String>,
    #[serde(rename = "Country")]
    country: Option<String>,
    #[serde(rename = "Product")]
    product: Option<String>,
    #[serde(rename = "Boxes Shipped")]
    boxes_shipped: Option<String>,
    #[serde(rename = "Amount")]
    amount: Option<String>,
}

/// One cleaned training row
#[derive(Clone, Debug, PartialEq)]
pub struct SaleRecord {
    pub order: OrderFeatures,
    pub amount: f64,
}

/// Cleaned training set
#[derive(Clone, Debug, Default)]
pub struct SalesDataset {
    pub records: Vec<SaleRecord>,
    /// Rows skipped for missing or unparseable values
    pub dropped: usize,
}

impl SalesDataset {
    /// Load and clean a sales CSV with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("cannot open dataset '{}'", path.display()))?;
        Self::from_reader(file)
    }

    /// Load and clean CSV content from any reader
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);

        let headers = reader.headers().context("failed to read CSV header")?;
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|header| header == column) {
                anyhow::bail!("missing required column '{}'", column);
            }
        }

        let mut dataset = SalesDataset::default();
        for (row_idx, row) in reader.deserialize::<RawSale>().enumerate() {
            let cleaned = match row {
                Ok(raw) => clean_row(raw),
                Err(err) => {
                    debug!("row {}: unreadable ({})", row_idx + 1, err);
                    None
                }
            };

            match cleaned {
                Some(record) => dataset.records.push(record),
                None => {
                    debug!("row {}: dropped", row_idx + 1);
                    dataset.dropped += 1;
                }
            }
        }

        if dataset.records.is_empty() {
            anyhow::bail!("dataset has no usable rows");
        }

        Ok(dataset)
    }

    /// Number of usable rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of one categorical column, in row order
    pub fn column(&self, column: CategoricalColumn) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .map(move |record| record.order.category(column))
    }

    /// Number of distinct values in a categorical column
    pub fn distinct(&self, column: CategoricalColumn) -> usize {
        self.column(column).collect::<BTreeSet<_>>().len()
    }
}

/// Strip currency symbols and thousands separators, then parse
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    parse_number(&cleaned)
}

fn parse_number(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Only truly empty fields count as missing; a blank category is a value
fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

fn clean_row(raw: RawSale) -> Option<SaleRecord> {
    let order = OrderFeatures {
        sales_person: present(raw.sales_person)?,
        country: present(raw.country)?,
        product: present(raw.product)?,
        boxes: parse_number(&present(raw.boxes_shipped)?)?,
    };
    let amount = parse_amount(&present(raw.amount)?)?;

    Some(SaleRecord { order, amount })
}
