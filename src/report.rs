//! Report rendering for a finished [`AggregateTable`]
//!
//! Text form: `{key=min/mean/max, ...}` with keys ascending by byte value and
//! one fractional digit per number. JSON form: an array of [`StationSummary`]
//! in the same order.

use std::fmt::Write as _;

use serde::Serialize;

use crate::aggregate::{Aggregate, AggregateTable};
use crate::temperature::FixedPoint;

/// One row of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub name: String,
    pub min: FixedPoint,
    pub mean: f64,
    pub max: FixedPoint,
    pub count: u64,
}

impl StationSummary {
    /// `None` for an aggregate with no observations
    pub fn new(key: &[u8], aggregate: &Aggregate) -> Option<Self> {
        Some(Self {
            name: String::from_utf8_lossy(key).into_owned(),
            min: aggregate.min()?,
            mean: report_mean(aggregate)?,
            max: aggregate.max()?,
            count: aggregate.count(),
        })
    }
}

/// Mean at report precision, shared by the text and JSON renderers.
///
/// Rounds through `{:.1}` so both forms agree on ties, and folds a rounded
/// `-0.0` into `0.0` the way [`FixedPoint`]'s `Display` does.
pub fn report_mean(aggregate: &Aggregate) -> Option<f64> {
    let rounded: f64 = format!("{:.1}", aggregate.mean()?).parse().ok()?;
    Some(if rounded == 0.0 { 0.0 } else { rounded })
}

/// Rows of the report, sorted by key bytes
pub fn summaries(table: &AggregateTable) -> Vec<StationSummary> {
    table
        .sorted()
        .into_iter()
        .filter_map(|(key, aggregate)| StationSummary::new(key, aggregate))
        .collect()
}

/// Render `{key1=min/mean/max, key2=...}`
pub fn format_report(table: &AggregateTable) -> String {
    let mut out = String::with_capacity(2 + table.len() * 24);
    out.push('{');
    let entries = table
        .sorted()
        .into_iter()
        .filter_map(|(key, agg)| Some((key, agg.min()?, report_mean(agg)?, agg.max()?)));
    for (i, (key, min, mean, max)) in entries.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(
            out,
            "{}={}/{:.1}/{}",
            String::from_utf8_lossy(key),
            min,
            mean,
            max
        );
    }
    out.push('}');
    out
}

/// Render the report rows as a JSON array
pub fn format_json(table: &AggregateTable, pretty: bool) -> serde_json::Result<String> {
    let rows = summaries(table);
    if pretty {
        serde_json::to_string_pretty(&rows)
    } else {
        serde_json::to_string(&rows)
    }
}
