//! Ledger aggregation for the breakdown charts and tables.
//!
//! Everything here is a pure function of a ledger snapshot and is recomputed
//! on every request.

use std::{cmp::Ordering, collections::BTreeMap};

use time::Date;

use crate::ledger::LedgerEntry;

/// The total amount of one resource moved on one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyResourceTotal {
    pub date: Date,
    pub resource: String,
    pub amount: f64,
}

/// Read-only summaries of the ledger.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AggregationSnapshot {
    /// Giver name to the sum of everything they gave.
    pub totals_by_giver: BTreeMap<String, f64>,
    /// Resource name to the sum of every transfer of that resource.
    pub totals_by_resource: BTreeMap<String, f64>,
    /// Daily totals per resource, ordered by date and then resource name.
    pub totals_by_date: Vec<DailyResourceTotal>,
}

/// Summarise `entries` by giver, by resource and by (day, resource).
///
/// An empty ledger gives an empty snapshot.
pub fn aggregate(entries: &[LedgerEntry]) -> AggregationSnapshot {
    let mut totals_by_giver = BTreeMap::new();
    let mut totals_by_resource = BTreeMap::new();
    let mut totals_by_day_and_resource: BTreeMap<(Date, &str), f64> = BTreeMap::new();

    for entry in entries {
        *totals_by_giver.entry(entry.giver.clone()).or_insert(0.0) += entry.amount;
        *totals_by_resource
            .entry(entry.resource.clone())
            .or_insert(0.0) += entry.amount;
        *totals_by_day_and_resource
            .entry((entry.date.date(), entry.resource.as_str()))
            .or_insert(0.0) += entry.amount;
    }

    let totals_by_date = totals_by_day_and_resource
        .into_iter()
        .map(|((date, resource), amount)| DailyResourceTotal {
            date,
            resource: resource.to_owned(),
            amount,
        })
        .collect();

    AggregationSnapshot {
        totals_by_giver,
        totals_by_resource,
        totals_by_date,
    }
}

impl AggregationSnapshot {
    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.totals_by_giver.is_empty()
    }

    /// Givers with their totals, largest total first. Ties are ordered by name.
    pub fn givers_by_total_desc(&self) -> Vec<(&str, f64)> {
        let mut givers = self
            .totals_by_giver
            .iter()
            .map(|(giver, &total)| (giver.as_str(), total))
            .collect::<Vec<_>>();

        givers.sort_by(|(left_name, left_total), (right_name, right_total)| {
            right_total
                .partial_cmp(left_total)
                .unwrap_or(Ordering::Equal)
                .then_with(|| left_name.cmp(right_name))
        });

        givers
    }

    /// The distinct days in [AggregationSnapshot::totals_by_date], in order.
    pub fn dates(&self) -> Vec<Date> {
        let mut dates = self
            .totals_by_date
            .iter()
            .map(|total| total.date)
            .collect::<Vec<_>>();
        dates.dedup();

        dates
    }

    /// One series per resource with a value for every day in `dates`,
    /// `None` on days the resource was not moved.
    pub fn daily_series_by_resource(&self, dates: &[Date]) -> Vec<(&str, Vec<Option<f64>>)> {
        self.totals_by_resource
            .keys()
            .map(|resource| {
                let values = dates
                    .iter()
                    .map(|date| {
                        self.totals_by_date
                            .iter()
                            .find(|total| total.date == *date && total.resource == *resource)
                            .map(|total| total.amount)
                    })
                    .collect();

                (resource.as_str(), values)
            })
            .collect()
    }
}
