//! Summary statistics over filtered transactions

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};

use super::transaction_filter::TRANSACTION_FROM;
use super::{Database, TransactionFilter, TransactionOrdering};
use crate::amount;
use crate::error::{Error, Result};
use crate::models::*;

/// Number of categories reported in `by_category`
pub const TOP_CATEGORIES: usize = 10;

/// Mean of `count` amounts totalling `total`, at scale 2; zero for no matches
pub(crate) fn average(total: Decimal, count: i64) -> Decimal {
    if count == 0 {
        return amount::from_minor_units(0);
    }
    let mut mean = (total / Decimal::from(count))
        .round_dp_with_strategy(amount::SCALE, RoundingStrategy::MidpointAwayFromZero);
    mean.rescale(amount::SCALE);
    mean
}

/// Exact amount for a sum of cents; i64 sums of large amounts can overflow
fn cents_to_amount(cents: i128) -> Result<Decimal> {
    Decimal::try_from_i128_with_scale(cents, amount::SCALE)
        .map_err(|_| Error::InvalidData(format!("Summary total of {} cents is out of range", cents)))
}

#[derive(Default)]
struct Tally {
    count: i64,
    cents: i128,
}

impl Tally {
    fn add(&mut self, cents: i64) {
        self.count += 1;
        self.cents += i128::from(cents);
    }
}

impl Database {
    /// Count, total, average and breakdowns for every transaction matching `filter`
    ///
    /// Totals are accumulated in Rust rather than with SQL `SUM`, which
    /// fails on 64-bit overflow.
    pub fn transaction_summary(&self, filter: &TransactionFilter) -> Result<TransactionSummary> {
        // Ordering is irrelevant to aggregates
        let built = filter.build(TransactionOrdering::default())?;
        let params = built.params_refs();

        let (total, types, categories) = self.read(|tx| {
            let mut stmt = tx.prepare(&format!(
                "SELECT tt.id, tt.name, c.id, c.name, t.amount_cents {} {}",
                TRANSACTION_FROM, built.where_clause
            ))?;
            let mut rows = stmt.query(params.as_slice())?;

            let mut total = Tally::default();
            let mut types: HashMap<i64, (String, Tally)> = HashMap::new();
            let mut categories: HashMap<i64, (String, String, Tally)> = HashMap::new();

            while let Some(row) = rows.next()? {
                let type_id: i64 = row.get(0)?;
                let category_id: i64 = row.get(2)?;
                let cents: i64 = row.get(4)?;

                total.add(cents);
                match types.get_mut(&type_id) {
                    Some((_, tally)) => tally.add(cents),
                    None => {
                        let mut tally = Tally::default();
                        tally.add(cents);
                        types.insert(type_id, (row.get(1)?, tally));
                    }
                }
                match categories.get_mut(&category_id) {
                    Some((_, _, tally)) => tally.add(cents),
                    None => {
                        let mut tally = Tally::default();
                        tally.add(cents);
                        categories.insert(category_id, (row.get(3)?, row.get(1)?, tally));
                    }
                }
            }

            Ok((total, types, categories))
        })?;

        let mut by_type = types
            .into_iter()
            .map(|(id, (name, tally))| {
                Ok(TypeBreakdown {
                    transaction_type_id: id,
                    transaction_type_name: name,
                    count: tally.count,
                    total: cents_to_amount(tally.cents)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        by_type.sort_by(|a, b| {
            a.transaction_type_name
                .cmp(&b.transaction_type_name)
                .then(a.transaction_type_id.cmp(&b.transaction_type_id))
        });

        let mut by_category = categories
            .into_iter()
            .map(|(id, (name, type_name, tally))| {
                Ok(CategoryBreakdown {
                    category_id: id,
                    category_name: name,
                    transaction_type_name: type_name,
                    count: tally.count,
                    total: cents_to_amount(tally.cents)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        by_category.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.category_name.cmp(&b.category_name))
                .then(a.category_id.cmp(&b.category_id))
        });
        by_category.truncate(TOP_CATEGORIES);

        let total_amount = cents_to_amount(total.cents)?;

        Ok(TransactionSummary {
            total_count: total.count,
            total_amount,
            average_amount: average(total_amount, total.count),
            by_type,
            by_category,
        })
    }
}
