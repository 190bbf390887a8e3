//! Bulk reference-data read

use super::categories::query_categories;
use super::statuses::query_statuses;
use super::subcategories::query_subcategories;
use super::transaction_types::query_transaction_types;
use super::{ClassificationFilter, ClassificationKind, Database};
use crate::error::Result;
use crate::models::ReferenceData;

impl Database {
    /// Every classification row, read from a single snapshot
    pub fn reference_data(&self) -> Result<ReferenceData> {
        self.read(|tx| {
            Ok(ReferenceData {
                statuses: query_statuses(tx, &ClassificationFilter::new(ClassificationKind::Status))?,
                transaction_types: query_transaction_types(
                    tx,
                    &ClassificationFilter::new(ClassificationKind::TransactionType),
                )?,
                categories: query_categories(
                    tx,
                    &ClassificationFilter::new(ClassificationKind::Category),
                )?,
                subcategories: query_subcategories(
                    tx,
                    &ClassificationFilter::new(ClassificationKind::Subcategory),
                )?,
            })
        })
    }
}
