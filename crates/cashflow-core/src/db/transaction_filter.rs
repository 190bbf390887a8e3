//! Transaction filter builder for constructing dynamic SQL queries
//!
//! This module provides a builder pattern for constructing WHERE clauses
//! and related SQL components for transaction queries. The same filter
//! drives both the paginated listing and the summary aggregation.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::amount;
use crate::error::{Error, Result};

/// FROM clause shared by every transaction query; the joins supply the
/// denormalized names and the name-based search
pub(crate) const TRANSACTION_FROM: &str = r#"FROM transactions t
    JOIN statuses s ON t.status_id = s.id
    JOIN transaction_types tt ON t.transaction_type_id = tt.id
    JOIN categories c ON t.category_id = c.id
    JOIN subcategories sc ON t.subcategory_id = sc.id"#;

/// Builder for transaction predicates
///
/// All set fields combine with AND; unset fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<i64>,
    pub transaction_type: Option<i64>,
    pub category: Option<i64>,
    pub subcategory: Option<i64>,
    pub amount_min: Option<Decimal>,
    pub amount_max: Option<Decimal>,
    pub search: Option<String>,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword (empty if no conditions)
    pub where_clause: String,
    /// ORDER BY clause including "ORDER BY" keyword
    pub order_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

/// Parse an id-valued query parameter
pub(crate) fn parse_id(key: &str, value: &str) -> Result<i64> {
    value
        .parse()
        .map_err(|_| Error::InvalidFilter(format!("'{}' must be an integer id, got '{}'", key, value)))
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        Error::InvalidFilter(format!("'{}' must be a YYYY-MM-DD date, got '{}'", key, value))
    })
}

fn parse_amount(key: &str, value: &str) -> Result<Decimal> {
    amount::parse(value)
        .ok_or_else(|| Error::InvalidFilter(format!("'{}' must be a number, got '{}'", key, value)))
}

/// Convert an amount bound to cents; `ceil` for lower bounds, `floor` for upper
fn bound_to_cents(bound: Decimal, lower: bool) -> Option<i64> {
    bound
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|scaled| if lower { scaled.ceil() } else { scaled.floor() })
        .and_then(|scaled| scaled.to_i64())
}

impl TransactionFilter {
    /// Create a new filter builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set inclusive date bounds
    pub fn date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// Set status filter
    pub fn status(mut self, id: Option<i64>) -> Self {
        self.status = id;
        self
    }

    /// Set transaction type filter
    pub fn transaction_type(mut self, id: Option<i64>) -> Self {
        self.transaction_type = id;
        self
    }

    /// Set category filter
    pub fn category(mut self, id: Option<i64>) -> Self {
        self.category = id;
        self
    }

    /// Set subcategory filter
    pub fn subcategory(mut self, id: Option<i64>) -> Self {
        self.subcategory = id;
        self
    }

    /// Set inclusive amount bounds
    pub fn amount_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.amount_min = min;
        self.amount_max = max;
        self
    }

    /// Set search query (comment, category name, subcategory name)
    pub fn search(mut self, query: Option<&str>) -> Self {
        self.search = query.map(str::to_string);
        self
    }

    /// Apply one query pair; returns `false` when `key` is not a filter key
    ///
    /// An empty value clears the field.
    pub(crate) fn apply_param(&mut self, key: &str, value: &str) -> Result<bool> {
        let value = value.trim();
        let value = (!value.is_empty()).then_some(value);

        match key {
            "date_from" => self.date_from = value.map(|v| parse_date(key, v)).transpose()?,
            "date_to" => self.date_to = value.map(|v| parse_date(key, v)).transpose()?,
            "status" => self.status = value.map(|v| parse_id(key, v)).transpose()?,
            "transaction_type" => {
                self.transaction_type = value.map(|v| parse_id(key, v)).transpose()?
            }
            "category" => self.category = value.map(|v| parse_id(key, v)).transpose()?,
            "subcategory" => self.subcategory = value.map(|v| parse_id(key, v)).transpose()?,
            "amount_min" => self.amount_min = value.map(|v| parse_amount(key, v)).transpose()?,
            "amount_max" => self.amount_max = value.map(|v| parse_amount(key, v)).transpose()?,
            "search" => self.search = value.map(str::to_string),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Parse filter keys only (used by the summary); anything else is rejected
    pub fn from_params(params: &[(String, String)]) -> Result<Self> {
        let mut filter = Self::new();
        for (key, value) in params {
            if !filter.apply_param(key, value)? {
                return Err(Error::InvalidFilter(format!("Unknown filter key '{}'", key)));
            }
        }
        Ok(filter)
    }

    /// Build the WHERE clause against the `t`/`s`/`tt`/`c`/`sc` aliases of
    /// `TRANSACTION_FROM`
    pub fn build(&self, ordering: TransactionOrdering) -> Result<FilterResult> {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        // Date range filter
        if let Some(from) = self.date_from {
            conditions.push("t.transaction_date >= ?");
            params.push(Box::new(from));
        }
        if let Some(to) = self.date_to {
            conditions.push("t.transaction_date <= ?");
            params.push(Box::new(to));
        }

        // Exact id matches
        let ids = [
            ("t.status_id = ?", self.status),
            ("t.transaction_type_id = ?", self.transaction_type),
            ("t.category_id = ?", self.category),
            ("t.subcategory_id = ?", self.subcategory),
        ];
        for (condition, id) in ids {
            if let Some(id) = id {
                conditions.push(condition);
                params.push(Box::new(id));
            }
        }

        // Amount range filter, compared in cents
        if let Some(min) = self.amount_min {
            let cents = bound_to_cents(min, true)
                .ok_or_else(|| Error::InvalidFilter(format!("amount_min {} is out of range", min)))?;
            conditions.push("t.amount_cents >= ?");
            params.push(Box::new(cents));
        }
        if let Some(max) = self.amount_max {
            let cents = bound_to_cents(max, false)
                .ok_or_else(|| Error::InvalidFilter(format!("amount_max {} is out of range", max)))?;
            conditions.push("t.amount_cents <= ?");
            params.push(Box::new(cents));
        }

        // Search filter (comment, category name, subcategory name)
        if let Some(ref q) = self.search {
            conditions.push(
                "(instr(casefold(t.comment), ?) > 0 OR instr(casefold(c.name), ?) > 0 \
                 OR instr(casefold(sc.name), ?) > 0)",
            );
            let needle = q.to_lowercase();
            params.push(Box::new(needle.clone()));
            params.push(Box::new(needle.clone()));
            params.push(Box::new(needle));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        debug!(conditions = conditions.len(), ?ordering, "Built transaction filter");

        Ok(FilterResult {
            where_clause,
            order_clause: ordering.order_clause(),
            params,
        })
    }
}

/// Fields a transaction listing can be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderField {
    #[default]
    TransactionDate,
    Amount,
    Created,
}

impl OrderField {
    fn column(self) -> &'static str {
        match self {
            Self::TransactionDate => "t.transaction_date",
            Self::Amount => "t.amount_cents",
            Self::Created => "t.created_at",
        }
    }
}

/// Ordering of a transaction listing; defaults to newest transaction date first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOrdering {
    pub field: OrderField,
    pub descending: bool,
}

impl Default for TransactionOrdering {
    fn default() -> Self {
        Self {
            field: OrderField::TransactionDate,
            descending: true,
        }
    }
}

impl std::str::FromStr for TransactionOrdering {
    type Err = Error;

    /// Parse `transaction_date`, `-amount`, `created`, ...
    fn from_str(value: &str) -> Result<Self> {
        let (name, descending) = match value.strip_prefix('-') {
            Some(name) => (name, true),
            None => (value, false),
        };
        let field = match name {
            "transaction_date" => OrderField::TransactionDate,
            "amount" => OrderField::Amount,
            "created" => OrderField::Created,
            other => {
                return Err(Error::InvalidFilter(format!(
                    "Unknown ordering field '{}' (expected transaction_date, amount or created)",
                    other
                )))
            }
        };
        Ok(Self { field, descending })
    }
}

impl TransactionOrdering {
    /// ORDER BY clause; ties always break on id descending
    pub fn order_clause(&self) -> String {
        let dir = if self.descending { "DESC" } else { "ASC" };
        format!("ORDER BY {} {}, t.id DESC", self.field.column(), dir)
    }
}

/// A full listing request: filter, ordering and pagination
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub filter: TransactionFilter,
    pub ordering: TransactionOrdering,
    /// Page size; `None` means the configured default
    pub limit: Option<i64>,
    pub offset: i64,
}

impl TransactionQuery {
    /// Parse filter keys plus `ordering`, `limit` and `offset`
    pub fn from_params(params: &[(String, String)]) -> Result<Self> {
        let mut query = Self::default();

        for (key, value) in params {
            if query.filter.apply_param(key, value)? {
                continue;
            }

            let value = value.trim();
            match key.as_str() {
                "ordering" if value.is_empty() => query.ordering = TransactionOrdering::default(),
                "ordering" => query.ordering = value.parse()?,
                "limit" if value.is_empty() => query.limit = None,
                "limit" => {
                    let limit: i64 = value.parse().map_err(|_| {
                        Error::InvalidFilter(format!("'limit' must be an integer, got '{}'", value))
                    })?;
                    if limit <= 0 {
                        return Err(Error::InvalidFilter("'limit' must be positive".into()));
                    }
                    query.limit = Some(limit);
                }
                "offset" if value.is_empty() => query.offset = 0,
                "offset" => {
                    let offset: i64 = value.parse().map_err(|_| {
                        Error::InvalidFilter(format!("'offset' must be an integer, got '{}'", value))
                    })?;
                    if offset < 0 {
                        return Err(Error::InvalidFilter("'offset' must not be negative".into()));
                    }
                    query.offset = offset;
                }
                other => {
                    return Err(Error::InvalidFilter(format!("Unknown filter key '{}'", other)))
                }
            }
        }

        Ok(query)
    }
}

impl FilterResult {
    /// Build a COUNT query over the transaction joins
    pub fn build_count_query(&self) -> String {
        format!("SELECT COUNT(*) {} {}", TRANSACTION_FROM, self.where_clause)
    }

    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_filter() {
        let result = TransactionFilter::new()
            .build(TransactionOrdering::default())
            .unwrap();
        assert!(result.where_clause.is_empty());
        assert!(result.params.is_empty());
        assert_eq!(
            result.order_clause,
            "ORDER BY t.transaction_date DESC, t.id DESC"
        );
    }

    #[test]
    fn test_all_fields_combine_with_and() {
        let filter = TransactionFilter::from_params(&pairs(&[
            ("date_from", "2024-01-01"),
            ("date_to", "2024-01-31"),
            ("status", "1"),
            ("transaction_type", "2"),
            ("category", "3"),
            ("subcategory", "4"),
            ("amount_min", "10"),
            ("amount_max", "99.99"),
            ("search", "Ads"),
        ]))
        .unwrap();

        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filter.amount_max, Some(Decimal::new(9999, 2)));

        let result = filter.build(TransactionOrdering::default()).unwrap();
        assert_eq!(result.where_clause.matches(" AND ").count(), 8);
        // 8 scalar bounds + 3 search params
        assert_eq!(result.params.len(), 11);
    }

    #[test]
    fn test_empty_value_is_absent() {
        let filter =
            TransactionFilter::from_params(&pairs(&[("category", ""), ("search", "  ")])).unwrap();
        assert_eq!(filter, TransactionFilter::default());
    }

    #[test]
    fn test_last_value_wins() {
        let filter =
            TransactionFilter::from_params(&pairs(&[("status", "1"), ("status", "2")])).unwrap();
        assert_eq!(filter.status, Some(2));
    }

    #[test]
    fn test_malformed_values_rejected() {
        for (key, value) in [
            ("status", "abc"),
            ("date_from", "2024-13-01"),
            ("date_to", "15/01/2024"),
            ("amount_min", "lots"),
        ] {
            let err = TransactionFilter::from_params(&pairs(&[(key, value)])).unwrap_err();
            assert!(matches!(err, Error::InvalidFilter(_)), "{}={}", key, value);
        }
    }

    #[test]
    fn test_summary_rejects_pagination_keys() {
        let err = TransactionFilter::from_params(&pairs(&[("limit", "5")])).unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)));
    }

    #[test]
    fn test_ordering_parse() {
        let ordering: TransactionOrdering = "-amount".parse().unwrap();
        assert_eq!(ordering.field, OrderField::Amount);
        assert!(ordering.descending);
        assert_eq!(ordering.order_clause(), "ORDER BY t.amount_cents DESC, t.id DESC");

        let ordering: TransactionOrdering = "created".parse().unwrap();
        assert_eq!(ordering.order_clause(), "ORDER BY t.created_at ASC, t.id DESC");

        assert!("comment".parse::<TransactionOrdering>().is_err());
    }

    #[test]
    fn test_query_pagination() {
        let query = TransactionQuery::from_params(&pairs(&[
            ("limit", "10"),
            ("offset", "20"),
            ("ordering", "amount"),
            ("category", "7"),
        ]))
        .unwrap();
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.offset, 20);
        assert_eq!(query.ordering.field, OrderField::Amount);
        assert_eq!(query.filter.category, Some(7));

        for (key, value) in [("limit", "0"), ("limit", "-1"), ("offset", "-5"), ("page", "2")] {
            assert!(
                TransactionQuery::from_params(&pairs(&[(key, value)])).is_err(),
                "{}={}",
                key,
                value
            );
        }
    }

    #[test]
    fn test_amount_bounds_round_inward() {
        assert_eq!(bound_to_cents(Decimal::new(10005, 3), true), Some(1001));
        assert_eq!(bound_to_cents(Decimal::new(10005, 3), false), Some(1000));
        assert_eq!(bound_to_cents(Decimal::from(100), true), Some(10000));
    }

    #[test]
    fn test_huge_amount_bound_is_invalid_filter() {
        assert_eq!(bound_to_cents(Decimal::MAX, true), None);
        assert_eq!(bound_to_cents(Decimal::MAX, false), None);

        for key in ["amount_min", "amount_max"] {
            let params = pairs(&[(key, "79228162514264337593543950335")]);
            let filter = TransactionFilter::from_params(&params).unwrap();
            let err = filter.build(TransactionOrdering::default()).err().unwrap();
            assert!(matches!(err, Error::InvalidFilter(_)), "{}", key);
        }

        // Overflows i64 cents without overflowing the multiplication
        let filter = TransactionFilter::new().amount_range(Some(Decimal::from(i64::MAX)), None);
        assert!(matches!(
            filter.build(TransactionOrdering::default()),
            Err(Error::InvalidFilter(_))
        ));
    }
}
