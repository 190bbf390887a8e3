//! List filters for classification rows
//!
//! Each classification entity accepts a small set of query keys: `name`
//! (exact), `search` (case-insensitive substring), `ordering`, and for
//! categories/subcategories the parent ids. Unknown keys are rejected.

use tracing::debug;

use super::transaction_filter::{parse_id, FilterResult};
use crate::error::{Error, Result};

/// Which classification table a filter targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationKind {
    Status,
    TransactionType,
    Category,
    Subcategory,
}

impl ClassificationKind {
    /// Query keys accepted for this kind
    fn accepts(self, key: &str) -> bool {
        match key {
            "name" | "search" | "ordering" => true,
            "transaction_type" => matches!(self, Self::Category | Self::Subcategory),
            "category" => self == Self::Subcategory,
            _ => false,
        }
    }

    /// Alias of the row's own table in the list queries
    fn alias(self) -> &'static str {
        match self {
            Self::Status => "s",
            Self::TransactionType => "tt",
            Self::Category => "c",
            Self::Subcategory => "sc",
        }
    }

    /// Columns the free-text search looks at
    fn search_columns(self) -> &'static [&'static str] {
        match self {
            Self::Status => &["s.name", "s.description"],
            Self::TransactionType => &["tt.name", "tt.description"],
            Self::Category => &["c.name", "c.description"],
            Self::Subcategory => &["sc.name", "sc.description", "c.name"],
        }
    }

    /// Map an `ordering` field name to its SQL column
    fn order_column(self, field: &str) -> Option<&'static str> {
        match (self, field) {
            (Self::Status, "name") => Some("s.name"),
            (Self::TransactionType, "name") => Some("tt.name"),
            (Self::Category, "name") => Some("c.name"),
            (Self::Category, "transaction_type_name") => Some("tt.name"),
            (Self::Subcategory, "name") => Some("sc.name"),
            (Self::Subcategory, "category_name") => Some("c.name"),
            _ => None,
        }
    }

    fn default_order(self) -> &'static str {
        match self {
            Self::Status => "s.name ASC, s.id ASC",
            Self::TransactionType => "tt.name ASC, tt.id ASC",
            Self::Category => "c.name ASC, tt.name ASC, c.id ASC",
            Self::Subcategory => "sc.name ASC, c.name ASC, sc.id ASC",
        }
    }
}

/// Parsed list filter for one classification kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationFilter {
    pub kind: ClassificationKind,
    pub name: Option<String>,
    pub search: Option<String>,
    pub transaction_type: Option<i64>,
    pub category: Option<i64>,
    /// SQL column and direction, already validated
    order: Option<(&'static str, bool)>,
}

impl ClassificationFilter {
    /// Filter that matches every row of `kind`
    pub fn new(kind: ClassificationKind) -> Self {
        Self {
            kind,
            name: None,
            search: None,
            transaction_type: None,
            category: None,
            order: None,
        }
    }

    /// Set exact name filter
    pub fn name(mut self, name: Option<&str>) -> Self {
        self.name = name.map(str::to_string);
        self
    }

    /// Set free-text search
    pub fn search(mut self, query: Option<&str>) -> Self {
        self.search = query.map(str::to_string);
        self
    }

    /// Restrict to a transaction type (categories, subcategories)
    pub fn transaction_type(mut self, id: Option<i64>) -> Self {
        self.transaction_type = id;
        self
    }

    /// Restrict to a category (subcategories)
    pub fn category(mut self, id: Option<i64>) -> Self {
        self.category = id;
        self
    }

    /// Set ordering from an `ordering` value such as `name` or `-category_name`
    pub fn ordering(mut self, value: &str) -> Result<Self> {
        let (field, descending) = match value.strip_prefix('-') {
            Some(field) => (field, true),
            None => (value, false),
        };
        let column = self.kind.order_column(field).ok_or_else(|| {
            Error::InvalidFilter(format!("Unknown ordering field '{}'", field))
        })?;
        self.order = Some((column, descending));
        Ok(self)
    }

    /// Parse query pairs; the last occurrence of a key wins and empty values
    /// count as absent
    pub fn from_params(kind: ClassificationKind, params: &[(String, String)]) -> Result<Self> {
        let mut filter = Self::new(kind);

        for (key, value) in params {
            if !kind.accepts(key) {
                return Err(Error::InvalidFilter(format!("Unknown filter key '{}'", key)));
            }

            let value = value.trim();
            let value = (!value.is_empty()).then_some(value);

            filter = match key.as_str() {
                "name" => filter.name(value),
                "search" => filter.search(value),
                "transaction_type" => {
                    let id = value.map(|v| parse_id(key, v)).transpose()?;
                    filter.transaction_type(id)
                }
                "category" => {
                    let id = value.map(|v| parse_id(key, v)).transpose()?;
                    filter.category(id)
                }
                "ordering" => match value {
                    Some(v) => filter.ordering(v)?,
                    None => {
                        filter.order = None;
                        filter
                    }
                },
                _ => filter,
            };
        }

        Ok(filter)
    }

    /// Fail unless this filter was parsed for `kind`
    pub(crate) fn expect_kind(&self, kind: ClassificationKind) -> Result<()> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(Error::InvalidFilter(format!(
                "{:?} filter cannot list {:?} rows",
                self.kind, kind
            )))
        }
    }

    /// Build WHERE/ORDER BY clauses against the aliased list query
    pub fn build(&self) -> FilterResult {
        let alias = self.kind.alias();
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = self.name {
            conditions.push(format!("{}.name = ?", alias));
            params.push(Box::new(name.clone()));
        }

        if let Some(tid) = self.transaction_type {
            conditions.push("c.transaction_type_id = ?".to_string());
            params.push(Box::new(tid));
        }

        if let Some(cid) = self.category {
            conditions.push("sc.category_id = ?".to_string());
            params.push(Box::new(cid));
        }

        if let Some(ref q) = self.search {
            let columns = self.kind.search_columns();
            let clause = columns
                .iter()
                .map(|col| format!("instr(casefold({}), ?) > 0", col))
                .collect::<Vec<_>>()
                .join(" OR ");
            conditions.push(format!("({})", clause));
            let needle = q.to_lowercase();
            for _ in columns {
                params.push(Box::new(needle.clone()));
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let order_clause = match self.order {
            Some((column, descending)) => format!(
                "ORDER BY {} {}, {}.id ASC",
                column,
                if descending { "DESC" } else { "ASC" },
                alias
            ),
            None => format!("ORDER BY {}", self.kind.default_order()),
        };

        debug!(kind = ?self.kind, conditions = conditions.len(), "Built classification filter");

        FilterResult {
            where_clause,
            order_clause,
            params,
        }
    }
}
