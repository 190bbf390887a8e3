//! Sample data loading
//!
//! Seeds the standard statuses, transaction types and category tree, and
//! optionally a deterministic set of demo transactions. Classification rows
//! are get-or-create by name (and parent), so seeding twice changes nothing.
//! Everything goes through the regular store operations.

use chrono::{Duration, NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{ClassificationFilter, ClassificationKind, Database};
use crate::amount;
use crate::error::{Error, Result};
use crate::models::*;

const STATUSES: &[(&str, &str)] = &[
    ("Business", "Business operations"),
    ("Personal", "Personal operations"),
    ("Tax", "Tax operations"),
    ("Investments", "Investment operations"),
    ("Other", "Other operations"),
];

const INCOME: &str = "Income";
const EXPENSE: &str = "Expense";

const TRANSACTION_TYPES: &[(&str, &str)] = &[
    (INCOME, "Money coming in"),
    (EXPENSE, "Money going out"),
];

type Tree = &'static [(&'static str, &'static str, &'static [(&'static str, &'static str)])];

const INCOME_CATEGORIES: Tree = &[
    (
        "Sales",
        "Revenue from goods and services",
        &[
            ("Online Sales", "Sales through the web store"),
            ("Offline Sales", "Sales at retail locations"),
            ("Wholesale", "Wholesale deliveries"),
            ("Services", "Services rendered"),
        ],
    ),
    (
        "Investments",
        "Income from investment activity",
        &[
            ("Dividends", "Dividends on shares"),
            ("Deposit Interest", "Interest on bank deposits"),
            ("Capital Gains", "Profit from selling assets"),
            ("Coupon Payments", "Bond coupon payments"),
        ],
    ),
    (
        "Freelance",
        "Income from freelance work",
        &[
            ("Development", "Software development"),
            ("Design", "Design and graphics"),
            ("Consulting", "Consulting services"),
            ("Copywriting", "Writing copy"),
        ],
    ),
    (
        "Passive Income",
        "Passive income sources",
        &[
            ("Property Rental", "Income from renting out property"),
            ("Royalties", "Author royalties"),
            ("Affiliate Programs", "Affiliate marketing"),
        ],
    ),
];

const EXPENSE_CATEGORIES: Tree = &[
    (
        "Marketing",
        "Marketing and advertising",
        &[
            ("Contextual Ads", "Search advertising"),
            ("SEO", "Search engine optimization"),
            ("SMM", "Social media"),
            ("Email Campaigns", "Email marketing"),
            ("Web Analytics", "Analytics tools"),
        ],
    ),
    (
        "Infrastructure",
        "IT infrastructure",
        &[
            ("VPS/Hosting", "Virtual servers and hosting"),
            ("Domains", "Domain registration"),
            ("SSL Certificates", "SSL certificates"),
            ("CDN", "Content delivery network"),
            ("Software & Licenses", "Software"),
        ],
    ),
    (
        "Salaries",
        "Payroll",
        &[
            ("Staff", "Salaried employees"),
            ("Contractors", "External contractors"),
            ("Bonuses", "Bonus payments"),
            ("Payroll Taxes", "Taxes on payroll"),
        ],
    ),
    (
        "Office",
        "Office expenses",
        &[
            ("Office Rent", "Office lease"),
            ("Utilities", "Electricity, water, internet"),
            ("Stationery", "Office supplies"),
            ("Furniture & Equipment", "Office furniture and hardware"),
        ],
    ),
    (
        TAX_CATEGORY,
        "Tax payments",
        &[
            ("VAT", "Value added tax"),
            ("Corporate Income Tax", "Tax on company profit"),
            ("Social Contributions", "Social fund contributions"),
            ("Vehicle Tax", "Tax on vehicles"),
        ],
    ),
    (
        "Business Travel",
        "Travel expenses",
        &[
            ("Tickets", "Air and rail tickets"),
            ("Accommodation", "Hotels"),
            ("Per Diem", "Daily allowances"),
            ("Taxi & Local Transport", "Local transport"),
        ],
    ),
];

const TAX_CATEGORY: &str = "Taxes";

/// Fixed demo rows: date, type, category, subcategory, amount in cents, comment
const DEMO_TRANSACTIONS: &[(&str, &str, &str, &str, i64, &str)] = &[
    ("2024-01-15", INCOME, "Sales", "Online Sales", 5_000_000, "Web store sales"),
    ("2024-01-16", EXPENSE, "Marketing", "Contextual Ads", 1_500_000, "Search ad campaign"),
    ("2024-01-17", EXPENSE, "Infrastructure", "VPS/Hosting", 500_000, "Virtual server invoice"),
];

/// How many generated transactions of each kind to create
const INCOME_SAMPLES: usize = 20;
const EXPENSE_SAMPLES: usize = 20;
const TAX_SAMPLES: usize = 5;

/// What `seed` should do
#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Remove all existing data first
    pub clear: bool,
    /// Also create demo transactions
    pub sample_transactions: bool,
    /// Anchor for the generated transaction dates
    pub today: NaiveDate,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            clear: false,
            sample_transactions: true,
            today: Utc::now().date_naive(),
        }
    }
}

/// Rows created by a seed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub statuses: usize,
    pub transaction_types: usize,
    pub categories: usize,
    pub subcategories: usize,
    pub transactions: usize,
    /// Transactions removed by `clear`
    pub cleared_transactions: usize,
}

/// Classification ids the sample transactions are drawn from
struct SampleSources {
    business: i64,
    personal: i64,
    tax: i64,
    income: Vec<Subcategory>,
    expense: Vec<Subcategory>,
    taxes: Vec<Subcategory>,
}

impl Database {
    /// Load the standard classification tree and optional demo transactions
    pub fn seed(&self, options: &SeedOptions) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        if options.clear {
            report.cleared_transactions = self.clear_all_data()?;
        }

        for (name, description) in STATUSES {
            if self.find_status(name)?.is_none() {
                self.create_status(&NewStatus {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                })?;
                report.statuses += 1;
            }
        }

        for (name, description) in TRANSACTION_TYPES {
            if self.find_transaction_type(name)?.is_none() {
                self.create_transaction_type(&NewTransactionType {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                })?;
                report.transaction_types += 1;
            }
        }

        self.seed_tree(INCOME, INCOME_CATEGORIES, &mut report)?;
        self.seed_tree(EXPENSE, EXPENSE_CATEGORIES, &mut report)?;

        if options.sample_transactions {
            report.transactions = self.seed_transactions(options.today)?;
        }

        info!(
            statuses = report.statuses,
            transaction_types = report.transaction_types,
            categories = report.categories,
            subcategories = report.subcategories,
            transactions = report.transactions,
            "Seeded sample data"
        );

        Ok(report)
    }

    /// Delete every transaction and classification row
    ///
    /// Returns the number of transactions removed.
    pub fn clear_all_data(&self) -> Result<usize> {
        self.write(|tx| {
            let transactions = tx.execute("DELETE FROM transactions", [])?;
            tx.execute("DELETE FROM subcategories", [])?;
            tx.execute("DELETE FROM categories", [])?;
            tx.execute("DELETE FROM transaction_types", [])?;
            tx.execute("DELETE FROM statuses", [])?;
            info!(transactions, "Cleared all data");
            Ok(transactions)
        })
    }

    fn find_status(&self, name: &str) -> Result<Option<Status>> {
        let filter = ClassificationFilter::new(ClassificationKind::Status).name(Some(name));
        Ok(self.list_statuses(&filter)?.into_iter().next())
    }

    fn find_transaction_type(&self, name: &str) -> Result<Option<TransactionType>> {
        let filter =
            ClassificationFilter::new(ClassificationKind::TransactionType).name(Some(name));
        Ok(self.list_transaction_types(&filter)?.into_iter().next())
    }

    fn find_category(&self, name: &str, type_id: i64) -> Result<Option<Category>> {
        let filter = ClassificationFilter::new(ClassificationKind::Category)
            .name(Some(name))
            .transaction_type(Some(type_id));
        Ok(self.list_categories(&filter)?.into_iter().next())
    }

    fn find_subcategory(&self, name: &str, category_id: i64) -> Result<Option<Subcategory>> {
        let filter = ClassificationFilter::new(ClassificationKind::Subcategory)
            .name(Some(name))
            .category(Some(category_id));
        Ok(self.list_subcategories(&filter)?.into_iter().next())
    }

    fn require_transaction_type(&self, name: &str) -> Result<TransactionType> {
        self.find_transaction_type(name)?
            .ok_or_else(|| Error::NotFound(format!("Transaction type '{}' not found", name)))
    }

    fn require_status(&self, name: &str) -> Result<Status> {
        self.find_status(name)?
            .ok_or_else(|| Error::NotFound(format!("Status '{}' not found", name)))
    }

    fn seed_tree(&self, type_name: &str, tree: Tree, report: &mut SeedReport) -> Result<()> {
        let transaction_type = self.require_transaction_type(type_name)?;

        for (name, description, children) in tree {
            let category = match self.find_category(name, transaction_type.id)? {
                Some(category) => category,
                None => {
                    report.categories += 1;
                    self.create_category(&NewCategory {
                        name: name.to_string(),
                        transaction_type_id: transaction_type.id,
                        description: Some(description.to_string()),
                    })?
                }
            };

            for (sub_name, sub_description) in children.iter() {
                if self.find_subcategory(sub_name, category.id)?.is_none() {
                    self.create_subcategory(&NewSubcategory {
                        name: sub_name.to_string(),
                        category_id: category.id,
                        description: Some(sub_description.to_string()),
                    })?;
                    report.subcategories += 1;
                }
            }
        }

        Ok(())
    }

    fn sample_sources(&self) -> Result<SampleSources> {
        let income = self.require_transaction_type(INCOME)?;
        let expense = self.require_transaction_type(EXPENSE)?;

        let subcategories_of_type = |type_id: i64| {
            let filter = ClassificationFilter::new(ClassificationKind::Subcategory)
                .transaction_type(Some(type_id));
            self.list_subcategories(&filter)
        };

        let taxes = match self.find_category(TAX_CATEGORY, expense.id)? {
            Some(category) => self.get_subcategories_of_category(category.id)?,
            None => Vec::new(),
        };

        Ok(SampleSources {
            business: self.require_status("Business")?.id,
            personal: self.require_status("Personal")?.id,
            tax: self.require_status("Tax")?.id,
            income: subcategories_of_type(income.id)?,
            expense: subcategories_of_type(expense.id)?,
            taxes,
        })
    }

    /// Create the demo transactions; returns how many were new
    fn seed_transactions(&self, today: NaiveDate) -> Result<usize> {
        let sources = self.sample_sources()?;
        let mut rows: Vec<(NaiveDate, i64, &Subcategory, i64, String)> = Vec::new();

        // Spread dates over the last 180 days and amounts over a fixed range
        // with co-prime strides, so the sample looks varied but never changes
        for i in 0..INCOME_SAMPLES {
            if let Some(sub) = pick(&sources.income, i * 7) {
                let date = today - Duration::days(1 + (i as i64 * 37) % 180);
                let cents = 100_000 + (i as i64 * 234_567) % 4_900_000;
                let comment = format!("{} - {}", sub.name, date.format("%B %Y"));
                rows.push((date, sources.business, sub, cents, comment));
            }
        }

        for i in 0..EXPENSE_SAMPLES {
            if let Some(sub) = pick(&sources.expense, i * 11 + 3) {
                let date = today - Duration::days(1 + (i as i64 * 53 + 17) % 180);
                let cents = 50_000 + (i as i64 * 123_457) % 1_950_000;
                let status = if i % 3 == 0 {
                    sources.personal
                } else {
                    sources.business
                };
                let comment = format!("{} - {}", sub.name, date.format("%B %Y"));
                rows.push((date, status, sub, cents, comment));
            }
        }

        for i in 0..TAX_SAMPLES {
            if let Some(sub) = pick(&sources.taxes, i) {
                let date = today - Duration::days(30 + (i as i64 * 31) % 150);
                let cents = 500_000 + (i as i64 * 432_109) % 2_500_000;
                let comment = format!("Tax payment - {}", sub.name);
                rows.push((date, sources.tax, sub, cents, comment));
            }
        }

        let mut created = 0;
        for (date, status_id, sub, cents, comment) in rows {
            if self.create_sample(date, status_id, sub, cents, comment)? {
                created += 1;
            }
        }

        for (date, type_name, category, subcategory, cents, comment) in DEMO_TRANSACTIONS {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| Error::InvalidData(format!("Bad demo date {}: {}", date, e)))?;
            let transaction_type = self.require_transaction_type(type_name)?;
            let category = self
                .find_category(category, transaction_type.id)?
                .ok_or_else(|| Error::NotFound(format!("Category '{}' not found", category)))?;
            let sub = self
                .find_subcategory(subcategory, category.id)?
                .ok_or_else(|| Error::NotFound(format!("Subcategory '{}' not found", subcategory)))?;

            if self.create_sample(date, sources.business, &sub, *cents, comment.to_string())? {
                created += 1;
            }
        }

        Ok(created)
    }

    /// Get-or-create a sample keyed on (date, amount, subcategory)
    fn create_sample(
        &self,
        date: NaiveDate,
        status_id: i64,
        sub: &Subcategory,
        cents: i64,
        comment: String,
    ) -> Result<bool> {
        let exists = {
            let conn = self.conn()?;
            conn.query_row(
                r#"
                SELECT 1 FROM transactions
                WHERE transaction_date = ? AND amount_cents = ? AND subcategory_id = ?
                "#,
                params![date, cents, sub.id],
                |_| Ok(()),
            )
            .optional()?
            .is_some()
        };
        if exists {
            return Ok(false);
        }

        self.create_transaction(&NewTransaction {
            transaction_date: date,
            status_id,
            transaction_type_id: sub.transaction_type_id,
            category_id: sub.category_id,
            subcategory_id: sub.id,
            amount: amount::from_minor_units(cents),
            comment: Some(comment),
        })?;
        Ok(true)
    }
}

fn pick<T>(items: &[T], index: usize) -> Option<&T> {
    if items.is_empty() {
        None
    } else {
        items.get(index % items.len())
    }
}

