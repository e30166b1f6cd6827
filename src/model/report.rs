use crate::model::{Amount, Transaction};
use serde::{Deserialize, Serialize};

/// The `data` of `GET /dashboard`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(default)]
    pub total_income: Amount,
    #[serde(default)]
    pub total_expenses: Amount,
    #[serde(default)]
    pub balance: Option<Amount>,
    #[serde(default)]
    pub recent_transactions: Vec<Transaction>,
}

impl Dashboard {
    /// The balance as sent by the API, or income minus expenses when it was omitted.
    pub fn balance(&self) -> Amount {
        self.balance.unwrap_or_else(|| {
            Amount::new(self.total_income.value() - self.total_expenses.value())
        })
    }
}

/// Which aggregation endpoint a report query goes to.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Monthly,
    Yearly,
}

serde_plain::derive_display_from_serialize!(ReportKind);
serde_plain::derive_fromstr_from_deserialize!(ReportKind);

/// A request for `/reports/monthly` or `/reports/yearly`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportQuery {
    pub kind: ReportKind,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl ReportQuery {
    pub fn path(&self) -> &'static str {
        match self.kind {
            ReportKind::Monthly => "/reports/monthly",
            ReportKind::Yearly => "/reports/yearly",
        }
    }

    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(year) = self.year {
            query.push(("year".to_string(), year.to_string()));
        }
        if let (ReportKind::Monthly, Some(month)) = (self.kind, self.month) {
            query.push(("month".to_string(), month.to_string()));
        }
        query
    }
}

/// One expense (or income) category and its total over the report period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    #[serde(default)]
    pub category: Option<String>,
    pub amount: Amount,
}

/// Totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    pub month_name: String,
    pub income: Amount,
    pub expenses: Amount,
    #[serde(default)]
    pub balance: Option<Amount>,
    #[serde(default)]
    pub transaction_count: u64,
}

impl MonthSummary {
    pub fn balance(&self) -> Amount {
        self.balance
            .unwrap_or_else(|| Amount::new(self.income.value() - self.expenses.value()))
    }
}

/// A report normalized from whichever shape the API returned. Purely display data.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub year: Option<i32>,
    pub total_income: Amount,
    pub total_expenses: Amount,
    pub balance: Amount,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub months: Vec<MonthSummary>,
}

/// The three shapes the report endpoints answer with.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawReport {
    /// `/reports/yearly`
    #[serde(rename_all = "camelCase")]
    Yearly {
        #[serde(default)]
        year: Option<i32>,
        total_income: Amount,
        total_expenses: Amount,
        #[serde(default)]
        balance: Option<Amount>,
        #[serde(default)]
        expense_categories: Vec<CategoryTotal>,
    },
    /// `/reports/monthly` without a month: twelve months plus a summary.
    Breakdown {
        #[serde(default)]
        year: Option<i32>,
        months: Vec<MonthSummary>,
        summary: BreakdownSummary,
    },
    /// `/reports/monthly?month=N`
    Month(MonthSummary),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BreakdownSummary {
    total_income: Amount,
    total_expenses: Amount,
    #[serde(default)]
    total_balance: Option<Amount>,
}

fn difference(income: Amount, expenses: Amount) -> Amount {
    Amount::new(income.value() - expenses.value())
}

impl RawReport {
    pub(crate) fn normalize(self) -> Report {
        match self {
            RawReport::Yearly {
                year,
                total_income,
                total_expenses,
                balance,
                expense_categories,
            } => Report {
                year,
                total_income,
                total_expenses,
                balance: balance.unwrap_or_else(|| difference(total_income, total_expenses)),
                expenses_by_category: expense_categories,
                months: Vec::new(),
            },
            RawReport::Breakdown {
                year,
                months,
                summary,
            } => Report {
                year,
                total_income: summary.total_income,
                total_expenses: summary.total_expenses,
                balance: summary
                    .total_balance
                    .unwrap_or_else(|| difference(summary.total_income, summary.total_expenses)),
                expenses_by_category: Vec::new(),
                months,
            },
            RawReport::Month(month) => Report {
                year: month.year,
                total_income: month.income,
                total_expenses: month.expenses,
                balance: month.balance(),
                expenses_by_category: Vec::new(),
                months: vec![month],
            },
        }
    }
}
