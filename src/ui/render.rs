//! Pure functions from API records to view records. Nothing here touches the network, the disk
//! or the screen.

use crate::model::{
    parse_api_date, Amount, Budget, Category, Dashboard, EntryKind, Report, Transaction,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const WARNING_PERCENT: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

/// Dates are shown as `Oct 2, 2025`. Text that is not a date is shown as is.
fn display_date(raw: &str) -> String {
    match parse_api_date(raw) {
        Some(day) => day.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub id: String,
    pub kind: EntryKind,
    pub category: String,
    pub date: String,
    pub description: Option<String>,
    /// `+$X.XX` for income, `-$X.XX` for expenses.
    pub amount: String,
}

pub fn transaction_row(transaction: &Transaction) -> TransactionRow {
    let sign = match transaction.kind {
        EntryKind::Income => '+',
        EntryKind::Expense => '-',
    };
    TransactionRow {
        id: transaction.id.clone(),
        kind: transaction.kind,
        category: transaction
            .category_name()
            .unwrap_or("Uncategorized")
            .to_string(),
        date: display_date(&transaction.date),
        description: transaction
            .description
            .clone()
            .filter(|d| !d.trim().is_empty()),
        amount: format!("{sign}${}", transaction.amount.plain()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressClass {
    Normal,
    Warning,
    Danger,
}

serde_plain::derive_display_from_serialize!(ProgressClass);

/// A progress indicator. `width` is a percentage that always lies in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressBar {
    pub width: Decimal,
    pub class: ProgressClass,
}

impl ProgressBar {
    /// The share of `amount` that `spent` represents. The class escalates at 80% and 100% of the
    /// unclamped share; the width is clamped. A zero amount gives an empty, normal bar.
    pub fn new(spent: Amount, amount: Amount) -> Self {
        let percent = used_percent(spent, amount);
        let class = if percent >= Decimal::ONE_HUNDRED {
            ProgressClass::Danger
        } else if percent >= WARNING_PERCENT {
            ProgressClass::Warning
        } else {
            ProgressClass::Normal
        };
        Self {
            width: percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED),
            class,
        }
    }

    /// A text bar such as `[#################---]`.
    pub fn bar(&self, cells: u32) -> String {
        let cells_dec = Decimal::from(cells);
        let filled = (self.width * cells_dec / Decimal::ONE_HUNDRED)
            .round()
            .try_into()
            .unwrap_or(0u32)
            .min(cells);
        format!(
            "[{}{}]",
            "#".repeat(filled as usize),
            "-".repeat((cells - filled) as usize)
        )
    }
}

impl Display for ProgressBar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.width.round_dp(2).normalize())
    }
}

/// Saturates instead of overflowing, so any pair of amounts has a percentage.
fn used_percent(spent: Amount, amount: Amount) -> Decimal {
    if amount.is_zero() {
        return Decimal::ZERO;
    }
    let saturated = if spent.is_negative() == amount.is_negative() {
        Decimal::MAX
    } else {
        Decimal::MIN
    };
    spent
        .value()
        .checked_div(amount.value())
        .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(saturated)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRow {
    pub id: String,
    pub category: String,
    /// `monthly • Oct 1, 2025 - Oct 31, 2025`
    pub period: String,
    /// `$85.00 of $100.00 spent`
    pub spent: String,
    /// `$15.00 remaining` or `$20.00 over`
    pub remaining: String,
    /// The unclamped share, e.g. `120.0% used`.
    pub used: String,
    pub progress: ProgressBar,
}

pub fn budget_row(budget: &Budget) -> BudgetRow {
    let left = budget
        .amount
        .value()
        .checked_sub(budget.spent.value())
        .unwrap_or(if budget.spent > budget.amount {
            Decimal::MIN
        } else {
            Decimal::MAX
        });
    let remaining = if left.is_sign_negative() && !left.is_zero() {
        format!("{} over", Amount::new(left).abs())
    } else {
        format!("{} remaining", Amount::new(left))
    };
    BudgetRow {
        id: budget.id.clone(),
        category: budget
            .category_name()
            .unwrap_or("Overall Budget")
            .to_string(),
        period: format!(
            "{} • {} - {}",
            budget.period,
            display_date(&budget.start_date),
            display_date(&budget.end_date)
        ),
        spent: format!("{} of {} spent", budget.spent, budget.amount),
        remaining,
        used: format!("{:.1}% used", used_percent(budget.spent, budget.amount)),
        progress: ProgressBar::new(budget.spent, budget.amount),
    }
}

/// One entry of a category dropdown. The placeholder has an empty `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub value: String,
    pub label: String,
}

impl CategoryOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// The transaction form's dropdown: a placeholder, then `name (type)` for every category.
pub fn category_options(categories: &[Category]) -> Vec<CategoryOption> {
    if categories.is_empty() {
        return Vec::new();
    }
    std::iter::once(CategoryOption::new("", "Select Category"))
        .chain(
            categories
                .iter()
                .map(|c| CategoryOption::new(&c.id, format!("{} ({})", c.name, c.kind))),
        )
        .collect()
}

/// The budget form's dropdown: expense categories only, labelled by name. The placeholder stands
/// for an overall budget.
pub fn budget_category_options(categories: &[Category]) -> Vec<CategoryOption> {
    let expenses: Vec<&Category> = categories
        .iter()
        .filter(|c| c.kind == EntryKind::Expense)
        .collect();
    if expenses.is_empty() {
        return Vec::new();
    }
    std::iter::once(CategoryOption::new("", "Overall Budget"))
        .chain(
            expenses
                .into_iter()
                .map(|c| CategoryOption::new(&c.id, &c.name)),
        )
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCard {
    pub label: String,
    pub value: String,
}

impl StatCard {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardView {
    pub cards: Vec<StatCard>,
    pub recent: Vec<TransactionRow>,
}

pub fn dashboard(data: &Dashboard) -> DashboardView {
    DashboardView {
        cards: vec![
            StatCard::new("Total Income", data.total_income.to_string()),
            StatCard::new("Total Expenses", data.total_expenses.to_string()),
            StatCard::new("Balance", data.balance().to_string()),
        ],
        recent: data.recent_transactions.iter().map(transaction_row).collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLine {
    pub category: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthLine {
    pub month: String,
    pub income: String,
    pub expenses: String,
    pub balance: String,
    pub transactions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub title: String,
    pub cards: Vec<StatCard>,
    pub categories: Vec<CategoryLine>,
    pub months: Vec<MonthLine>,
}

/// Three cards (the balance with an explicit sign), one line per expense category and, when the
/// API sent a month-by-month breakdown, one line per month.
pub fn report_summary(report: &Report) -> ReportSummary {
    let title = match (report.year, report.months.as_slice()) {
        (Some(year), [month]) => format!("{} {year}", month.month_name),
        (Some(year), _) => year.to_string(),
        (None, [month]) => month.month_name.clone(),
        (None, _) => "Report".to_string(),
    };
    ReportSummary {
        title,
        cards: vec![
            StatCard::new("Total Income", report.total_income.to_string()),
            StatCard::new("Total Expenses", report.total_expenses.to_string()),
            StatCard::new("Net Balance", report.balance.signed()),
        ],
        categories: report
            .expenses_by_category
            .iter()
            .map(|line| CategoryLine {
                category: line
                    .category
                    .clone()
                    .unwrap_or_else(|| "Uncategorized".to_string()),
                amount: line.amount.to_string(),
            })
            .collect(),
        months: report
            .months
            .iter()
            .map(|m| MonthLine {
                month: m.month_name.clone(),
                income: m.income.to_string(),
                expenses: m.expenses.to_string(),
                balance: m.balance().signed(),
                transactions: m.transaction_count,
            })
            .collect(),
    }
}
