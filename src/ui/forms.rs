//! Form controllers for the transaction, budget and report query forms.
//!
//! A form is either hidden, holding nothing, or visible with the values typed so far. Hiding a
//! form drops its values, so opening it again always starts from the pre-filled defaults.

use crate::model::{Amount, EntryKind, NewBudget, NewTransaction, Period, ReportKind, ReportQuery};
use crate::Result;
use anyhow::{anyhow, bail};
use chrono::{Datelike, NaiveDate};
use std::fmt::Debug;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The values of one form.
pub trait FormFields: Debug + Default + Clone {
    /// The request body (or query) that a submit sends.
    type Payload;

    /// The field names accepted by `set`.
    const NAMES: &'static [&'static str];

    /// Fills the defaults that depend on the current date.
    fn prefill(&mut self, today: NaiveDate);

    /// Sets one field from text, the way an input widget would. Fields backed by a fixed set of
    /// choices reject values outside that set; free-text fields take anything.
    fn set(&mut self, name: &str, value: &str) -> Result<()>;

    /// Packages the current values. No validation happens here.
    fn payload(&self) -> Self::Payload;
}

/// The two states of a form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState<F> {
    #[default]
    Hidden,
    Visible(F),
}

/// Drives one form through `Hidden` and `Visible`.
#[derive(Debug, Clone, Default)]
pub struct FormController<F: FormFields> {
    state: FormState<F>,
}

impl<F: FormFields> FormController<F> {
    pub fn new() -> Self {
        Self {
            state: FormState::Hidden,
        }
    }

    pub fn state(&self) -> &FormState<F> {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, FormState::Visible(_))
    }

    /// Hidden to visible with pre-filled fields. Opening a visible form keeps what was typed.
    pub fn open(&mut self, today: NaiveDate) {
        if let FormState::Hidden = self.state {
            let mut fields = F::default();
            fields.prefill(today);
            self.state = FormState::Visible(fields);
        }
    }

    /// Visible to hidden. The values are dropped.
    pub fn cancel(&mut self) {
        self.state = FormState::Hidden;
    }

    pub fn fields(&self) -> Option<&F> {
        match &self.state {
            FormState::Visible(fields) => Some(fields),
            FormState::Hidden => None,
        }
    }

    pub fn fields_mut(&mut self) -> Option<&mut F> {
        match &mut self.state {
            FormState::Visible(fields) => Some(fields),
            FormState::Hidden => None,
        }
    }

    /// Sets a field of the visible form.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match self.fields_mut() {
            Some(fields) => fields.set(name, value),
            None => bail!("The form is not open"),
        }
    }

    /// The payload of the visible form, `None` while hidden.
    pub fn payload(&self) -> Option<F::Payload> {
        self.fields().map(F::payload)
    }

    /// Ends a submit: success hides and clears the form, failure leaves it exactly as it was.
    pub fn finish(&mut self, succeeded: bool) {
        if succeeded {
            self.cancel();
        }
    }
}

/// Amount text is parsed without bounds or precision checks. Text that is not a number becomes
/// `None` and is sent as `null`.
fn parse_amount(text: &str) -> Option<Amount> {
    if text.trim().is_empty() {
        return None;
    }
    Amount::from_str(text).ok()
}

fn choice<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|_| anyhow!("'{value}' is not a valid choice for {name}"))
}

fn unknown_field(name: &str, names: &[&str]) -> anyhow::Error {
    anyhow!(
        "Unknown field '{name}', expected one of: {}",
        names.join(", ")
    )
}

/// Fields of the add-transaction form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionFields {
    pub kind: EntryKind,
    pub category_id: String,
    pub amount: String,
    pub date: String,
    pub description: String,
}

impl FormFields for TransactionFields {
    type Payload = NewTransaction;
    const NAMES: &'static [&'static str] = &["type", "category", "amount", "date", "description"];

    /// The date starts at today.
    fn prefill(&mut self, today: NaiveDate) {
        self.date = today.format(DATE_FORMAT).to_string();
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "type" => self.kind = choice(name, value)?,
            "category" => self.category_id = value.trim().to_string(),
            "amount" => self.amount = value.to_string(),
            "date" => self.date = value.trim().to_string(),
            "description" => self.description = value.to_string(),
            _ => return Err(unknown_field(name, Self::NAMES)),
        }
        Ok(())
    }

    fn payload(&self) -> NewTransaction {
        NewTransaction {
            kind: self.kind.to_string(),
            category_id: self.category_id.clone(),
            amount: parse_amount(&self.amount),
            transaction_date: self.date.clone(),
            description: self.description.clone(),
        }
    }
}

/// Fields of the add-budget form. An empty category means an overall budget.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BudgetFields {
    pub category_id: String,
    pub amount: String,
    pub period: Period,
    pub start_date: String,
    pub end_date: String,
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn last_of_month(day: NaiveDate) -> NaiveDate {
    let (year, month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(day)
}

impl BudgetFields {
    /// Changes the period and moves the end date to match: the last day of the start date's
    /// month for monthly, December 31 of its year for yearly. Weekly leaves the end date alone.
    /// A start date that does not parse leaves the end date alone as well.
    pub fn set_period(&mut self, period: Period) {
        self.period = period;
        let Ok(start) = NaiveDate::parse_from_str(self.start_date.trim(), DATE_FORMAT) else {
            return;
        };
        let end = match period {
            Period::Weekly => return,
            Period::Monthly => last_of_month(start),
            Period::Yearly => NaiveDate::from_ymd_opt(start.year(), 12, 31).unwrap_or(start),
        };
        self.end_date = end.format(DATE_FORMAT).to_string();
    }
}

impl FormFields for BudgetFields {
    type Payload = NewBudget;
    const NAMES: &'static [&'static str] = &["category", "amount", "period", "start", "end"];

    /// Start and end cover the current calendar month.
    fn prefill(&mut self, today: NaiveDate) {
        self.start_date = first_of_month(today).format(DATE_FORMAT).to_string();
        self.end_date = last_of_month(today).format(DATE_FORMAT).to_string();
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "category" => self.category_id = value.trim().to_string(),
            "amount" => self.amount = value.to_string(),
            "period" => self.set_period(choice(name, value)?),
            "start" => self.start_date = value.trim().to_string(),
            "end" => self.end_date = value.trim().to_string(),
            _ => return Err(unknown_field(name, Self::NAMES)),
        }
        Ok(())
    }

    fn payload(&self) -> NewBudget {
        let category_id = Some(self.category_id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        NewBudget {
            category_id,
            amount: parse_amount(&self.amount),
            period: self.period.to_string(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }
}

/// Fields of the report query form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportFields {
    pub kind: ReportKind,
    pub year: String,
    pub month: String,
}

impl FormFields for ReportFields {
    type Payload = ReportQuery;
    const NAMES: &'static [&'static str] = &["kind", "year", "month"];

    /// The year starts at the current year.
    fn prefill(&mut self, today: NaiveDate) {
        self.year = today.year().to_string();
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "kind" => self.kind = choice(name, value)?,
            "year" => self.year = value.trim().to_string(),
            "month" => self.month = value.trim().to_string(),
            _ => return Err(unknown_field(name, Self::NAMES)),
        }
        Ok(())
    }

    /// Year and month that do not parse are left out of the query.
    fn payload(&self) -> ReportQuery {
        ReportQuery {
            kind: self.kind,
            year: self.year.trim().parse().ok(),
            month: self.month.trim().parse().ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_transaction_form_prefills_today() {
        let mut form = FormController::<TransactionFields>::new();
        assert!(!form.is_visible());
        assert!(form.payload().is_none());
        form.open(day(2025, 10, 18));
        assert_eq!(form.fields().unwrap().date, "2025-10-18");
    }

    #[test]
    fn test_cancel_clears_fields() {
        let mut form = FormController::<TransactionFields>::new();
        form.open(day(2025, 10, 18));
        form.set("amount", "12.50").unwrap();
        form.set("description", "Lunch").unwrap();
        form.cancel();
        assert!(form.fields().is_none());
        form.open(day(2025, 10, 19));
        let fields = form.fields().unwrap();
        assert!(fields.amount.is_empty());
        assert!(fields.description.is_empty());
        assert_eq!(fields.date, "2025-10-19");
    }

    #[test]
    fn test_open_twice_keeps_values() {
        let mut form = FormController::<TransactionFields>::new();
        form.open(day(2025, 10, 18));
        form.set("amount", "3").unwrap();
        form.open(day(2025, 10, 20));
        assert_eq!(form.fields().unwrap().amount, "3");
        assert_eq!(form.fields().unwrap().date, "2025-10-18");
    }

    #[test]
    fn test_finish_failure_keeps_form() {
        let mut form = FormController::<BudgetFields>::new();
        form.open(day(2025, 10, 18));
        form.set("amount", "100").unwrap();
        let before = form.fields().cloned();
        form.finish(false);
        assert!(form.is_visible());
        assert_eq!(form.fields().cloned(), before);
        form.finish(true);
        assert!(!form.is_visible());
    }

    #[test]
    fn test_set_on_hidden_form_fails() {
        let mut form = FormController::<ReportFields>::new();
        assert!(form.set("year", "2025").is_err());
    }

    #[test]
    fn test_transaction_payload() {
        let mut fields = TransactionFields::default();
        fields.prefill(day(2025, 10, 2));
        fields.set("type", "Income").unwrap();
        fields.set("category", "c1").unwrap();
        fields.set("amount", "$1,250.5").unwrap();
        let payload = fields.payload();
        assert_eq!(payload.kind, "income");
        assert_eq!(payload.amount.unwrap().value(), Decimal::new(12505, 1));
        assert_eq!(payload.transaction_date, "2025-10-02");
        assert!(fields.set("type", "transfer").is_err());
        assert!(fields.set("colour", "red").is_err());
    }

    #[test]
    fn test_unparseable_amount_is_sent_as_null() {
        let mut fields = TransactionFields::default();
        fields.set("amount", "lots").unwrap();
        assert!(fields.payload().amount.is_none());
        fields.set("amount", "").unwrap();
        assert!(fields.payload().amount.is_none());
    }

    #[test]
    fn test_budget_prefill_covers_month() {
        let mut fields = BudgetFields::default();
        fields.prefill(day(2024, 2, 14));
        assert_eq!(fields.start_date, "2024-02-01");
        assert_eq!(fields.end_date, "2024-02-29");

        fields.prefill(day(2025, 12, 31));
        assert_eq!(fields.start_date, "2025-12-01");
        assert_eq!(fields.end_date, "2025-12-31");
    }

    #[test]
    fn test_budget_period_moves_end_date() {
        let mut fields = BudgetFields::default();
        fields.prefill(day(2025, 10, 18));
        fields.set("start", "2025-04-10").unwrap();
        fields.set("period", "yearly").unwrap();
        assert_eq!(fields.end_date, "2025-12-31");
        fields.set("period", "monthly").unwrap();
        assert_eq!(fields.end_date, "2025-04-30");
        fields.set("period", "weekly").unwrap();
        assert_eq!(fields.period, Period::Weekly);
        assert_eq!(fields.end_date, "2025-04-30");
    }

    #[test]
    fn test_overall_budget_payload() {
        let mut fields = BudgetFields::default();
        fields.prefill(day(2025, 10, 18));
        fields.set("amount", "100").unwrap();
        fields.set("category", "  ").unwrap();
        let payload = fields.payload();
        assert!(payload.category_id.is_none());
        assert_eq!(payload.period, "monthly");
        assert_eq!(payload.end_date, "2025-10-31");
    }

    #[test]
    fn test_report_payload() {
        let mut form = FormController::<ReportFields>::new();
        form.open(day(2025, 10, 18));
        form.set("month", "10").unwrap();
        let query = form.payload().unwrap();
        assert_eq!(query.year, Some(2025));
        assert_eq!(query.month, Some(10));
        assert_eq!(query.kind, ReportKind::Monthly);

        form.set("kind", "yearly").unwrap();
        form.set("month", "").unwrap();
        let query = form.payload().unwrap();
        assert_eq!(query.kind, ReportKind::Yearly);
        assert_eq!(query.month, None);
    }
}
