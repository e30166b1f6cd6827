//! Implements the `Gateway` trait with an in-memory fake of the finance API.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the
//! whole app, top-to-bottom, without a server. Set `FIN_IN_TEST_MODE` to use it.

use crate::api::{ApiRequest, Envelope, Gateway, Method};
use crate::model::{parse_api_date, Amount, EntryKind, Period};
use crate::Result;
use anyhow::anyhow;
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

/// The seeded account that every fresh `TestGateway` knows about.
pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "password123";
const DEMO_NAME: &str = "Demo User";
const DEMO_ID: &str = "u-demo";

/// An implementation of the `Gateway` trait that answers from memory. By default it is seeded
/// with one account (`DEMO_EMAIL`) that has categories and a few transactions.
#[derive(Clone, Default)]
pub struct TestGateway {
    state: Arc<Mutex<State>>,
}

impl TestGateway {
    /// A handle that shares this gateway's state, so a test can keep steering the fake API
    /// after the gateway itself has been boxed and moved into a `FinanceApi`.
    pub fn handle(&self) -> TestGatewayHandle {
        TestGatewayHandle {
            state: self.state.clone(),
        }
    }
}

#[async_trait::async_trait]
impl Gateway for TestGateway {
    async fn send(&mut self, request: ApiRequest) -> Result<Envelope> {
        let mut state = lock(&self.state);
        trace!("In-memory API received {request:?}");
        state.calls.push(request.clone());
        if state.offline {
            return Err(anyhow!(
                "Unable to connect to the finance API: connection refused"
            ));
        }
        if let Some(message) = state.failures.remove(&request.path) {
            return Ok(Envelope::failure(message));
        }
        Ok(state.handle(&request))
    }
}

/// Inspects and steers a `TestGateway`.
#[derive(Clone)]
pub struct TestGatewayHandle {
    state: Arc<Mutex<State>>,
}

impl TestGatewayHandle {
    /// Every request received so far, in order.
    pub fn calls(&self) -> Vec<ApiRequest> {
        lock(&self.state).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    /// While offline every request fails in transport.
    pub fn set_offline(&self, offline: bool) {
        lock(&self.state).offline = offline;
    }

    /// The next request to `path` is answered with `success: false` and `message`.
    pub fn fail_next(&self, path: impl Into<String>, message: impl Into<String>) {
        lock(&self.state)
            .failures
            .insert(path.into(), message.into());
    }

    /// The number of budgets the account with `email` has.
    pub fn budget_count(&self, email: &str) -> usize {
        lock(&self.state)
            .accounts
            .iter()
            .find(|a| a.email == email)
            .map(|a| a.budgets.len())
            .unwrap_or_default()
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
struct StoredCategory {
    id: String,
    name: String,
    kind: EntryKind,
}

#[derive(Debug, Clone)]
struct StoredTransaction {
    id: String,
    kind: EntryKind,
    category_id: String,
    amount: Amount,
    date: NaiveDate,
    description: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredBudget {
    id: String,
    category_id: Option<String>,
    amount: Amount,
    period: Period,
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, Clone)]
struct Account {
    id: String,
    email: String,
    full_name: String,
    password: String,
    categories: Vec<StoredCategory>,
    transactions: Vec<StoredTransaction>,
    budgets: Vec<StoredBudget>,
}

impl Account {
    fn new(id: impl Into<String>, full_name: &str, email: &str, password: &str) -> Self {
        Self {
            id: id.into(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            password: password.to_string(),
            categories: Vec::new(),
            transactions: Vec::new(),
            budgets: Vec::new(),
        }
    }

    fn token(&self) -> String {
        format!("test-token-{}", self.id)
    }

    fn user_json(&self) -> Value {
        json!({ "id": self.id, "email": self.email, "full_name": self.full_name })
    }

    fn seed_categories(&mut self) {
        const DEFAULTS: [(&str, EntryKind); 12] = [
            ("Salary", EntryKind::Income),
            ("Freelance", EntryKind::Income),
            ("Investment", EntryKind::Income),
            ("Other Income", EntryKind::Income),
            ("Food & Dining", EntryKind::Expense),
            ("Transportation", EntryKind::Expense),
            ("Shopping", EntryKind::Expense),
            ("Entertainment", EntryKind::Expense),
            ("Bills & Utilities", EntryKind::Expense),
            ("Healthcare", EntryKind::Expense),
            ("Education", EntryKind::Expense),
            ("Other Expense", EntryKind::Expense),
        ];
        self.categories = DEFAULTS
            .iter()
            .enumerate()
            .map(|(i, (name, kind))| StoredCategory {
                id: format!("c{}", i + 1),
                name: name.to_string(),
                kind: *kind,
            })
            .collect();
    }

    fn category(&self, id: &str) -> Option<&StoredCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    fn category_json(&self, id: Option<&str>) -> Value {
        match id.and_then(|id| self.category(id)) {
            Some(c) => json!({ "id": c.id, "name": c.name, "type": c.kind }),
            None => Value::Null,
        }
    }

    fn transaction_json(&self, t: &StoredTransaction) -> Value {
        json!({
            "id": t.id,
            "type": t.kind,
            "amount": t.amount,
            "transaction_date": t.date.format("%Y-%m-%d").to_string(),
            "description": t.description,
            "Category": self.category_json(Some(&t.category_id)),
        })
    }

    /// Newest first.
    fn sorted_transactions(&self) -> Vec<&StoredTransaction> {
        let mut sorted: Vec<&StoredTransaction> = self.transactions.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    fn total(&self, kind: EntryKind, from: NaiveDate, to: NaiveDate) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.kind == kind && t.date >= from && t.date <= to)
            .map(|t| t.amount.value())
            .sum()
    }

    fn spent(&self, budget: &StoredBudget) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.kind == EntryKind::Expense)
            .filter(|t| t.date >= budget.start && t.date <= budget.end)
            .filter(|t| match budget.category_id.as_deref() {
                Some(id) => t.category_id == id,
                None => true,
            })
            .map(|t| t.amount.value())
            .sum()
    }
}

#[derive(Debug)]
struct State {
    accounts: Vec<Account>,
    calls: Vec<ApiRequest>,
    offline: bool,
    failures: HashMap<String, String>,
}

impl Default for State {
    /// Seeds the demo account.
    fn default() -> Self {
        let mut demo = Account::new(DEMO_ID, DEMO_NAME, DEMO_EMAIL, DEMO_PASSWORD);
        demo.seed_categories();
        let seed = [
            ("t1", EntryKind::Income, "c1", 300000, "2025-10-01", "October salary"),
            ("t2", EntryKind::Expense, "c5", 4250, "2025-10-02", "Groceries"),
            ("t3", EntryKind::Expense, "c6", 6000, "2025-10-05", "Fuel"),
            ("t4", EntryKind::Expense, "c9", 12000, "2025-10-10", "Electric bill"),
        ];
        demo.transactions = seed
            .iter()
            .filter_map(|(id, kind, category_id, cents, date, description)| {
                Some(StoredTransaction {
                    id: id.to_string(),
                    kind: *kind,
                    category_id: category_id.to_string(),
                    amount: Amount::new(Decimal::new(*cents, 2)),
                    date: parse_api_date(date)?,
                    description: Some(description.to_string()),
                })
            })
            .collect();
        Self {
            accounts: vec![demo],
            calls: Vec::new(),
            offline: false,
            failures: HashMap::new(),
        }
    }
}

fn field<'a>(body: &'a Value, name: &str) -> Option<&'a str> {
    body.get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn amount_field(body: &Value) -> Option<Amount> {
    body.get("amount")
        .cloned()
        .and_then(|v| serde_json::from_value::<Option<Amount>>(v).ok())
        .flatten()
}

fn query_value<'a>(request: &'a ApiRequest, name: &str) -> Option<&'a str> {
    request
        .query
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown")
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl State {
    fn handle(&mut self, request: &ApiRequest) -> Envelope {
        let body = request.body.clone().unwrap_or(Value::Null);
        match (request.method, request.path.as_str()) {
            (Method::Post, "/auth/register") => self.register(&body),
            (Method::Post, "/auth/login") => self.login(&body),
            (method, path) => {
                let Some(index) = self.authorize(request) else {
                    return Envelope::failure("Invalid or expired token");
                };
                let account = &mut self.accounts[index];
                match (method, path) {
                    (Method::Get, "/auth/profile") => {
                        Envelope::ok(account.user_json(), "Profile retrieved successfully")
                    }
                    (Method::Post, "/categories/initialize") => {
                        if account.categories.is_empty() {
                            account.seed_categories();
                        }
                        Envelope::ok(Value::Null, "Default categories initialized")
                    }
                    (Method::Get, "/categories") => categories(account),
                    (Method::Get, "/dashboard") => dashboard(account),
                    (Method::Get, "/transactions") => transactions(account, request),
                    (Method::Post, "/transactions") => create_transaction(account, &body),
                    (Method::Get, "/budgets") => budgets(account),
                    (Method::Post, "/budgets") => create_budget(account, &body),
                    (Method::Delete, path) if path.starts_with("/budgets/") => {
                        delete_budget(account, &path["/budgets/".len()..])
                    }
                    (Method::Get, "/reports/monthly") => monthly_report(account, request),
                    (Method::Get, "/reports/yearly") => yearly_report(account, request),
                    _ => Envelope::failure(format!("Route {} not found", request.path)),
                }
            }
        }
    }

    fn authorize(&self, request: &ApiRequest) -> Option<usize> {
        let credential = request.credential.as_deref()?;
        self.accounts.iter().position(|a| a.token() == credential)
    }

    fn register(&mut self, body: &Value) -> Envelope {
        let (Some(full_name), Some(email), Some(password)) = (
            field(body, "full_name"),
            field(body, "email"),
            field(body, "password"),
        ) else {
            return Envelope::failure(
                "Please provide all required fields: full_name, email, password",
            );
        };
        if self.accounts.iter().any(|a| a.email == email) {
            return Envelope::failure("User already exists with this email");
        }
        let account = Account::new(new_id(), full_name, email, password);
        let data = json!({ "token": account.token(), "user": account.user_json() });
        self.accounts.push(account);
        Envelope::ok(data, "User registered successfully")
    }

    fn login(&self, body: &Value) -> Envelope {
        let (Some(email), Some(password)) = (field(body, "email"), field(body, "password"))
        else {
            return Envelope::failure("Please provide email and password");
        };
        match self
            .accounts
            .iter()
            .find(|a| a.email == email && a.password == password)
        {
            Some(account) => Envelope::ok(
                json!({ "token": account.token(), "user": account.user_json() }),
                "Login successful",
            ),
            None => Envelope::failure("Invalid email or password"),
        }
    }
}

fn categories(account: &Account) -> Envelope {
    let list: Vec<Value> = account
        .categories
        .iter()
        .map(|c| json!({ "id": c.id, "name": c.name, "type": c.kind }))
        .collect();
    Envelope::ok(Value::Array(list), "Categories retrieved successfully")
}

fn dashboard(account: &Account) -> Envelope {
    let (from, to) = (NaiveDate::MIN, NaiveDate::MAX);
    let income = account.total(EntryKind::Income, from, to);
    let expenses = account.total(EntryKind::Expense, from, to);
    let recent: Vec<Value> = account
        .sorted_transactions()
        .into_iter()
        .take(5)
        .map(|t| account.transaction_json(t))
        .collect();
    Envelope::ok(
        json!({
            "totalIncome": Amount::new(income),
            "totalExpenses": Amount::new(expenses),
            "balance": Amount::new(income - expenses),
            "recentTransactions": recent,
        }),
        "Dashboard data retrieved successfully",
    )
}

fn transactions(account: &Account, request: &ApiRequest) -> Envelope {
    let kind = query_value(request, "type").and_then(|s| s.parse::<EntryKind>().ok());
    let category_id = query_value(request, "category_id");
    let limit = query_value(request, "limit").and_then(|s| s.parse::<usize>().ok());
    let list: Vec<Value> = account
        .sorted_transactions()
        .into_iter()
        .filter(|t| kind.map_or(true, |k| t.kind == k))
        .filter(|t| category_id.map_or(true, |id| t.category_id == id))
        .take(limit.unwrap_or(usize::MAX))
        .map(|t| account.transaction_json(t))
        .collect();
    let total = list.len();
    Envelope::ok(
        json!({ "transactions": list, "total": total }),
        "Transactions retrieved successfully",
    )
}

fn create_transaction(account: &mut Account, body: &Value) -> Envelope {
    let Some(kind) = field(body, "type").and_then(|s| s.parse::<EntryKind>().ok()) else {
        return Envelope::failure("Transaction type must be income or expense");
    };
    let Some(category_id) = field(body, "category_id") else {
        return Envelope::failure("Category is required");
    };
    if account.category(category_id).is_none() {
        return Envelope::failure("Category not found");
    }
    let amount = match amount_field(body) {
        Some(amount) if amount.value() > Decimal::ZERO => amount,
        _ => return Envelope::failure("Amount must be greater than 0"),
    };
    let Some(date) = field(body, "transaction_date").and_then(parse_api_date) else {
        return Envelope::failure("A valid transaction date is required");
    };
    let transaction = StoredTransaction {
        id: new_id(),
        kind,
        category_id: category_id.to_string(),
        amount,
        date,
        description: field(body, "description").map(str::to_string),
    };
    let data = account.transaction_json(&transaction);
    account.transactions.push(transaction);
    Envelope::ok(data, "Transaction created successfully")
}

fn budgets(account: &Account) -> Envelope {
    let list: Vec<Value> = account
        .budgets
        .iter()
        .map(|b| {
            let spent = account.spent(b);
            let limit = b.amount.value();
            let percentage = if limit.is_zero() {
                Decimal::ZERO
            } else {
                spent / limit * Decimal::ONE_HUNDRED
            };
            let category = match account.category_json(b.category_id.as_deref()) {
                Value::Null => json!({ "name": null, "type": null }),
                category => category,
            };
            json!({
                "id": b.id,
                "category_id": b.category_id,
                "budgetAmount": b.amount,
                "spentAmount": Amount::new(spent),
                "remaining": Amount::new(limit - spent),
                "percentage": Amount::new(percentage.round_dp(2)),
                "period": b.period,
                "start_date": b.start.format("%Y-%m-%d").to_string(),
                "end_date": b.end.format("%Y-%m-%d").to_string(),
                "Category": category,
            })
        })
        .collect();
    Envelope::ok(Value::Array(list), "Budgets retrieved successfully")
}

fn create_budget(account: &mut Account, body: &Value) -> Envelope {
    let category_id = field(body, "category_id").map(str::to_string);
    if let Some(id) = category_id.as_deref() {
        if account.category(id).is_none() {
            return Envelope::failure("Category not found");
        }
    }
    let amount = match amount_field(body) {
        Some(amount) if amount.value() > Decimal::ZERO => amount,
        _ => return Envelope::failure("Budget amount must be greater than 0"),
    };
    let Some(period) = field(body, "period").and_then(|s| s.parse::<Period>().ok()) else {
        return Envelope::failure("Period must be weekly, monthly or yearly");
    };
    let (Some(start), Some(end)) = (
        field(body, "start_date").and_then(parse_api_date),
        field(body, "end_date").and_then(parse_api_date),
    ) else {
        return Envelope::failure("Start and end dates are required");
    };
    if end < start {
        return Envelope::failure("End date must be after start date");
    }
    if account
        .budgets
        .iter()
        .any(|b| b.category_id == category_id && b.period == period && b.start == start)
    {
        return Envelope::failure("A budget for this category and period already exists");
    }
    let budget = StoredBudget {
        id: new_id(),
        category_id,
        amount,
        period,
        start,
        end,
    };
    let data = json!({
        "id": budget.id,
        "category_id": budget.category_id,
        "amount": budget.amount,
        "period": budget.period,
        "start_date": budget.start.format("%Y-%m-%d").to_string(),
        "end_date": budget.end.format("%Y-%m-%d").to_string(),
    });
    account.budgets.push(budget);
    Envelope::ok(data, "Budget created successfully")
}

fn delete_budget(account: &mut Account, id: &str) -> Envelope {
    let before = account.budgets.len();
    account.budgets.retain(|b| b.id != id);
    if account.budgets.len() == before {
        Envelope::failure("Budget not found")
    } else {
        Envelope::ok(Value::Null, "Budget deleted successfully")
    }
}

fn report_year(request: &ApiRequest) -> i32 {
    query_value(request, "year")
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| Local::now().year())
}

fn month_summary(account: &Account, year: i32, month: u32) -> Option<Value> {
    let (first, last) = month_bounds(year, month)?;
    let income = account.total(EntryKind::Income, first, last);
    let expenses = account.total(EntryKind::Expense, first, last);
    let count = account
        .transactions
        .iter()
        .filter(|t| t.date >= first && t.date <= last)
        .count();
    Some(json!({
        "year": year,
        "month": month,
        "monthName": month_name(month),
        "income": Amount::new(income),
        "expenses": Amount::new(expenses),
        "balance": Amount::new(income - expenses),
        "transactionCount": count,
    }))
}

fn monthly_report(account: &Account, request: &ApiRequest) -> Envelope {
    let year = report_year(request);
    if let Some(month) = query_value(request, "month") {
        return match month.parse().ok().and_then(|m| month_summary(account, year, m)) {
            Some(summary) => Envelope::ok(summary, "Monthly report retrieved successfully"),
            None => Envelope::failure("Month must be between 1 and 12"),
        };
    }
    let months: Vec<Value> = (1..=12)
        .filter_map(|m| month_summary(account, year, m))
        .collect();
    let (first, last) = (
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX),
    );
    let income = account.total(EntryKind::Income, first, last);
    let expenses = account.total(EntryKind::Expense, first, last);
    let twelve = Decimal::from(12);
    Envelope::ok(
        json!({
            "year": year,
            "months": months,
            "summary": {
                "totalIncome": Amount::new(income),
                "totalExpenses": Amount::new(expenses),
                "totalBalance": Amount::new(income - expenses),
                "averageMonthlyIncome": Amount::new((income / twelve).round_dp(2)),
                "averageMonthlyExpenses": Amount::new((expenses / twelve).round_dp(2)),
            }
        }),
        "Monthly report retrieved successfully",
    )
}

fn yearly_report(account: &Account, request: &ApiRequest) -> Envelope {
    let year = report_year(request);
    let (first, last) = (
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX),
    );
    let income = account.total(EntryKind::Income, first, last);
    let expenses = account.total(EntryKind::Expense, first, last);
    let by_category = |kind: EntryKind| -> Vec<Value> {
        let mut totals: Vec<(String, Decimal)> = Vec::new();
        for t in account
            .transactions
            .iter()
            .filter(|t| t.kind == kind && t.date >= first && t.date <= last)
        {
            let name = account
                .category(&t.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Uncategorized".to_string());
            match totals.iter_mut().find(|(n, _)| *n == name) {
                Some((_, sum)) => *sum += t.amount.value(),
                None => totals.push((name, t.amount.value())),
            }
        }
        totals.sort_by(|a, b| b.1.cmp(&a.1));
        totals
            .into_iter()
            .map(|(category, total)| json!({ "category": category, "amount": Amount::new(total) }))
            .collect()
    };
    Envelope::ok(
        json!({
            "year": year,
            "totalIncome": Amount::new(income),
            "totalExpenses": Amount::new(expenses),
            "balance": Amount::new(income - expenses),
            "incomeCategories": by_category(EntryKind::Income),
            "expenseCategories": by_category(EntryKind::Expense),
        }),
        "Yearly report retrieved successfully",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Reply;
    use crate::model::{Budget, Category, Dashboard, Report, TransactionList};

    fn login(gateway: &mut TestGateway) -> String {
        let state = &mut lock(&gateway.state);
        let envelope =
            state.login(&json!({ "email": DEMO_EMAIL, "password": DEMO_PASSWORD }));
        envelope.data.unwrap()["token"].as_str().unwrap().to_string()
    }

    async fn send<T: serde::de::DeserializeOwned>(
        gateway: &mut TestGateway,
        request: ApiRequest,
    ) -> Reply<T> {
        gateway.send(request).await.unwrap().into_reply().unwrap()
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let mut gateway = TestGateway::default();
        let reply: Reply<Dashboard> = send(&mut gateway, ApiRequest::get("/dashboard")).await;
        assert_eq!(
            reply,
            Reply::Failure {
                message: Some("Invalid or expired token".into())
            }
        );
    }

    #[tokio::test]
    async fn test_seeded_dashboard() {
        let mut gateway = TestGateway::default();
        let token = login(&mut gateway);
        let reply: Reply<Dashboard> =
            send(&mut gateway, ApiRequest::get("/dashboard").bearer(token)).await;
        let Reply::Success { data, .. } = reply else {
            panic!("dashboard failed")
        };
        assert_eq!(data.total_income.to_string(), "$3000.00");
        assert_eq!(data.total_expenses.to_string(), "$222.50");
        assert_eq!(data.balance().to_string(), "$2777.50");
        assert_eq!(data.recent_transactions[0].description.as_deref(), Some("Electric bill"));
    }

    #[tokio::test]
    async fn test_budget_spent_follows_transactions() {
        let mut gateway = TestGateway::default();
        let token = login(&mut gateway);
        let create = ApiRequest::post("/budgets")
            .json(&json!({
                "category_id": "c5", "amount": 100.0, "period": "monthly",
                "start_date": "2025-10-01", "end_date": "2025-10-31"
            }))
            .unwrap()
            .bearer(token.clone());
        let reply: Reply<Value> = send(&mut gateway, create).await;
        assert!(reply.is_success());

        let reply: Reply<Vec<Budget>> =
            send(&mut gateway, ApiRequest::get("/budgets").bearer(token)).await;
        let Reply::Success { data, .. } = reply else {
            panic!("budgets failed")
        };
        assert_eq!(data[0].spent.to_string(), "$42.50");
        assert_eq!(data[0].category_name(), Some("Food & Dining"));
    }

    #[tokio::test]
    async fn test_new_account_has_no_categories_until_initialized() {
        let mut gateway = TestGateway::default();
        let register = ApiRequest::post("/auth/register")
            .json(&json!({ "full_name": "Ada", "email": "ada@example.com", "password": "x" }))
            .unwrap();
        let reply: Reply<crate::model::AuthData> = send(&mut gateway, register).await;
        let Reply::Success { data, .. } = reply else {
            panic!("register failed")
        };
        let token = data.token.unwrap();

        let reply: Reply<Vec<Category>> =
            send(&mut gateway, ApiRequest::get("/categories").bearer(&token)).await;
        assert_eq!(reply, Reply::Success { data: vec![], message: Some("Categories retrieved successfully".into()) });

        let init = ApiRequest::post("/categories/initialize").bearer(&token);
        assert!(send::<Value>(&mut gateway, init).await.is_success());
        let reply: Reply<Vec<Category>> =
            send(&mut gateway, ApiRequest::get("/categories").bearer(&token)).await;
        assert!(matches!(reply, Reply::Success { data, .. } if data.len() == 12));
    }

    #[tokio::test]
    async fn test_transaction_filters() {
        let mut gateway = TestGateway::default();
        let token = login(&mut gateway);
        let request = ApiRequest::get("/transactions")
            .query(vec![("type".into(), "income".into())])
            .bearer(token);
        let reply: Reply<TransactionList> = send(&mut gateway, request).await;
        assert!(matches!(reply, Reply::Success { data, .. } if data.transactions.len() == 1));
    }

    #[tokio::test]
    async fn test_reports_parse_as_reports() {
        let mut gateway = TestGateway::default();
        let token = login(&mut gateway);
        for query in [
            vec![("year".to_string(), "2025".to_string())],
            vec![
                ("year".to_string(), "2025".to_string()),
                ("month".to_string(), "10".to_string()),
            ],
        ] {
            let request = ApiRequest::get("/reports/monthly")
                .query(query)
                .bearer(&token);
            let reply: Reply<crate::model::RawReport> = send(&mut gateway, request).await;
            let Reply::Success { data, .. } = reply else {
                panic!("report failed")
            };
            let report: Report = data.normalize();
            assert_eq!(report.total_expenses.to_string(), "$222.50");
        }
    }

    #[tokio::test]
    async fn test_fail_next_and_offline() {
        let mut gateway = TestGateway::default();
        let handle = gateway.handle();
        handle.fail_next("/auth/login", "Service unavailable");
        let login = ApiRequest::post("/auth/login")
            .json(&json!({ "email": DEMO_EMAIL, "password": DEMO_PASSWORD }))
            .unwrap();
        let envelope = gateway.send(login.clone()).await.unwrap();
        assert!(!envelope.success);
        assert!(gateway.send(login.clone()).await.unwrap().success);

        handle.set_offline(true);
        assert!(gateway.send(login).await.is_err());
        assert_eq!(handle.calls().len(), 3);
    }
}
