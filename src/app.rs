//! The application: session, router, screen and forms wired to the finance API.
//!
//! Every user action is a method on `App`. Each one runs its steps in order (request, parse,
//! render) and turns both kinds of failure, an envelope with `success: false` and a transport or
//! parse error, into a `Notice` on the screen. Nothing is retried.

use crate::api::{self, FinanceApi, Mode, Reply};
use crate::model::{Category, TransactionFilter, User};
use crate::session::{Hydration, Session, SessionStore};
use crate::ui::{
    self, Activation, BudgetFields, Content, FormController, Notice, Patch, ReportFields, Router,
    Screen, Section, TransactionFields,
};
use crate::{Config, Result};
use chrono::{Local, NaiveDate};
use tracing::{debug, trace};

pub struct App {
    api: FinanceApi,
    store: SessionStore,
    router: Router,
    screen: Screen,
    categories: Vec<Category>,
    filter: TransactionFilter,
    transaction_form: FormController<TransactionFields>,
    budget_form: FormController<BudgetFields>,
    report_form: FormController<ReportFields>,
    today: Option<NaiveDate>,
}

impl App {
    pub fn new(api: FinanceApi, store: SessionStore) -> Self {
        Self {
            api,
            store,
            router: Router::new(),
            screen: Screen::new(),
            categories: Vec::new(),
            filter: TransactionFilter::default(),
            transaction_form: FormController::new(),
            budget_form: FormController::new(),
            report_form: FormController::new(),
            today: None,
        }
    }

    /// Builds the app for a loaded configuration, talking to the API that `mode` selects.
    pub fn from_config(config: &Config, mode: Mode) -> Result<Self> {
        let gateway = api::gateway(config, mode)?;
        Ok(Self::new(
            FinanceApi::new(gateway),
            SessionStore::new(config.credential_path()),
        ))
    }

    /// Pins the date used for form defaults.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn session(&self) -> Option<&Session> {
        self.store.session()
    }

    pub fn active_section(&self) -> Section {
        self.router.active()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.screen.take_notices()
    }

    pub fn transaction_form(&self) -> &FormController<TransactionFields> {
        &self.transaction_form
    }

    pub fn transaction_form_mut(&mut self) -> &mut FormController<TransactionFields> {
        &mut self.transaction_form
    }

    pub fn budget_form(&self) -> &FormController<BudgetFields> {
        &self.budget_form
    }

    pub fn budget_form_mut(&mut self) -> &mut FormController<BudgetFields> {
        &mut self.budget_form
    }

    pub fn report_form(&self) -> &FormController<ReportFields> {
        &self.report_form
    }

    pub fn report_form_mut(&mut self) -> &mut FormController<ReportFields> {
        &mut self.report_form
    }

    fn notify_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        debug!("Error notice: {text}");
        self.screen.apply(Patch::Notify(Notice::error(text)));
    }

    fn notify_info(&mut self, text: impl Into<String>) {
        self.screen.apply(Patch::Notify(Notice::info(text)));
    }

    /// Surfaces a reply that did not succeed and passes a successful one through.
    fn settle<T>(&mut self, result: Result<Reply<T>>, fallback: &str) -> Option<(T, Option<String>)> {
        match result {
            Ok(Reply::Success { data, message }) => Some((data, message)),
            Ok(Reply::Failure { message }) => {
                self.notify_error(message.unwrap_or_else(|| fallback.to_string()));
                None
            }
            Err(e) => {
                self.notify_error(format!("{fallback}: {e:#}"));
                None
            }
        }
    }

    fn require_login(&mut self) -> bool {
        self.notify_error("Please log in first");
        false
    }

    /// Restores a stored session, if there is one, and shows the matching view.
    pub async fn start(&mut self) -> Result<()> {
        match self.store.hydrate(&mut self.api).await? {
            Hydration::Restored(user) => {
                self.enter_main(&user).await;
            }
            Hydration::NoCredential => self.screen.apply(Patch::ShowAuth),
            Hydration::Rejected(message) => {
                self.leave_main();
                self.notify_error(message.unwrap_or_else(|| {
                    "Your session has expired, please log in again".to_string()
                }));
            }
            Hydration::Unreachable(error) => {
                self.leave_main();
                self.notify_error(format!("Unable to connect to server: {error}"));
            }
        }
        Ok(())
    }

    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        let result = self.store.login(&mut self.api, email, password).await;
        let Some((user, _)) = self.settle(result, "Login failed") else {
            return false;
        };
        self.notify_info(format!("Welcome back, {}", user.display_name()));
        self.enter_main(&user).await;
        true
    }

    /// Creates an account. When the API hands back a credential the user is logged in straight
    /// away.
    pub async fn register(&mut self, full_name: &str, email: &str, password: &str) -> bool {
        let result = self
            .store
            .register(&mut self.api, full_name, email, password)
            .await;
        match self.settle(result, "Registration failed") {
            Some((Some(user), _)) => {
                self.notify_info(format!("Welcome, {}", user.display_name()));
                self.enter_main(&user).await;
                true
            }
            Some((None, message)) => {
                self.notify_info(
                    message.unwrap_or_else(|| "Registration successful, please log in".to_string()),
                );
                true
            }
            None => false,
        }
    }

    /// Ends the session and returns to the authentication view.
    pub async fn logout(&mut self) -> bool {
        let removed = self.store.logout().await;
        self.leave_main();
        match removed {
            Ok(()) => {
                self.notify_info("Logged out successfully");
                true
            }
            Err(e) => {
                self.notify_error(format!("Logged out, but the stored credential remains: {e:#}"));
                false
            }
        }
    }

    async fn enter_main(&mut self, user: &User) {
        self.screen.apply(Patch::ShowMain {
            user: user.display_name().to_string(),
        });
        self.activate(Section::Dashboard).await;
    }

    fn leave_main(&mut self) {
        self.router.reset();
        self.transaction_form.cancel();
        self.budget_form.cancel();
        self.report_form.cancel();
        self.categories.clear();
        self.filter = TransactionFilter::default();
        self.screen.apply(Patch::ShowAuth);
    }

    /// Shows `section` alone and, unless it is the reports section, refetches its content.
    pub async fn activate(&mut self, section: Section) -> bool {
        if self.store.session().is_none() {
            return self.require_login();
        }
        let activation = self.router.activate(section);
        self.screen.apply(Patch::Activate(section));
        if section.reloads_on_activate() {
            self.load(activation).await
        } else {
            true
        }
    }

    /// Reloads `section` if it is the one showing.
    pub async fn refresh(&mut self, section: Section) -> bool {
        if self.router.active() != section || !section.reloads_on_activate() {
            return true;
        }
        let activation = self.router.current();
        self.load(activation).await
    }

    /// Filters the transaction list from now on.
    pub async fn set_transaction_filter(&mut self, filter: TransactionFilter) -> bool {
        self.filter = filter;
        self.refresh(Section::Transactions).await
    }

    async fn load(&mut self, activation: Activation) -> bool {
        match self.fetch(activation.section()).await {
            Some(content) => self.commit(activation, content),
            None => false,
        }
    }

    /// Writes fetched content if its activation is still current; otherwise drops it.
    fn commit(&mut self, activation: Activation, content: Content) -> bool {
        if !self.router.is_current(activation) {
            debug!(
                "Discarding stale content for {} (generation {})",
                activation.section(),
                activation.generation()
            );
            return false;
        }
        trace!("Rendering {}", activation.section());
        self.screen
            .apply(Patch::Replace(activation.section(), content));
        true
    }

    async fn fetch(&mut self, section: Section) -> Option<Content> {
        match section {
            Section::Dashboard => self.fetch_dashboard().await,
            Section::Transactions => self.fetch_transactions().await,
            Section::Budgets => self.fetch_budgets().await,
            Section::Reports => None,
        }
    }

    async fn fetch_dashboard(&mut self) -> Option<Content> {
        let Some(session) = self.store.session() else {
            self.require_login();
            return None;
        };
        let result = self.api.dashboard(session).await;
        let (data, _) = self.settle(result, "Failed to load dashboard")?;
        Some(Content::Dashboard(ui::dashboard(&data)))
    }

    async fn fetch_categories(&mut self) -> Option<Vec<Category>> {
        let Some(session) = self.store.session() else {
            self.require_login();
            return None;
        };
        let result = self.api.categories(session).await;
        self.settle(result, "Failed to load categories")
            .map(|(categories, _)| categories)
    }

    /// Loads the categories, seeding the defaults first when the account has none.
    async fn load_categories(&mut self) -> Option<()> {
        let mut categories = self.fetch_categories().await?;
        if categories.is_empty() {
            debug!("The account has no categories, initializing the defaults");
            let Some(session) = self.store.session() else {
                self.require_login();
                return None;
            };
            let result = self.api.initialize_categories(session).await;
            self.settle(result, "Failed to initialize categories")?;
            categories = self.fetch_categories().await?;
        }
        self.categories = categories;
        Some(())
    }

    async fn fetch_transactions(&mut self) -> Option<Content> {
        self.load_categories().await?;
        let Some(session) = self.store.session() else {
            self.require_login();
            return None;
        };
        let result = self.api.transactions(session, &self.filter).await;
        let (transactions, _) = self.settle(result, "Failed to load transactions")?;
        Some(Content::Transactions {
            rows: transactions.iter().map(ui::transaction_row).collect(),
            categories: ui::category_options(&self.categories),
        })
    }

    async fn fetch_budgets(&mut self) -> Option<Content> {
        self.categories = self.fetch_categories().await?;
        let Some(session) = self.store.session() else {
            self.require_login();
            return None;
        };
        let result = self.api.budgets(session).await;
        let (budgets, _) = self.settle(result, "Failed to load budgets")?;
        Some(Content::Budgets {
            rows: budgets.iter().map(ui::budget_row).collect(),
            categories: ui::budget_category_options(&self.categories),
        })
    }

    async fn show(&mut self, section: Section) -> bool {
        if self.router.active() == section && !self.screen.visible_sections().is_empty() {
            return true;
        }
        self.activate(section).await
    }

    /// Opens the add-transaction form, switching to the transactions section first.
    pub async fn open_transaction_form(&mut self) -> bool {
        if !self.show(Section::Transactions).await {
            return false;
        }
        let today = self.today();
        self.transaction_form.open(today);
        true
    }

    pub fn cancel_transaction_form(&mut self) {
        self.transaction_form.cancel();
    }

    pub async fn submit_transaction(&mut self) -> bool {
        let Some(payload) = self.transaction_form.payload() else {
            self.notify_error("The transaction form is not open");
            return false;
        };
        let Some(session) = self.store.session() else {
            return self.require_login();
        };
        debug!("Creating a {} transaction", payload.kind);
        let result = self.api.create_transaction(session, &payload).await;
        let settled = self.settle(result, "Failed to add transaction");
        self.transaction_form.finish(settled.is_some());
        let Some((_, message)) = settled else {
            return false;
        };
        self.notify_info(message.unwrap_or_else(|| "Transaction added successfully".to_string()));
        let listed = self.refresh(Section::Transactions).await;
        self.refresh(Section::Dashboard).await && listed
    }

    /// Opens the add-budget form, switching to the budgets section first.
    pub async fn open_budget_form(&mut self) -> bool {
        if !self.show(Section::Budgets).await {
            return false;
        }
        let today = self.today();
        self.budget_form.open(today);
        true
    }

    pub fn cancel_budget_form(&mut self) {
        self.budget_form.cancel();
    }

    pub async fn submit_budget(&mut self) -> bool {
        let Some(payload) = self.budget_form.payload() else {
            self.notify_error("The budget form is not open");
            return false;
        };
        let Some(session) = self.store.session() else {
            return self.require_login();
        };
        debug!("Creating a {} budget", payload.period);
        let result = self.api.create_budget(session, &payload).await;
        let settled = self.settle(result, "Failed to create budget");
        self.budget_form.finish(settled.is_some());
        let Some((_, message)) = settled else {
            return false;
        };
        self.notify_info(message.unwrap_or_else(|| "Budget created successfully".to_string()));
        self.refresh(Section::Budgets).await
    }

    pub async fn delete_budget(&mut self, id: &str) -> bool {
        let Some(session) = self.store.session() else {
            return self.require_login();
        };
        let result = self.api.delete_budget(session, id).await;
        let Some((_, message)) = self.settle(result, "Failed to delete budget") else {
            return false;
        };
        self.notify_info(message.unwrap_or_else(|| "Budget deleted successfully".to_string()));
        self.refresh(Section::Budgets).await
    }

    /// Opens the report query form, switching to the reports section first.
    pub async fn open_report_form(&mut self) -> bool {
        if !self.show(Section::Reports).await {
            return false;
        }
        let today = self.today();
        self.report_form.open(today);
        true
    }

    pub fn cancel_report_form(&mut self) {
        self.report_form.cancel();
    }

    /// Fetches the report the form describes and renders it into the reports section.
    pub async fn submit_report(&mut self) -> bool {
        let Some(query) = self.report_form.payload() else {
            self.notify_error("The report form is not open");
            return false;
        };
        let activation = self.router.current();
        if activation.section() != Section::Reports {
            debug!(
                "Dropping a report query while {} is showing",
                activation.section()
            );
            self.notify_error("Switch to the reports section to run a report");
            return false;
        }
        let Some(session) = self.store.session() else {
            return self.require_login();
        };
        let result = self.api.report(session, &query).await;
        let settled = self.settle(result, "Failed to load report");
        self.report_form.finish(settled.is_some());
        let Some((report, _)) = settled else {
            return false;
        };
        self.commit(activation, Content::Report(ui::report_summary(&report)))
    }
}
