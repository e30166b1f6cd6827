//! Typed calls for every endpoint of the finance API.

use crate::api::{ApiRequest, Gateway, Reply};
use crate::model::{
    AuthData, Budget, Category, Dashboard, NewBudget, NewTransaction, RawReport, Report,
    ReportQuery, Transaction, TransactionFilter, TransactionList, User,
};
use crate::session::Session;
use crate::Result;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Wraps a dynamically-dispatched `Gateway` with one method per endpoint. Calls that need
/// authorization take the `Session` whose credential they send.
pub struct FinanceApi {
    gateway: Box<dyn Gateway>,
}

impl FinanceApi {
    pub fn new(gateway: Box<dyn Gateway>) -> Self {
        Self { gateway }
    }

    async fn call<T: DeserializeOwned>(&mut self, request: ApiRequest) -> Result<Reply<T>> {
        self.gateway.send(request).await?.into_reply()
    }

    async fn call_authorized<T: DeserializeOwned>(
        &mut self,
        session: &Session,
        request: ApiRequest,
    ) -> Result<Reply<T>> {
        self.call(request.bearer(session.credential())).await
    }

    /// `POST /auth/register`
    pub async fn register(
        &mut self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Reply<AuthData>> {
        let body = json!({ "full_name": full_name, "email": email, "password": password });
        self.call(ApiRequest::post("/auth/register").json(&body)?)
            .await
    }

    /// `POST /auth/login`
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Reply<AuthData>> {
        let body = json!({ "email": email, "password": password });
        self.call(ApiRequest::post("/auth/login").json(&body)?).await
    }

    /// `GET /auth/profile`
    pub async fn profile(&mut self, session: &Session) -> Result<Reply<User>> {
        self.call_authorized(session, ApiRequest::get("/auth/profile"))
            .await
    }

    /// `POST /categories/initialize` seeds the default categories of a new account.
    pub async fn initialize_categories(&mut self, session: &Session) -> Result<Reply<Value>> {
        self.call_authorized(session, ApiRequest::post("/categories/initialize"))
            .await
    }

    /// `GET /categories`
    pub async fn categories(&mut self, session: &Session) -> Result<Reply<Vec<Category>>> {
        self.call_authorized(session, ApiRequest::get("/categories"))
            .await
    }

    /// `GET /dashboard`
    pub async fn dashboard(&mut self, session: &Session) -> Result<Reply<Dashboard>> {
        self.call_authorized(session, ApiRequest::get("/dashboard"))
            .await
    }

    /// `GET /transactions`
    pub async fn transactions(
        &mut self,
        session: &Session,
        filter: &TransactionFilter,
    ) -> Result<Reply<Vec<Transaction>>> {
        let request = ApiRequest::get("/transactions").query(filter.query());
        let reply: Reply<TransactionList> = self.call_authorized(session, request).await?;
        Ok(reply.map(|list| list.transactions))
    }

    /// `POST /transactions`
    pub async fn create_transaction(
        &mut self,
        session: &Session,
        transaction: &NewTransaction,
    ) -> Result<Reply<Value>> {
        let request = ApiRequest::post("/transactions").json(transaction)?;
        self.call_authorized(session, request).await
    }

    /// `GET /budgets`
    pub async fn budgets(&mut self, session: &Session) -> Result<Reply<Vec<Budget>>> {
        self.call_authorized(session, ApiRequest::get("/budgets"))
            .await
    }

    /// `POST /budgets`
    pub async fn create_budget(
        &mut self,
        session: &Session,
        budget: &NewBudget,
    ) -> Result<Reply<Value>> {
        let request = ApiRequest::post("/budgets").json(budget)?;
        self.call_authorized(session, request).await
    }

    /// `DELETE /budgets/{id}`
    pub async fn delete_budget(&mut self, session: &Session, id: &str) -> Result<Reply<Value>> {
        let request = ApiRequest::delete(format!("/budgets/{id}"));
        self.call_authorized(session, request).await
    }

    /// `GET /reports/monthly` or `GET /reports/yearly`
    pub async fn report(&mut self, session: &Session, query: &ReportQuery) -> Result<Reply<Report>> {
        let request = ApiRequest::get(query.path()).query(query.query());
        let reply: Reply<RawReport> = self.call_authorized(session, request).await?;
        Ok(reply.map(RawReport::normalize))
    }
}
