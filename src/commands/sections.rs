//! One-shot commands for the sections of the main view. Each restores the stored session, does
//! what the user would do on screen and prints the screen that results.

use crate::args::{AddBudgetArgs, AddTransactionArgs, ListTransactionsArgs, ReportArgs};
use crate::commands::{settle, start_logged_in, Out};
use crate::model::{Category, TransactionFilter};
use crate::ui::{Content, FormController, FormFields, Section};
use crate::{App, Config, Mode, Result};

/// Shows one section. The reports section stays empty until a report is requested, so this
/// prints only its heading.
pub async fn show(config: &Config, mode: Mode, section: Section) -> Result<Out<Content>> {
    let mut app = start_logged_in(config, mode).await?;
    let ok = app.activate(section).await;
    settle(&mut app, ok)?;
    Ok(finish(&app, section))
}

pub async fn list_transactions(
    config: &Config,
    mode: Mode,
    args: &ListTransactionsArgs,
) -> Result<Out<Content>> {
    let mut app = start_logged_in(config, mode).await?;
    app.set_transaction_filter(TransactionFilter {
        kind: args.kind,
        category_id: args.category.clone(),
        limit: args.limit,
    })
    .await;
    let ok = app.activate(Section::Transactions).await;
    settle(&mut app, ok)?;
    Ok(finish(&app, Section::Transactions))
}

/// Fills in the add-transaction form and submits it.
pub async fn add_transaction(
    config: &Config,
    mode: Mode,
    args: &AddTransactionArgs,
) -> Result<Out<Content>> {
    let mut app = start_logged_in(config, mode).await?;
    let opened = app.open_transaction_form().await;
    settle(&mut app, opened)?;
    let mut fields = vec![
        ("type", args.kind.to_string()),
        ("category", args.category.clone()),
        ("amount", args.amount.clone()),
    ];
    if let Some(date) = &args.date {
        fields.push(("date", date.clone()));
    }
    if let Some(description) = &args.description {
        fields.push(("description", description.clone()));
    }
    fill(app.transaction_form_mut(), &fields)?;
    let ok = app.submit_transaction().await;
    settle(&mut app, ok)?;
    Ok(finish(&app, Section::Transactions))
}

pub async fn list_budgets(config: &Config, mode: Mode) -> Result<Out<Content>> {
    show(config, mode, Section::Budgets).await
}

/// Fills in the add-budget form and submits it. The start date goes in before the period so
/// that the period can move the end date.
pub async fn add_budget(config: &Config, mode: Mode, args: &AddBudgetArgs) -> Result<Out<Content>> {
    let mut app = start_logged_in(config, mode).await?;
    let opened = app.open_budget_form().await;
    settle(&mut app, opened)?;
    let mut fields = Vec::new();
    if let Some(category) = &args.category {
        fields.push(("category", category.clone()));
    }
    fields.push(("amount", args.amount.clone()));
    if let Some(start) = &args.start {
        fields.push(("start", start.clone()));
    }
    fields.push(("period", args.period.to_string()));
    if let Some(end) = &args.end {
        fields.push(("end", end.clone()));
    }
    fill(app.budget_form_mut(), &fields)?;
    let ok = app.submit_budget().await;
    settle(&mut app, ok)?;
    Ok(finish(&app, Section::Budgets))
}

pub async fn delete_budget(config: &Config, mode: Mode, id: &str) -> Result<Out<Content>> {
    let mut app = start_logged_in(config, mode).await?;
    let shown = app.activate(Section::Budgets).await;
    settle(&mut app, shown)?;
    let ok = app.delete_budget(id).await;
    settle(&mut app, ok)?;
    Ok(finish(&app, Section::Budgets))
}

/// Lists the account's categories with their ids, seeding the defaults when there are none.
pub async fn categories(config: &Config, mode: Mode) -> Result<Out<Vec<Category>>> {
    let mut app = start_logged_in(config, mode).await?;
    let ok = app.activate(Section::Transactions).await;
    settle(&mut app, ok)?;
    let categories = app.categories().to_vec();
    let view: String = categories
        .iter()
        .map(|c| format!("  {:<24} {:<8} [{}]\n", c.name, c.kind, c.id))
        .collect();
    Ok(Out::new(format!("{} categories", categories.len()), categories).with_view(view))
}

/// Fills in the report form and submits it.
pub async fn report(config: &Config, mode: Mode, args: &ReportArgs) -> Result<Out<Content>> {
    let mut app = start_logged_in(config, mode).await?;
    let opened = app.open_report_form().await;
    settle(&mut app, opened)?;
    let mut fields = vec![("kind", args.kind.to_string())];
    if let Some(year) = args.year {
        fields.push(("year", year.to_string()));
    }
    if let Some(month) = args.month {
        fields.push(("month", month.to_string()));
    }
    fill(app.report_form_mut(), &fields)?;
    let ok = app.submit_report().await;
    settle(&mut app, ok)?;
    Ok(finish(&app, Section::Reports))
}

fn fill<F: FormFields>(form: &mut FormController<F>, fields: &[(&str, String)]) -> Result<()> {
    for (name, value) in fields {
        form.set(name, value)?;
    }
    Ok(())
}

fn finish(app: &App, section: Section) -> Out<Content> {
    let content = app.screen().content(section).clone();
    Out::new("", content).with_view(app.screen())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DEMO_EMAIL, DEMO_PASSWORD};
    use crate::args::LoginArgs;
    use crate::commands::login;
    use crate::model::{EntryKind, Period, ReportKind};
    use crate::test::TestEnv;

    async fn logged_in() -> (TestEnv, Config) {
        let env = TestEnv::new().await;
        let config = env.config();
        login(&config, Mode::Test, &LoginArgs::new(DEMO_EMAIL, DEMO_PASSWORD))
            .await
            .unwrap();
        (env, config)
    }

    #[tokio::test]
    async fn test_sections_need_login() {
        let env = TestEnv::new().await;
        let err = show(&env.config(), Mode::Test, Section::Dashboard)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("fin login"));
    }

    #[tokio::test]
    async fn test_show_dashboard() {
        let (_env, config) = logged_in().await;
        let out = show(&config, Mode::Test, Section::Dashboard).await.unwrap();
        let view = out.view().unwrap();
        assert!(view.contains("== Dashboard =="));
        assert!(view.contains("$2777.50"));
    }

    #[tokio::test]
    async fn test_list_transactions_filtered() {
        let (_env, config) = logged_in().await;
        let args = ListTransactionsArgs {
            kind: Some(EntryKind::Income),
            ..Default::default()
        };
        let out = list_transactions(&config, Mode::Test, &args).await.unwrap();
        let Some(Content::Transactions { rows, .. }) = out.structure() else {
            panic!("transactions not rendered")
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, "+$3000.00");
    }

    #[tokio::test]
    async fn test_add_transaction_shows_new_row() {
        let (_env, config) = logged_in().await;
        let args = AddTransactionArgs {
            kind: EntryKind::Expense,
            category: "c8".to_string(),
            amount: "15.25".to_string(),
            date: Some("2025-10-12".to_string()),
            description: Some("Cinema".to_string()),
        };
        let out = add_transaction(&config, Mode::Test, &args).await.unwrap();
        assert!(out.view().unwrap().contains("Cinema"));
    }

    #[tokio::test]
    async fn test_add_transaction_rejected() {
        let (_env, config) = logged_in().await;
        let args = AddTransactionArgs {
            kind: EntryKind::Expense,
            category: "c8".to_string(),
            amount: "0".to_string(),
            date: None,
            description: None,
        };
        let err = add_transaction(&config, Mode::Test, &args)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Amount must be greater than 0"));
    }

    #[tokio::test]
    async fn test_add_budget_shows_progress() {
        let (_env, config) = logged_in().await;
        let args = AddBudgetArgs {
            category: Some("c5".to_string()),
            amount: "50".to_string(),
            period: Period::Monthly,
            start: Some("2025-10-01".to_string()),
            end: None,
        };
        let out = add_budget(&config, Mode::Test, &args).await.unwrap();
        let Some(Content::Budgets { rows, .. }) = out.structure() else {
            panic!("budgets not rendered")
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spent, "$42.50 of $50.00 spent");
        assert_eq!(rows[0].period, "monthly • Oct 1, 2025 - Oct 31, 2025");
    }

    #[tokio::test]
    async fn test_delete_unknown_budget() {
        let (_env, config) = logged_in().await;
        let err = delete_budget(&config, Mode::Test, "nope").await.unwrap_err();
        assert!(err.to_string().contains("Budget not found"));
    }

    #[tokio::test]
    async fn test_categories_lists_defaults() {
        let (_env, config) = logged_in().await;
        let out = categories(&config, Mode::Test).await.unwrap();
        assert_eq!(out.structure().unwrap().len(), 12);
        assert!(out.view().unwrap().contains("[c5]"));
    }

    #[tokio::test]
    async fn test_yearly_report() {
        let (_env, config) = logged_in().await;
        let args = ReportArgs {
            kind: ReportKind::Yearly,
            year: Some(2025),
            month: None,
        };
        let out = report(&config, Mode::Test, &args).await.unwrap();
        let Some(Content::Report(summary)) = out.structure() else {
            panic!("report not rendered")
        };
        assert_eq!(summary.title, "2025");
    }
}
