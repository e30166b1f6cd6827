//! The presentation side of the client.
//!
//! Renderers turn API records into immutable view records, the `Screen` holds what is currently
//! shown and is changed only through `Screen::apply`, the `Router` decides which section is
//! visible, and the form controllers hold what the user is typing.

mod forms;
mod render;
mod router;
mod screen;

pub use forms::{
    BudgetFields, FormController, FormFields, FormState, ReportFields, TransactionFields,
};
pub use render::{
    budget_category_options, budget_row, category_options, dashboard, report_summary,
    transaction_row, BudgetRow, CategoryLine, CategoryOption, DashboardView, MonthLine,
    ProgressBar, ProgressClass, ReportSummary, StatCard, TransactionRow,
};
pub use router::{Activation, Router, Section};
pub use screen::{Content, Notice, NoticeLevel, Patch, Screen, SectionView, View};
