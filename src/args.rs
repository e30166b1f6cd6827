//! These structs provide the CLI interface for the fin CLI.

use crate::model::{EntryKind, Period, ReportKind};
use crate::ui::Section;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// fin: A command-line client for a personal-finance API.
///
/// Log in once and the credential is kept in the fin home directory. From there you can look at
/// your dashboard, list and add transactions, set budgets and watch how much of them you have
/// spent, and pull monthly or yearly reports.
///
/// Run 'fin init' first to say where the API lives, or pass --api-url to any command. Run
/// 'fin shell' for an interactive session.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the fin home directory and its config file.
    ///
    /// The API base URL is taken from --api-url (or FIN_API_URL) and defaults to
    /// http://localhost:5000/api.
    Init,
    /// Create an account. When the API allows it you are logged in right away.
    Register(RegisterArgs),
    /// Log in and keep the credential for later commands.
    Login(LoginArgs),
    /// Forget the stored credential.
    Logout,
    /// Show who the stored credential belongs to.
    Whoami,
    /// Show one section: dashboard, transactions, budgets or reports.
    Show(ShowArgs),
    /// List or add transactions.
    Transactions(TransactionsArgs),
    /// List, add or delete budgets.
    Budgets(BudgetsArgs),
    /// List the categories of your account.
    Categories(CategoriesArgs),
    /// Show a monthly or yearly report.
    Report(ReportArgs),
    /// Run an interactive session that reads commands from stdin.
    Shell,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where fin keeps its configuration and credential. Defaults to ~/.fin
    #[arg(long, env = "FIN_HOME", default_value_t = default_fin_home())]
    fin_home: DisplayPath,

    /// The base URL of the finance API. Overrides the URL stored in the config file.
    #[arg(long, env = "FIN_API_URL")]
    api_url: Option<String>,
}

impl Common {
    pub fn new(log_level: LevelFilter, fin_home: PathBuf, api_url: Option<String>) -> Self {
        Self {
            log_level,
            fin_home: fin_home.into(),
            api_url,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn fin_home(&self) -> &DisplayPath {
        &self.fin_home
    }

    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }
}

/// Args for the `fin register` command.
#[derive(Debug, Parser, Clone)]
pub struct RegisterArgs {
    /// Your full name.
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long, env = "FIN_PASSWORD", hide_env_values = true)]
    password: String,
}

impl RegisterArgs {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Args for the `fin login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "FIN_PASSWORD", hide_env_values = true)]
    password: String,
}

impl LoginArgs {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Args for the `fin show` command.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// The section to show.
    #[arg(value_enum)]
    section: Section,
}

impl ShowArgs {
    pub fn new(section: Section) -> Self {
        Self { section }
    }

    pub fn section(&self) -> Section {
        self.section
    }
}

/// Args for the `fin transactions` command.
#[derive(Debug, Parser, Clone)]
pub struct TransactionsArgs {
    #[command(subcommand)]
    command: TransactionsCommand,
}

impl TransactionsArgs {
    pub fn command(&self) -> &TransactionsCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum TransactionsCommand {
    /// List transactions, newest first.
    List(ListTransactionsArgs),
    /// Add a transaction.
    Add(AddTransactionArgs),
}

#[derive(Debug, Default, Parser, Clone)]
pub struct ListTransactionsArgs {
    /// Only income or only expenses.
    #[arg(long = "type", value_enum)]
    pub kind: Option<EntryKind>,

    /// Only this category id.
    #[arg(long)]
    pub category: Option<String>,

    /// At most this many transactions.
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Parser, Clone)]
pub struct AddTransactionArgs {
    #[arg(long = "type", value_enum, default_value_t = EntryKind::Expense)]
    pub kind: EntryKind,

    /// The category id, see `fin categories`.
    #[arg(long)]
    pub category: String,

    /// The amount, e.g. 12.50 or $1,200.
    #[arg(long, allow_hyphen_values = true)]
    pub amount: String,

    /// YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

/// Args for the `fin budgets` command.
#[derive(Debug, Parser, Clone)]
pub struct BudgetsArgs {
    #[command(subcommand)]
    command: BudgetsCommand,
}

impl BudgetsArgs {
    pub fn command(&self) -> &BudgetsCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum BudgetsCommand {
    /// List budgets with their progress.
    List,
    /// Set a budget. Without --category it is an overall budget.
    Add(AddBudgetArgs),
    /// Delete a budget by id.
    Delete(DeleteBudgetArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct AddBudgetArgs {
    /// An expense category id. Leave out for an overall budget.
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub amount: String,

    /// Changing the period moves the end date to the end of the start date's month or year.
    #[arg(long, value_enum, default_value_t = Period::Monthly)]
    pub period: Period,

    /// YYYY-MM-DD. Defaults to the first day of this month.
    #[arg(long)]
    pub start: Option<String>,

    /// YYYY-MM-DD. Defaults to the end of the period.
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct DeleteBudgetArgs {
    /// The id shown in brackets by `fin budgets list`.
    pub id: String,
}

/// Args for the `fin categories` command.
#[derive(Debug, Parser, Clone)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    command: CategoriesCommand,
}

impl CategoriesArgs {
    pub fn command(&self) -> &CategoriesCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategoriesCommand {
    /// List categories with their ids. An account without any gets the default set first.
    List,
}

/// Args for the `fin report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// monthly or yearly
    #[arg(value_enum)]
    pub kind: ReportKind,

    /// Defaults to the current year.
    #[arg(long)]
    pub year: Option<i32>,

    /// 1 to 12. Only used by monthly reports; leave out for a month-by-month breakdown.
    #[arg(long)]
    pub month: Option<u32>,
}

fn default_fin_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join(".fin"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --fin-home or FIN_HOME instead of relying on the default \
                fin home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from(".fin")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        <Args as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_parse_add_transaction() {
        let args = Args::try_parse_from([
            "fin",
            "--fin-home",
            "/tmp/fin",
            "transactions",
            "add",
            "--type",
            "income",
            "--category",
            "c1",
            "--amount",
            "$1,200",
        ])
        .unwrap();
        assert_eq!(args.common().fin_home().path(), Path::new("/tmp/fin"));
        let Command::Transactions(t) = args.command() else {
            panic!("wrong command")
        };
        let TransactionsCommand::Add(add) = t.command() else {
            panic!("wrong subcommand")
        };
        assert_eq!(add.kind, EntryKind::Income);
        assert_eq!(add.amount, "$1,200");
        assert!(add.date.is_none());
    }

    #[test]
    fn test_parse_report() {
        let args =
            Args::try_parse_from(["fin", "report", "monthly", "--year", "2024", "--month", "2"])
                .unwrap();
        let Command::Report(report) = args.command() else {
            panic!("wrong command")
        };
        assert_eq!(report.kind, ReportKind::Monthly);
        assert_eq!(report.month, Some(2));
    }

    #[test]
    fn test_parse_show_rejects_unknown_section() {
        assert!(Args::try_parse_from(["fin", "show", "settings"]).is_err());
        assert!(Args::try_parse_from(["fin", "show", "budgets"]).is_ok());
    }
}
