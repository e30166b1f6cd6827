//! Command handlers for the fin CLI.
//!
//! Every handler drives an `App` the same way the interactive shell does and hands back an `Out`
//! with what should be printed.

mod auth;
mod init;
mod sections;
mod shell;

use crate::ui::Notice;
use crate::{App, Config, Mode, Result};
use anyhow::bail;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

pub use auth::{login, logout, register, whoami};
pub use init::init;
pub use sections::{
    add_budget, add_transaction, categories, delete_budget, list_budgets, list_transactions,
    report, show,
};
pub use shell::{shell, FormKind, ShellCommand};

/// The output type for a command: a message for the log, optionally structured data, and
/// optionally the rendered screen text that goes to stdout.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,

    /// Text for stdout, usually the rendered screen.
    view: Option<String>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
            view: None,
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
            view: None,
        }
    }

    /// Attach text that `print` writes to stdout.
    pub fn with_view(mut self, view: impl ToString) -> Self {
        self.view = Some(view.to_string());
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    pub fn view(&self) -> Option<&str> {
        self.view.as_deref()
    }

    /// Print the message to `info!`, the structured data (if it exists) as JSON to `debug!` and
    /// the view (if it exists) to stdout.
    pub fn print(&self) {
        if let Some(view) = self.view() {
            print!("{view}");
        }
        if !self.message.is_empty() {
            info!("{}", self.message);
        }
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Builds an app from the config and restores the stored session, if any.
async fn start(config: &Config, mode: Mode) -> Result<App> {
    let mut app = App::from_config(config, mode)?;
    app.start().await?;
    for notice in app.take_notices() {
        log_notice(&notice);
    }
    Ok(app)
}

/// Like `start`, but fails unless the restored session is valid.
async fn start_logged_in(config: &Config, mode: Mode) -> Result<App> {
    let app = start(config, mode).await?;
    if app.session().is_none() {
        bail!("You are not logged in, run 'fin login' first");
    }
    Ok(app)
}

fn log_notice(notice: &Notice) {
    if notice.is_error() {
        warn!("{}", notice.text);
    } else {
        info!("{}", notice.text);
    }
}

/// Drains the app's notices. When `ok` is false the error notices become the command's error.
fn settle(app: &mut App, ok: bool) -> Result<()> {
    let notices = app.take_notices();
    if ok {
        notices.iter().for_each(log_notice);
        return Ok(());
    }
    let mut errors = Vec::new();
    for notice in notices {
        if notice.is_error() {
            errors.push(notice.text);
        } else {
            info!("{}", notice.text);
        }
    }
    if errors.is_empty() {
        bail!("The command did not complete");
    }
    bail!("{}", errors.join("; "))
}
