//! An interactive session over stdin and stdout. It keeps one `App` alive, so unlike the one-shot
//! commands the forms, the transaction filter and the active section carry over between lines.

use crate::commands::Out;
use crate::ui::{FormController, FormFields, Notice, Section};
use crate::{App, Config, Mode, Result};
use anyhow::{anyhow, bail, Context};
use std::fmt::Write as _;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  login <email> <password>
  register <email> <password> <full name>
  logout
  show dashboard|transactions|budgets|reports
  open transaction|budget|report    open a form, switching to its section
  set <field> <value>               set a field of the open form
  submit                            submit the open form
  cancel                            close the open form
  delete <budget id>
  screen                            print the screen again
  help
  quit
";

/// The forms the shell can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Transaction,
    Budget,
    Report,
}

impl FromStr for FormKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "transaction" | "transactions" => FormKind::Transaction,
            "budget" | "budgets" => FormKind::Budget,
            "report" | "reports" => FormKind::Report,
            other => bail!("There is no '{other}' form, try transaction, budget or report"),
        })
    }
}

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Login { email: String, password: String },
    Register { email: String, password: String, full_name: String },
    Logout,
    Show(Section),
    Open(FormKind),
    Set { field: String, value: String },
    Submit,
    Cancel,
    Delete(String),
    Screen,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = split_word(line);
        let rest_words: Vec<&str> = rest.split_whitespace().collect();
        Ok(match (word.to_lowercase().as_str(), rest_words.as_slice()) {
            ("help" | "?", _) => ShellCommand::Help,
            ("quit" | "exit", _) => ShellCommand::Quit,
            ("login", [email, password]) => ShellCommand::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("register", [email, password, name @ ..]) if !name.is_empty() => {
                ShellCommand::Register {
                    email: email.to_string(),
                    password: password.to_string(),
                    full_name: name.join(" "),
                }
            }
            ("logout", []) => ShellCommand::Logout,
            ("show", [section]) => ShellCommand::Show(
                section
                    .parse()
                    .map_err(|_| anyhow!("There is no '{section}' section"))?,
            ),
            ("open", [form]) => ShellCommand::Open(form.parse()?),
            ("set", [_, ..]) => {
                let (field, value) = split_word(rest);
                ShellCommand::Set {
                    field: field.to_string(),
                    value: value.to_string(),
                }
            }
            ("submit", []) => ShellCommand::Submit,
            ("cancel", []) => ShellCommand::Cancel,
            ("delete", [id]) => ShellCommand::Delete(id.to_string()),
            ("screen", []) => ShellCommand::Screen,
            ("", _) => bail!("Type a command, or 'help'"),
            (other, _) => bail!("Unknown or incomplete command '{other}', type 'help'"),
        })
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

/// Runs the interactive shell on stdin and stdout until 'quit' or end of input.
pub async fn shell(config: &Config, mode: Mode) -> Result<Out<()>> {
    let mut app = App::from_config(config, mode)?;
    app.start().await?;
    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();
    let lines = run(&mut app, input, output).await?;
    Ok(format!("Shell closed after {lines} commands").into())
}

/// Reads commands from `input` and writes what they produce to `output`. Returns the number of
/// commands run.
pub(crate) async fn run<R, W>(app: &mut App, input: R, mut output: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut count = 0;
    write(&mut output, &report(app, true)).await?;
    write(&mut output, "> ").await?;
    let mut lines = input.lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Unable to read from stdin")?
    {
        if line.trim().is_empty() {
            write(&mut output, "> ").await?;
            continue;
        }
        let text = match line.parse::<ShellCommand>() {
            Ok(ShellCommand::Quit) => break,
            Ok(command) => {
                count += 1;
                debug!("Shell command: {command:?}");
                execute(app, command).await
            }
            Err(e) => format!("{e}\n"),
        };
        write(&mut output, &text).await?;
        write(&mut output, "> ").await?;
    }
    write(&mut output, "\n").await?;
    Ok(count)
}

async fn write<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(text.as_bytes())
        .await
        .context("Unable to write to stdout")?;
    output.flush().await.context("Unable to write to stdout")
}

/// Runs one command and returns the text to show for it.
pub(crate) async fn execute(app: &mut App, command: ShellCommand) -> String {
    match command {
        ShellCommand::Help => HELP.to_string(),
        ShellCommand::Quit => String::new(),
        ShellCommand::Screen => report(app, true),
        ShellCommand::Login { email, password } => {
            app.login(&email, &password).await;
            report(app, true)
        }
        ShellCommand::Register {
            email,
            password,
            full_name,
        } => {
            app.register(&full_name, &email, &password).await;
            report(app, true)
        }
        ShellCommand::Logout => {
            app.logout().await;
            report(app, true)
        }
        ShellCommand::Show(section) => {
            app.activate(section).await;
            report(app, true)
        }
        ShellCommand::Open(kind) => {
            let opened = match kind {
                FormKind::Transaction => app.open_transaction_form().await,
                FormKind::Budget => app.open_budget_form().await,
                FormKind::Report => app.open_report_form().await,
            };
            let mut text = report(app, opened);
            if opened {
                let names = match kind {
                    FormKind::Transaction => form_names(app.transaction_form()),
                    FormKind::Budget => form_names(app.budget_form()),
                    FormKind::Report => form_names(app.report_form()),
                };
                let _ = writeln!(text, "Form open. Fields: {names}");
            }
            text
        }
        ShellCommand::Set { field, value } => {
            let result = match open_form(app) {
                Some(FormKind::Transaction) => app.transaction_form_mut().set(&field, &value),
                Some(FormKind::Budget) => app.budget_form_mut().set(&field, &value),
                Some(FormKind::Report) => app.report_form_mut().set(&field, &value),
                None => Err(anyhow!("No form is open, use 'open' first")),
            };
            match result {
                Ok(()) => format!("{field} = {value}\n"),
                Err(e) => format!("{e}\n"),
            }
        }
        ShellCommand::Submit => {
            let submitted = match open_form(app) {
                Some(FormKind::Transaction) => app.submit_transaction().await,
                Some(FormKind::Budget) => app.submit_budget().await,
                Some(FormKind::Report) => app.submit_report().await,
                None => return "No form is open, use 'open' first\n".to_string(),
            };
            report(app, submitted)
        }
        ShellCommand::Cancel => match open_form(app) {
            Some(FormKind::Transaction) => {
                app.cancel_transaction_form();
                "Cancelled\n".to_string()
            }
            Some(FormKind::Budget) => {
                app.cancel_budget_form();
                "Cancelled\n".to_string()
            }
            Some(FormKind::Report) => {
                app.cancel_report_form();
                "Cancelled\n".to_string()
            }
            None => "No form is open\n".to_string(),
        },
        ShellCommand::Delete(id) => {
            let deleted = app.delete_budget(&id).await;
            report(app, deleted)
        }
    }
}

fn form_names<F: FormFields>(_form: &FormController<F>) -> String {
    F::NAMES.join(", ")
}

/// The visible form belonging to the active section.
fn open_form(app: &App) -> Option<FormKind> {
    match app.active_section() {
        Section::Transactions if app.transaction_form().is_visible() => {
            Some(FormKind::Transaction)
        }
        Section::Budgets if app.budget_form().is_visible() => Some(FormKind::Budget),
        Section::Reports if app.report_form().is_visible() => Some(FormKind::Report),
        _ => None,
    }
}

/// Notices first, then the screen when `with_screen` is set.
fn report(app: &mut App, with_screen: bool) -> String {
    let mut text = String::new();
    for notice in app.take_notices() {
        text.push_str(&notice_line(&notice));
    }
    if with_screen {
        text.push_str(&app.screen().to_string());
    }
    text
}

fn notice_line(notice: &Notice) -> String {
    if notice.is_error() {
        format!("! {}\n", notice.text)
    } else {
        format!("* {}\n", notice.text)
    }
}
