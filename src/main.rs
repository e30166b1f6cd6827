use clap::Parser;
use fin::args::{
    Args, BudgetsCommand, CategoriesCommand, Command, Common, TransactionsCommand,
};
use fin::{commands, Config, Mode, Result, DEFAULT_API_URL};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().fin_home().path();

    // With FIN_IN_TEST_MODE set and non-empty the program talks to an in-memory API instead of
    // the one in the config file.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init => {
            let api_url = args.common().api_url().unwrap_or(DEFAULT_API_URL);
            commands::init(home, api_url).await?.print()
        }

        Command::Register(register_args) => {
            let config = load_config(args.common()).await?;
            commands::register(&config, mode, register_args)
                .await?
                .print()
        }

        Command::Login(login_args) => {
            let config = load_config(args.common()).await?;
            commands::login(&config, mode, login_args).await?.print()
        }

        Command::Logout => {
            let config = load_config(args.common()).await?;
            commands::logout(&config, mode).await?.print()
        }

        Command::Whoami => {
            let config = load_config(args.common()).await?;
            commands::whoami(&config, mode).await?.print()
        }

        Command::Show(show_args) => {
            let config = load_config(args.common()).await?;
            commands::show(&config, mode, show_args.section())
                .await?
                .print()
        }

        Command::Transactions(transactions_args) => {
            let config = load_config(args.common()).await?;
            match transactions_args.command() {
                TransactionsCommand::List(list_args) => {
                    commands::list_transactions(&config, mode, list_args)
                        .await?
                        .print()
                }
                TransactionsCommand::Add(add_args) => {
                    commands::add_transaction(&config, mode, add_args)
                        .await?
                        .print()
                }
            }
        }

        Command::Budgets(budgets_args) => {
            let config = load_config(args.common()).await?;
            match budgets_args.command() {
                BudgetsCommand::List => commands::list_budgets(&config, mode).await?.print(),
                BudgetsCommand::Add(add_args) => commands::add_budget(&config, mode, add_args)
                    .await?
                    .print(),
                BudgetsCommand::Delete(delete_args) => {
                    commands::delete_budget(&config, mode, &delete_args.id)
                        .await?
                        .print()
                }
            }
        }

        Command::Categories(categories_args) => {
            let config = load_config(args.common()).await?;
            match categories_args.command() {
                CategoriesCommand::List => commands::categories(&config, mode).await?.print(),
            }
        }

        Command::Report(report_args) => {
            let config = load_config(args.common()).await?;
            commands::report(&config, mode, report_args).await?.print()
        }

        Command::Shell => {
            let config = load_config(args.common()).await?;
            commands::shell(&config, mode).await?.print()
        }
    };
    Ok(())
}

/// Loads the config from the fin home directory, applying --api-url when it was given.
async fn load_config(common: &Common) -> Result<Config> {
    let config = Config::load(common.fin_home().path()).await?;
    match common.api_url() {
        Some(api_url) => config.with_api_url(api_url),
        None => Ok(config),
    }
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
