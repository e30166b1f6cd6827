//! fin is a client for a personal-finance REST API. It keeps a session, routes between the
//! dashboard, transactions, budgets and reports sections, and renders what the API returns into
//! a declarative `ui::Screen` that the CLI prints.

pub mod api;
mod app;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod session;
pub mod ui;
mod utils;


pub use api::Mode;
pub use app::App;
pub use config::{Config, DEFAULT_API_URL};
pub use error::Error;
pub use error::Result;
