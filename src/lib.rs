pub mod app;
pub mod chart;
pub mod client;
pub mod config;
pub mod controller;
pub mod errors;
pub mod form;
pub mod format;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod state;
pub mod storage;
pub mod table;
pub mod ui;
pub mod units;
pub mod view_state;

pub use app::router;
pub use client::{ClientError, EntryApi, HttpEntryClient};
pub use config::{ClientConfig, ServerConfig};
pub use controller::TrackerController;
pub use state::AppState;
pub use storage::load_data;
