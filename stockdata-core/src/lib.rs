//! StockData Core — login, daily-bar fetching, aggregation, and export.
//!
//! This crate contains everything except the front-ends:
//! - Domain types (exchanges, bar rows)
//! - Symbol list parsing
//! - Session holder for the authenticated provider client
//! - Sequential fetch loop with per-symbol outcomes and progress reporting
//! - Aggregate table and the XLSX/CSV encoders
//! - TradingView provider (sign-in over HTTP, bars over WebSocket)
//! - TOML configuration

pub mod aggregate;
pub mod config;
pub mod data;
pub mod domain;
pub mod export;
pub mod session;
pub mod symbols;

pub use aggregate::AggregateTable;
pub use config::{AppConfig, ConfigError};
pub use data::fetch::{fetch_all, FetchError, FetchReport, SymbolOutcome, SymbolReport};
pub use data::provider::{Authenticator, BarSource, DataError, FetchProgress, RawBar};
pub use domain::{BarRow, Exchange, Interval};
pub use export::{ExportArtifact, ExportError, ExportFormat, TableEncoder};
pub use session::Session;
pub use symbols::parse_symbols;
