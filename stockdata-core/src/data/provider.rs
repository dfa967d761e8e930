//! Provider traits and structured error types.
//!
//! `Authenticator` turns credentials into a `BarSource`; the session keeps that
//! source and the fetch loop reads bars from it. Both are traits so the
//! TradingView client can be swapped for the in-memory one in tests.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::fetch::{FetchReport, SymbolOutcome, SymbolReport};
use crate::domain::{Exchange, Interval};

/// Raw OHLCV bar from a provider, before it is tagged with its symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Structured error types for provider operations.
///
/// These are designed to be displayable in both CLI and TUI contexts.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Authenticated market-data client.
pub trait BarSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the `n_bars` most recent bars for `symbol` on `exchange`,
    /// oldest first. An empty vec means the provider had no data.
    fn get_history(
        &self,
        symbol: &str,
        exchange: Exchange,
        interval: Interval,
        n_bars: u32,
    ) -> Result<Vec<RawBar>, DataError>;
}

/// Credential check that yields an authenticated client.
pub trait Authenticator {
    /// Exchange credentials for a client. Inputs are passed through
    /// unvalidated; the implementation decides what it accepts.
    fn authenticate(&self, username: &str, password: &str)
        -> Result<Box<dyn BarSource>, DataError>;
}

/// Progress callback for the multi-symbol fetch loop.
pub trait FetchProgress {
    /// Called before a symbol is requested.
    fn on_start(&mut self, _symbol: &str, _index: usize, _total: usize) {}

    /// Called with each symbol's outcome, in request order.
    fn on_outcome(&mut self, report: &SymbolReport, index: usize, total: usize);

    /// Called after every symbol with `completed / total`.
    fn on_progress(&mut self, fraction: f64);

    /// Called once after the last symbol.
    fn on_batch_complete(&mut self, _report: &FetchReport) {}
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_start(&mut self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_outcome(&mut self, report: &SymbolReport, _index: usize, _total: usize) {
        match &report.outcome {
            SymbolOutcome::Bars(rows) => println!("  OK: {} ({} bars)", report.symbol, rows.len()),
            SymbolOutcome::NoData => println!("  WARN: No data for {}", report.symbol),
            SymbolOutcome::Failed(e) => println!("  FAIL: Error fetching {}: {e}", report.symbol),
        }
    }

    fn on_progress(&mut self, fraction: f64) {
        println!("  progress: {:.0}%", fraction * 100.0);
    }

    fn on_batch_complete(&mut self, report: &FetchReport) {
        println!(
            "\nFetch complete: {} with data, {} empty, {} failed ({} symbols)",
            report.succeeded(),
            report.no_data(),
            report.failed(),
            report.total()
        );
    }
}
