//! In-memory provider with scripted per-symbol responses.
//!
//! Used by the test suites of every crate in place of the TradingView client.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::provider::{Authenticator, BarSource, DataError, RawBar};
use crate::domain::{Exchange, Interval};

#[derive(Debug, Clone)]
enum Scripted {
    Bars(Vec<RawBar>),
    Empty,
    Error(String),
}

/// Bar source answering from a fixed script.
///
/// Symbols without a script entry fail with `SymbolNotFound`.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    script: HashMap<String, Scripted>,
    requests: Arc<Mutex<Vec<(String, Exchange, u32)>>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<RawBar>) -> Self {
        self.script.insert(symbol.to_string(), Scripted::Bars(bars));
        self
    }

    pub fn with_empty(mut self, symbol: &str) -> Self {
        self.script.insert(symbol.to_string(), Scripted::Empty);
        self
    }

    pub fn with_error(mut self, symbol: &str) -> Self {
        self.script.insert(
            symbol.to_string(),
            Scripted::Error(format!("connection reset while fetching {symbol}")),
        );
        self
    }

    /// Every `(symbol, exchange, n_bars)` requested so far, in call order.
    /// Clones share one log.
    pub fn requests(&self) -> Vec<(String, Exchange, u32)> {
        self.requests.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

impl BarSource for InMemorySource {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn get_history(
        &self,
        symbol: &str,
        exchange: Exchange,
        _interval: Interval,
        n_bars: u32,
    ) -> Result<Vec<RawBar>, DataError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push((symbol.to_string(), exchange, n_bars));
        }

        match self.script.get(symbol) {
            Some(Scripted::Bars(bars)) => {
                let skip = bars.len().saturating_sub(n_bars as usize);
                Ok(bars[skip..].to_vec())
            }
            Some(Scripted::Empty) => Ok(Vec::new()),
            Some(Scripted::Error(msg)) => Err(DataError::NetworkUnreachable(msg.clone())),
            None => Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            }),
        }
    }
}

/// Authenticator accepting exactly one username/password pair.
#[derive(Debug, Clone)]
pub struct InMemoryAuthenticator {
    username: String,
    password: String,
    source: InMemorySource,
}

impl InMemoryAuthenticator {
    pub fn new(username: &str, password: &str, source: InMemorySource) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            source,
        }
    }
}

impl Authenticator for InMemoryAuthenticator {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn BarSource>, DataError> {
        if username == self.username && password == self.password {
            Ok(Box::new(self.source.clone()))
        } else {
            Err(DataError::AuthenticationFailed(
                "Invalid username or password".into(),
            ))
        }
    }
}

/// `n` consecutive daily bars starting 2024-01-01 09:15, oldest first.
pub fn synthetic_bars(n: usize) -> Vec<RawBar> {
    let start: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 15, 0))
        .unwrap_or_default();

    (0..n)
        .map(|i| {
            let base = 100.0 + i as f64;
            RawBar {
                time: start + Duration::days(i as i64),
                open: base,
                high: base + 2.5,
                low: base - 1.5,
                close: base + 1.0,
                volume: 10_000.0 + (i as f64) * 100.0,
            }
        })
        .collect()
}
