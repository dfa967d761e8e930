//! Fetch loop — requests daily bars symbol by symbol with progress reporting.
//!
//! Each symbol is fetched independently: a failure or an empty response is
//! recorded in that symbol's `SymbolOutcome` and the loop moves on. Nothing is
//! retried and nothing runs in parallel.

use thiserror::Error;

use super::provider::{BarSource, DataError, FetchProgress, RawBar};
use crate::aggregate::AggregateTable;
use crate::domain::{BarRow, Exchange, Interval};
use crate::session::Session;

/// Number of most-recent bars requested per symbol.
pub const BAR_COUNT: u32 = 1500;

/// Granularity of every request.
pub const INTERVAL: Interval = Interval::Daily;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not logged in: please login first")]
    NotLoggedIn,
}

/// What one symbol's request produced.
#[derive(Debug)]
pub enum SymbolOutcome {
    /// Normalized rows, oldest first. Never empty.
    Bars(Vec<BarRow>),
    NoData,
    Failed(DataError),
}

#[derive(Debug)]
pub struct SymbolReport {
    pub symbol: String,
    pub outcome: SymbolOutcome,
}

impl SymbolReport {
    /// User-facing notice for a symbol that produced no rows.
    pub fn message(&self) -> Option<String> {
        match &self.outcome {
            SymbolOutcome::Bars(_) => None,
            SymbolOutcome::NoData => Some(format!("No data for {}", self.symbol)),
            SymbolOutcome::Failed(e) => Some(format!("Error fetching {}: {e}", self.symbol)),
        }
    }
}

/// Per-symbol outcomes of one fetch invocation, in request order.
#[derive(Debug)]
pub struct FetchReport {
    pub exchange: Exchange,
    pub reports: Vec<SymbolReport>,
}

impl FetchReport {
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, SymbolOutcome::Bars(_)))
    }

    pub fn no_data(&self) -> usize {
        self.count(|o| matches!(o, SymbolOutcome::NoData))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SymbolOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&SymbolOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// Stack every successful symbol's rows; `None` if there are none.
    pub fn into_table(self) -> Option<AggregateTable> {
        AggregateTable::concat(self.reports.into_iter().filter_map(|r| match r.outcome {
            SymbolOutcome::Bars(rows) => Some(rows),
            SymbolOutcome::NoData | SymbolOutcome::Failed(_) => None,
        }))
    }
}

/// Fetch every symbol through the session's client.
///
/// Fails only when the session has no client; per-symbol problems are
/// reported inside the returned `FetchReport`.
pub fn fetch_all<S: AsRef<str>>(
    session: &Session,
    symbols: &[S],
    exchange: Exchange,
    progress: &mut dyn FetchProgress,
) -> Result<FetchReport, FetchError> {
    let source = session.client().ok_or(FetchError::NotLoggedIn)?;
    Ok(fetch_with(source, symbols, exchange, progress))
}

/// Fetch loop over an explicit source.
pub fn fetch_with<S: AsRef<str>>(
    source: &dyn BarSource,
    symbols: &[S],
    exchange: Exchange,
    progress: &mut dyn FetchProgress,
) -> FetchReport {
    let total = symbols.len();
    let mut reports = Vec::with_capacity(total);

    for (i, symbol) in symbols.iter().enumerate() {
        let symbol = symbol.as_ref();
        progress.on_start(symbol, i, total);

        let report = SymbolReport {
            symbol: symbol.to_string(),
            outcome: fetch_symbol(source, symbol, exchange),
        };
        progress.on_outcome(&report, i, total);
        reports.push(report);

        progress.on_progress((i + 1) as f64 / total as f64);
    }

    let report = FetchReport { exchange, reports };
    progress.on_batch_complete(&report);
    report
}

/// Fetch and normalize a single symbol.
pub fn fetch_symbol(source: &dyn BarSource, symbol: &str, exchange: Exchange) -> SymbolOutcome {
    tracing::info!(symbol, %exchange, source = source.name(), bars = BAR_COUNT, "requesting daily bars");

    match source.get_history(symbol, exchange, INTERVAL, BAR_COUNT) {
        Ok(raw) if raw.is_empty() => {
            tracing::warn!(symbol, "provider returned no bars");
            SymbolOutcome::NoData
        }
        Ok(raw) => {
            tracing::debug!(symbol, bars = raw.len(), "fetched");
            SymbolOutcome::Bars(normalize(symbol, raw))
        }
        Err(e) => {
            tracing::warn!(symbol, error = %e, "fetch failed");
            SymbolOutcome::Failed(e)
        }
    }
}

/// Tag provider bars with their symbol, keeping delivery order.
pub fn normalize(symbol: &str, raw: Vec<RawBar>) -> Vec<BarRow> {
    raw.into_iter()
        .map(|b| BarRow {
            symbol: symbol.to_string(),
            date: b.time,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::{synthetic_bars, InMemoryAuthenticator, InMemorySource};

    #[derive(Default)]
    struct Recorder {
        started: Vec<String>,
        fractions: Vec<f64>,
        completed: usize,
    }

    impl FetchProgress for Recorder {
        fn on_start(&mut self, symbol: &str, _index: usize, _total: usize) {
            self.started.push(symbol.to_string());
        }

        fn on_outcome(&mut self, _report: &SymbolReport, _index: usize, _total: usize) {}

        fn on_progress(&mut self, fraction: f64) {
            self.fractions.push(fraction);
        }

        fn on_batch_complete(&mut self, _report: &FetchReport) {
            self.completed += 1;
        }
    }

    fn source() -> InMemorySource {
        InMemorySource::new()
            .with_bars("RELIANCE", synthetic_bars(3))
            .with_empty("EMPTY")
            .with_error("BADTICKER")
    }

    #[test]
    fn requires_login() {
        let session = Session::new();
        let mut rec = Recorder::default();
        let err = fetch_all(&session, &["RELIANCE"], Exchange::Nse, &mut rec).unwrap_err();
        assert!(matches!(err, FetchError::NotLoggedIn));
        assert!(rec.started.is_empty(), "loop must not start without a session");
    }

    #[test]
    fn classifies_each_symbol() {
        let mut rec = Recorder::default();
        let report = fetch_with(
            &source(),
            &["RELIANCE", "EMPTY", "BADTICKER"],
            Exchange::Nse,
            &mut rec,
        );
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.no_data(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(rec.started, vec!["RELIANCE", "EMPTY", "BADTICKER"]);
        assert_eq!(rec.completed, 1);
    }

    #[test]
    fn messages_name_the_symbol() {
        let mut rec = Recorder::default();
        let report = fetch_with(&source(), &["EMPTY", "BADTICKER"], Exchange::Nse, &mut rec);
        assert_eq!(report.reports[0].message().unwrap(), "No data for EMPTY");
        assert!(report.reports[1]
            .message()
            .unwrap()
            .starts_with("Error fetching BADTICKER:"));
    }

    #[test]
    fn progress_reaches_one_even_when_last_fails() {
        let mut rec = Recorder::default();
        fetch_with(&source(), &["RELIANCE", "BADTICKER"], Exchange::Nse, &mut rec);
        assert_eq!(rec.fractions, vec![0.5, 1.0]);
    }

    #[test]
    fn normalize_tags_rows_and_keeps_order() {
        let raw = synthetic_bars(4);
        let rows = normalize("INFY", raw.clone());
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.symbol == "INFY"));
        for (row, bar) in rows.iter().zip(&raw) {
            assert_eq!(row.date, bar.time);
            assert_eq!(row.close, bar.close);
        }
    }

    #[test]
    fn fetch_all_uses_session_client() {
        let auth = InMemoryAuthenticator::new("user", "pw", source());
        let mut session = Session::new();
        session.login(&auth, "user", "pw").unwrap();
        let mut rec = Recorder::default();
        let report = fetch_all(&session, &["RELIANCE"], Exchange::Bse, &mut rec).unwrap();
        assert_eq!(report.exchange, Exchange::Bse);
        assert_eq!(report.succeeded(), 1);
    }

    #[test]
    fn empty_symbol_list_yields_no_table() {
        let mut rec = Recorder::default();
        let symbols: [&str; 0] = [];
        let report = fetch_with(&source(), &symbols, Exchange::Nse, &mut rec);
        assert_eq!(report.total(), 0);
        assert!(rec.fractions.is_empty());
        assert!(report.into_table().is_none());
    }
}
