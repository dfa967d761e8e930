//! End-to-end pipeline: login, fetch, aggregate, encode — against the
//! in-memory provider.

use chrono::NaiveDate;
use stockdata_core::data::fetch::BAR_COUNT;
use stockdata_core::data::{synthetic_bars, InMemoryAuthenticator, InMemorySource};
use stockdata_core::export::{encode_all, ExportFormat};
use stockdata_core::{
    fetch_all, parse_symbols, AppConfig, DataError, Exchange, FetchError, FetchProgress,
    FetchReport, Session, SymbolOutcome, SymbolReport,
};

/// Collects every callback so tests can assert on the sequence.
#[derive(Default)]
struct Log {
    lines: Vec<String>,
    fractions: Vec<f64>,
}

impl FetchProgress for Log {
    fn on_start(&mut self, symbol: &str, index: usize, total: usize) {
        self.lines.push(format!("{}/{total} {symbol}", index + 1));
    }

    fn on_outcome(&mut self, report: &SymbolReport, _index: usize, _total: usize) {
        if let Some(msg) = report.message() {
            self.lines.push(msg);
        }
    }

    fn on_progress(&mut self, fraction: f64) {
        self.fractions.push(fraction);
    }

    fn on_batch_complete(&mut self, report: &FetchReport) {
        self.lines.push(format!("done {}", report.total()));
    }
}

fn logged_in(source: InMemorySource) -> Session {
    let auth = InMemoryAuthenticator::new("trader", "secret", source);
    let mut session = Session::new();
    session.login(&auth, "trader", "secret").unwrap();
    session
}

#[test]
fn two_symbols_stack_in_request_order() {
    let source = InMemorySource::new()
        .with_bars("A", synthetic_bars(3))
        .with_bars("B", synthetic_bars(5));
    let session = logged_in(source);
    let mut log = Log::default();

    let symbols = parse_symbols("A,B");
    let report = fetch_all(&session, &symbols, Exchange::Nse, &mut log).unwrap();
    let table = report.into_table().unwrap();

    assert_eq!(table.len(), 8);
    let symbols: Vec<&str> = table.rows().iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["A", "A", "A", "B", "B", "B", "B", "B"]);
    assert_eq!(log.fractions, vec![0.5, 1.0]);
}

#[test]
fn failing_symbol_does_not_stop_the_batch() {
    let source = InMemorySource::new()
        .with_bars("RELIANCE", synthetic_bars(4))
        .with_bars("TCS", synthetic_bars(2));
    let session = logged_in(source);
    let mut log = Log::default();

    let symbols = parse_symbols("RELIANCE, BADTICKER, TCS");
    let report = fetch_all(&session, &symbols, Exchange::Nse, &mut log).unwrap();

    assert_eq!(report.total(), 3);
    assert!(matches!(
        &report.reports[1].outcome,
        SymbolOutcome::Failed(DataError::SymbolNotFound { symbol }) if symbol == "BADTICKER"
    ));
    assert_eq!(
        log.lines,
        vec![
            "1/3 RELIANCE".to_string(),
            "2/3 BADTICKER".to_string(),
            "Error fetching BADTICKER: symbol not found: BADTICKER".to_string(),
            "3/3 TCS".to_string(),
            "done 3".to_string(),
        ]
    );

    let table = report.into_table().unwrap();
    assert_eq!(table.len(), 6);
    assert!(table.rows().iter().all(|r| r.symbol != "BADTICKER"));
}

#[test]
fn all_failures_leave_nothing_to_export() {
    let source = InMemorySource::new().with_empty("EMPTY").with_error("DOWN");
    let session = logged_in(source);
    let mut log = Log::default();

    let report = fetch_all(&session, &["EMPTY", "DOWN"], Exchange::Bse, &mut log).unwrap();
    assert_eq!(report.no_data(), 1);
    assert_eq!(report.failed(), 1);
    assert!(log.lines.contains(&"No data for EMPTY".to_string()));
    assert!(report.into_table().is_none());
}

#[test]
fn every_request_asks_for_the_fixed_bar_count() {
    let source = InMemorySource::new()
        .with_bars("INFY", synthetic_bars(2000))
        .with_bars("TCS", synthetic_bars(10));
    let recorder = source.clone();
    let session = logged_in(source);
    let mut log = Log::default();

    let report = fetch_all(&session, &["INFY", "TCS"], Exchange::Bse, &mut log).unwrap();

    assert_eq!(
        recorder.requests(),
        vec![
            ("INFY".to_string(), Exchange::Bse, BAR_COUNT),
            ("TCS".to_string(), Exchange::Bse, BAR_COUNT),
        ]
    );
    // The provider returns at most the requested count.
    let table = report.into_table().unwrap();
    assert_eq!(table.len(), BAR_COUNT as usize + 10);
}

#[test]
fn fetch_before_login_is_rejected() {
    let session = Session::new();
    let mut log = Log::default();
    let err = fetch_all(&session, &["TCS"], Exchange::Nse, &mut log).unwrap_err();
    assert!(matches!(err, FetchError::NotLoggedIn));
    assert!(log.lines.is_empty());
}

#[test]
fn failed_relogin_keeps_existing_client() {
    let source = InMemorySource::new().with_bars("TCS", synthetic_bars(1));
    let auth = InMemoryAuthenticator::new("trader", "secret", source);
    let mut session = Session::new();
    session.login(&auth, "trader", "secret").unwrap();
    assert!(session.login(&auth, "trader", "wrong").is_err());

    let mut log = Log::default();
    let report = fetch_all(&session, &["TCS"], Exchange::Nse, &mut log).unwrap();
    assert_eq!(report.succeeded(), 1);
}

#[test]
fn configured_exports_share_the_date_stamp() {
    let source = InMemorySource::new().with_bars("RELIANCE", synthetic_bars(3));
    let session = logged_in(source);
    let mut log = Log::default();
    let table = fetch_all(&session, &["RELIANCE"], Exchange::Nse, &mut log)
        .unwrap()
        .into_table()
        .unwrap();

    let config = AppConfig::default();
    let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
    let artifacts = encode_all(&table, &config.encoders(), &config.file_prefix, today).unwrap();

    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[0].format, ExportFormat::Xlsx);
    assert_eq!(artifacts[0].filename, "StockData_2026-10-15.xlsx");
    assert_eq!(artifacts[1].filename, "StockData_2026-10-15.csv");
}
