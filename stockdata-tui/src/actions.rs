//! Login and download handlers.
//!
//! Both run on the main thread. During a download the terminal is redrawn
//! from inside the fetch loop so the gauge and banners move per symbol.

use std::io;

use chrono::NaiveDate;
use ratatui::Terminal;
use ratatui::backend::Backend;

use stockdata_core::export::{encode_all, write_artifacts};
use stockdata_core::{
    fetch_all, parse_symbols, Authenticator, FetchProgress, FetchReport, Session, SymbolOutcome,
    SymbolReport,
};

use crate::app::AppState;
use crate::ui;

pub const NO_DATA: &str = "No data available for download.";

/// Single login attempt with the form's credentials.
pub fn login(app: &mut AppState, session: &mut Session, auth: &dyn Authenticator) {
    app.begin_action();
    match session.login(auth, &app.username, &app.password) {
        Ok(()) => {
            app.logged_in = true;
            app.set_success("Login successful!");
        }
        Err(e) => app.push_error(format!("Login failed: {e}")),
    }
}

/// Fetch, aggregate, and export the form's symbols.
///
/// Only terminal I/O errors are returned; everything else becomes a banner.
pub fn download<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    session: &Session,
    today: NaiveDate,
) -> io::Result<()> {
    app.begin_action();
    app.saved.clear();

    let symbols = parse_symbols(&app.symbols);
    app.fetch = Default::default();
    app.fetch.total = symbols.len();
    app.fetch.in_progress = true;

    let exchange = app.exchange;
    let mut progress = TuiProgress {
        terminal,
        app,
        error: None,
    };
    let result = fetch_all(session, &symbols, exchange, &mut progress);
    let TuiProgress { app, error, .. } = progress;
    app.fetch.in_progress = false;
    app.fetch.current = None;

    if let Some(e) = error {
        return Err(e);
    }

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(error = %e, "download without a session");
            app.set_warning("Please login first!");
            return Ok(());
        }
    };

    let Some(table) = report.into_table() else {
        app.set_warning(NO_DATA);
        return Ok(());
    };

    let config = &app.config;
    let written = encode_all(&table, &config.encoders(), &config.file_prefix, today)
        .and_then(|artifacts| write_artifacts(&config.output_dir, &artifacts));

    match written {
        Ok(paths) => {
            tracing::info!(files = paths.len(), rows = table.len(), "export written");
            app.saved = paths;
            app.set_success(format!("Data fetched successfully! ({} rows)", table.len()));
        }
        Err(e) => app.push_error(format!("Export failed: {e}")),
    }
    Ok(())
}

/// Mirrors fetch-loop callbacks into `AppState` and redraws.
struct TuiProgress<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    app: &'a mut AppState,
    /// First draw failure; later draws are skipped.
    error: Option<io::Error>,
}

impl<B: Backend> TuiProgress<'_, B> {
    fn redraw(&mut self) {
        if self.error.is_some() {
            return;
        }
        let app = &*self.app;
        if let Err(e) = self.terminal.draw(|f| ui::draw(f, app)) {
            self.error = Some(e);
        }
    }
}

impl<B: Backend> FetchProgress for TuiProgress<'_, B> {
    fn on_start(&mut self, symbol: &str, index: usize, total: usize) {
        self.app.fetch.current = Some(symbol.to_string());
        self.app.fetch.done = index;
        self.app.fetch.total = total;
        self.redraw();
    }

    fn on_outcome(&mut self, report: &SymbolReport, _index: usize, _total: usize) {
        if let Some(msg) = report.message() {
            match report.outcome {
                SymbolOutcome::Failed(_) => self.app.push_error(msg),
                _ => self.app.set_warning(msg),
            }
        }
    }

    fn on_progress(&mut self, fraction: f64) {
        self.app.fetch.done += 1;
        self.app.fetch.fraction = fraction;
        self.redraw();
    }

    fn on_batch_complete(&mut self, report: &FetchReport) {
        self.app.set_status(format!(
            "Fetch complete: {} with data, {} empty, {} failed",
            report.succeeded(),
            report.no_data(),
            report.failed()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::BannerLevel;
    use ratatui::backend::TestBackend;
    use stockdata_core::data::{synthetic_bars, InMemoryAuthenticator, InMemorySource};
    use stockdata_core::AppConfig;

    fn auth() -> InMemoryAuthenticator {
        let source = InMemorySource::new()
            .with_bars("RELIANCE", synthetic_bars(3))
            .with_bars("TCS", synthetic_bars(2))
            .with_empty("EMPTY");
        InMemoryAuthenticator::new("trader", "secret", source)
    }

    fn terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(100, 30)).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn logged_in_app(dir: &std::path::Path) -> (AppState, Session) {
        let config = AppConfig {
            output_dir: dir.to_path_buf(),
            ..AppConfig::default()
        };
        let mut app = AppState::new(config);
        app.username = "trader".into();
        app.password = "secret".into();
        let mut session = Session::new();
        login(&mut app, &mut session, &auth());
        (app, session)
    }

    fn levels(app: &AppState) -> Vec<BannerLevel> {
        app.banners.iter().map(|b| b.level).collect()
    }

    #[test]
    fn login_success_and_failure() {
        let mut app = AppState::new(AppConfig::default());
        let mut session = Session::new();

        app.username = "trader".into();
        app.password = "nope".into();
        login(&mut app, &mut session, &auth());
        assert!(!app.logged_in);
        assert_eq!(levels(&app), vec![BannerLevel::Error]);
        assert!(app.banners[0].message.starts_with("Login failed:"));

        app.password = "secret".into();
        login(&mut app, &mut session, &auth());
        assert!(app.logged_in);
        assert!(session.is_logged_in());
        assert_eq!(app.banners[0].message, "Login successful!");
    }

    #[test]
    fn download_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = AppState::new(AppConfig {
            output_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        });
        let session = Session::new();
        download(&mut terminal(), &mut app, &session, today()).unwrap();
        assert_eq!(levels(&app), vec![BannerLevel::Warning]);
        assert_eq!(app.banners[0].message, "Please login first!");
        assert!(app.saved.is_empty());
        assert_eq!(app.fetch.done, 0);
    }

    #[test]
    fn download_writes_files_and_reports_each_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, session) = logged_in_app(dir.path());
        app.symbols = "RELIANCE, EMPTY, BADTICKER, TCS".into();

        download(&mut terminal(), &mut app, &session, today()).unwrap();

        let messages: Vec<&str> = app.banners.iter().map(|b| b.message.as_str()).collect();
        assert_eq!(messages[0], "No data for EMPTY");
        assert!(messages[1].starts_with("Error fetching BADTICKER:"));
        assert!(messages.last().unwrap().starts_with("Data fetched successfully!"));

        assert_eq!(app.fetch.done, 4);
        assert_eq!(app.fetch.fraction, 1.0);
        assert!(!app.fetch.in_progress);
        assert_eq!(
            app.saved,
            vec![
                dir.path().join("StockData_2026-10-15.xlsx"),
                dir.path().join("StockData_2026-10-15.csv"),
            ]
        );
        let csv = std::fs::read_to_string(&app.saved[1]).unwrap();
        assert_eq!(csv.lines().count(), 1 + 3 + 2);
    }

    #[test]
    fn empty_aggregate_warns_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, session) = logged_in_app(dir.path());
        app.symbols = "EMPTY".into();

        download(&mut terminal(), &mut app, &session, today()).unwrap();

        assert_eq!(app.banners.last().unwrap().message, NO_DATA);
        assert_eq!(app.banners.last().unwrap().level, BannerLevel::Warning);
        assert!(app.saved.is_empty());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn blank_symbol_list_runs_no_requests() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, session) = logged_in_app(dir.path());
        app.symbols = " , ,".into();

        download(&mut terminal(), &mut app, &session, today()).unwrap();

        assert_eq!(app.fetch.total, 0);
        assert_eq!(app.banners.last().unwrap().message, NO_DATA);
    }
}
