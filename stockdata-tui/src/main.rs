//! StockData TUI — single-screen form for login, download, and export.
//!
//! Layout:
//! 1. Form — credentials, symbol list, exchange, Login and Download buttons
//! 2. Progress — gauge advanced after every symbol
//! 3. Messages — success/info/warning/error banners
//! 4. Saved files — paths written by the last download

mod actions;
mod app;
mod input;
mod theme;
mod ui;

use std::fs::{self, OpenOptions};
use std::io::{self, stdout};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::EnvFilter;

use stockdata_core::data::TradingViewAuth;
use stockdata_core::{AppConfig, Session};

use crate::app::AppState;
use crate::input::Action;

const LOG_FILE: &str = "stockdata.log";

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Config and logging, before the terminal is taken over.
    let config = AppConfig::load(None)?;
    if let Some(dir) = AppConfig::default_path().as_deref().and_then(Path::parent) {
        init_file_logging(dir);
    }
    let auth = TradingViewAuth::new(config.timeout())?;

    let mut app = AppState::new(config);
    let mut session = Session::new();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app, &mut session, &auth);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Log to `<dir>/stockdata.log`. Logging is skipped if the file cannot be opened.
fn init_file_logging(dir: &Path) {
    let file = fs::create_dir_all(dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE))
    });
    if let Ok(file) = file {
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .init();
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    session: &mut Session,
    auth: &TradingViewAuth,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                match input::handle_key(app, key) {
                    Action::None => {}
                    Action::Login => actions::login(app, session, auth),
                    Action::Download => {
                        let today = chrono::Local::now().date_naive();
                        actions::download(terminal, app, session, today)?;
                    }
                }
            }
        }

        // 3. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
