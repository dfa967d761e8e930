//! Application state — single-owner, main-thread only.
//!
//! Holds the form inputs, banners, fetch progress, and the files written by
//! the last download. The provider session lives beside this state, not in it.

use std::path::PathBuf;

use stockdata_core::{AppConfig, Exchange};

pub const DEFAULT_SYMBOLS: &str = "RELIANCE, TCS, INFY";

/// Banners kept on screen; older ones are dropped.
const MAX_BANNERS: usize = 50;

/// Focusable form element, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
    Symbols,
    Exchange,
    Login,
    Download,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Username,
        Field::Password,
        Field::Symbols,
        Field::Exchange,
        Field::Login,
        Field::Download,
    ];

    pub fn index(self) -> usize {
        match self {
            Field::Username => 0,
            Field::Password => 1,
            Field::Symbols => 2,
            Field::Exchange => 3,
            Field::Login => 4,
            Field::Download => 5,
        }
    }

    pub fn next(self) -> Field {
        Field::ALL[(self.index() + 1) % Field::ALL.len()]
    }

    pub fn prev(self) -> Field {
        Field::ALL[(self.index() + Field::ALL.len() - 1) % Field::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Username => "Username",
            Field::Password => "Password",
            Field::Symbols => "Symbols (comma-separated)",
            Field::Exchange => "Exchange",
            Field::Login => "Login",
            Field::Download => "Download Data",
        }
    }
}

/// Banner severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub level: BannerLevel,
    pub message: String,
}

/// Progress of the running (or last) fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchState {
    pub in_progress: bool,
    pub current: Option<String>,
    pub done: usize,
    pub total: usize,
    /// `done / total`, in `[0, 1]`.
    pub fraction: f64,
}

#[derive(Debug)]
pub struct AppState {
    pub running: bool,
    pub focus: Field,
    pub username: String,
    pub password: String,
    pub symbols: String,
    pub exchange: Exchange,
    pub logged_in: bool,
    pub banners: Vec<Banner>,
    pub fetch: FetchState,
    /// Files written by the last successful download.
    pub saved: Vec<PathBuf>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            running: true,
            focus: Field::Username,
            username: config.username.clone().unwrap_or_default(),
            password: String::new(),
            symbols: DEFAULT_SYMBOLS.to_string(),
            exchange: config.exchange,
            logged_in: false,
            banners: Vec::new(),
            fetch: FetchState::default(),
            saved: Vec::new(),
            config,
        }
    }

    /// Text buffer behind the focused field, if it is a text field.
    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Username => Some(&mut self.username),
            Field::Password => Some(&mut self.password),
            Field::Symbols => Some(&mut self.symbols),
            Field::Exchange | Field::Login | Field::Download => None,
        }
    }

    pub fn push_banner(&mut self, level: BannerLevel, message: impl Into<String>) {
        self.banners.push(Banner {
            level,
            message: message.into(),
        });
        if self.banners.len() > MAX_BANNERS {
            self.banners.remove(0);
        }
    }

    pub fn set_success(&mut self, msg: impl Into<String>) {
        self.push_banner(BannerLevel::Success, msg);
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.push_banner(BannerLevel::Info, msg);
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.push_banner(BannerLevel::Warning, msg);
    }

    pub fn push_error(&mut self, msg: impl Into<String>) {
        self.push_banner(BannerLevel::Error, msg);
    }

    /// Clear per-action output before a login or download runs.
    pub fn begin_action(&mut self) {
        self.banners.clear();
    }
}
