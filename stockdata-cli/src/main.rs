//! StockData CLI — log in to the market-data provider and export daily bars.
//!
//! Commands:
//! - `login` — verify credentials and exit
//! - `download` — fetch daily bars for a symbol list and write XLSX/CSV files

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use stockdata_core::data::{StdoutProgress, TradingViewAuth};
use stockdata_core::export::{encode_all, write_artifacts};
use stockdata_core::{
    fetch_all, parse_symbols, AggregateTable, AppConfig, Authenticator, Exchange, ExportFormat,
    Session,
};
use tracing_subscriber::EnvFilter;

const NO_DATA: &str = "No data available for download.";

#[derive(Parser, Debug)]
#[command(
    name = "stockdata",
    about = "StockData CLI — download daily stock bars to Excel and CSV"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to the user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct Credentials {
    /// Provider username. Leave empty (with no password) for guest access.
    #[arg(long, short = 'u')]
    username: Option<String>,

    /// Provider password.
    #[arg(long, short = 'p', env = "STOCKDATA_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify credentials against the provider.
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Fetch 1500 daily bars per symbol and export them.
    Download {
        /// Comma-separated symbols (e.g. "RELIANCE, TCS, INFY").
        #[arg(long, short = 's')]
        symbols: String,

        /// Exchange: NSE or BSE. Defaults to the configured exchange.
        #[arg(long, short = 'e')]
        exchange: Option<Exchange>,

        #[command(flatten)]
        credentials: Credentials,

        /// Output directory. Defaults to the configured directory.
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Export format; repeat for several. Defaults to the configured formats.
        #[arg(long = "format", short = 'f')]
        formats: Vec<ExportFormat>,
    },
}

/// Resolved inputs of one `download` invocation.
struct DownloadJob {
    symbols: Vec<String>,
    exchange: Exchange,
    username: String,
    password: String,
    out_dir: PathBuf,
    config: AppConfig,
}

impl fmt::Debug for DownloadJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadJob")
            .field("symbols", &self.symbols)
            .field("exchange", &self.exchange)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("out_dir", &self.out_dir)
            .field("config", &self.config)
            .finish()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("loading config")?;
    let auth = TradingViewAuth::new(config.timeout())?;

    match cli.command {
        Commands::Login { credentials } => run_login(&auth, &config, credentials),
        Commands::Download {
            symbols,
            exchange,
            credentials,
            out_dir,
            formats,
        } => {
            let job = resolve_job(config, symbols, exchange, credentials, out_dir, formats)?;
            let today = chrono::Local::now().date_naive();
            let paths = run_download(&auth, &job, today)?;
            for path in &paths {
                println!("Saved: {}", path.display());
            }
            Ok(())
        }
    }
}

fn credentials_or_config(config: &AppConfig, credentials: Credentials) -> (String, String) {
    let username = credentials
        .username
        .or_else(|| config.username.clone())
        .unwrap_or_default();
    (username, credentials.password.unwrap_or_default())
}

fn run_login(auth: &dyn Authenticator, config: &AppConfig, credentials: Credentials) -> Result<()> {
    let (username, password) = credentials_or_config(config, credentials);
    let mut session = Session::new();
    session
        .login(auth, &username, &password)
        .with_context(|| format!("Login failed for '{username}'"))?;
    println!("Login successful!");
    Ok(())
}

/// Merge flags over the config file. Flags win.
fn resolve_job(
    mut config: AppConfig,
    symbols: String,
    exchange: Option<Exchange>,
    credentials: Credentials,
    out_dir: Option<PathBuf>,
    formats: Vec<ExportFormat>,
) -> Result<DownloadJob> {
    let (username, password) = credentials_or_config(&config, credentials);
    if !formats.is_empty() {
        config.formats = formats;
    }
    config.validate()?;

    Ok(DownloadJob {
        symbols: parse_symbols(&symbols),
        exchange: exchange.unwrap_or(config.exchange),
        username,
        password,
        out_dir: out_dir.unwrap_or_else(|| config.output_dir.clone()),
        config,
    })
}

/// Login, fetch, aggregate, and write every configured format.
fn run_download(auth: &dyn Authenticator, job: &DownloadJob, today: NaiveDate) -> Result<Vec<PathBuf>> {
    tracing::info!(
        exchange = %job.exchange,
        symbols = job.symbols.len(),
        out_dir = %job.out_dir.display(),
        formats = ?job.config.formats,
        "download job"
    );
    let mut session = Session::new();
    session
        .login(auth, &job.username, &job.password)
        .context("Login failed")?;
    println!("Login successful!");

    let mut progress = StdoutProgress;
    let report = fetch_all(&session, &job.symbols, job.exchange, &mut progress)?;

    let Some(table) = report.into_table() else {
        bail!(NO_DATA);
    };
    print_summary(&table);

    let artifacts = encode_all(&table, &job.config.encoders(), &job.config.file_prefix, today)?;
    let paths = write_artifacts(&job.out_dir, &artifacts)
        .with_context(|| format!("writing to {}", job.out_dir.display()))?;
    Ok(paths)
}

fn print_summary(table: &AggregateTable) {
    println!("\n=== Aggregate ({} rows) ===", table.len());
    println!("{:<14} {:>6}  {:<19}  {:<19}", "Symbol", "Rows", "First", "Last");
    for block in table.summary() {
        println!(
            "{:<14} {:>6}  {:<19}  {:<19}",
            block.symbol,
            block.rows,
            block.first.format("%Y-%m-%d %H:%M:%S"),
            block.last.format("%Y-%m-%d %H:%M:%S"),
        );
    }
    println!();
}
