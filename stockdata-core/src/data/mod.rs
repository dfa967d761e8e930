//! Data providers and the fetch loop

pub mod fetch;
pub mod memory;
pub mod protocol;
pub mod provider;
pub mod tradingview;

pub use fetch::{fetch_all, fetch_with, FetchError, FetchReport, SymbolOutcome, SymbolReport};
pub use memory::{synthetic_bars, InMemoryAuthenticator, InMemorySource};
pub use provider::{Authenticator, BarSource, DataError, FetchProgress, RawBar, StdoutProgress};
pub use tradingview::{TradingViewAuth, TradingViewClient};
