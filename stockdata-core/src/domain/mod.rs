//! Domain types for StockData

pub mod bar;
pub mod exchange;

pub use bar::BarRow;
pub use exchange::{Exchange, Interval, ParseExchangeError};
