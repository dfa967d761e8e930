//! BarRow — one exported line: a symbol's daily bar.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Column headers of every exported table, in order.
pub const COLUMNS: [&str; 7] = ["Symbol", "Date", "Open", "High", "Low", "Close", "Volume"];

/// Daily OHLCV bar tagged with the symbol it was requested for.
///
/// Field order is the export column order. `date` is the bar's open time in
/// the exchange's local time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarRow {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Date", with = "date_format")]
    pub date: NaiveDateTime,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
}

/// `YYYY-MM-DD HH:MM:SS`, the layout spreadsheet tools parse without hints.
pub mod date_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}
