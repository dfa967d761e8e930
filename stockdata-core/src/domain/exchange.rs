//! Exchange venues and bar granularity.

use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Market venue qualifier sent alongside every symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    /// National Stock Exchange of India.
    #[default]
    Nse,
    /// Bombay Stock Exchange.
    Bse,
}

impl Exchange {
    pub const ALL: [Exchange; 2] = [Exchange::Nse, Exchange::Bse];

    pub fn code(self) -> &'static str {
        match self {
            Exchange::Nse => "NSE",
            Exchange::Bse => "BSE",
        }
    }

    /// Provider-qualified ticker, e.g. `NSE:RELIANCE`.
    pub fn qualify(self, symbol: &str) -> String {
        format!("{}:{symbol}", self.code())
    }

    /// Local time of the venue. Both Indian exchanges trade on IST.
    pub fn utc_offset(self) -> FixedOffset {
        let secs = match self {
            Exchange::Nse | Exchange::Bse => IST_OFFSET_SECS,
        };
        FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
    }

    /// The other venue (used by selector widgets).
    pub fn toggle(self) -> Exchange {
        match self {
            Exchange::Nse => Exchange::Bse,
            Exchange::Bse => Exchange::Nse,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown exchange '{0}' (expected NSE or BSE)")]
pub struct ParseExchangeError(pub String);

impl FromStr for Exchange {
    type Err = ParseExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NSE" => Ok(Exchange::Nse),
            "BSE" => Ok(Exchange::Bse),
            _ => Err(ParseExchangeError(s.to_string())),
        }
    }
}

/// Bar granularity. The fetch loop only ever requests daily bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    Daily,
}

impl Interval {
    /// Resolution code understood by the chart protocol.
    pub fn resolution(self) -> &'static str {
        match self {
            Interval::Daily => "1D",
        }
    }
}
