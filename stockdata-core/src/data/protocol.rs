//! Chart-socket wire format: `~m~<len>~m~<payload>` framing, request
//! building, and the collector that turns server messages into bars.
//!
//! Everything here is pure so it can be tested without a socket.

use chrono::{DateTime, FixedOffset};
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};

use super::provider::{DataError, RawBar};
use crate::domain::Interval;

const FRAME_MARK: &str = "~m~";
const HEARTBEAT_MARK: &str = "~h~";

/// Series and symbol handles used inside one chart session.
pub const SERIES_ID: &str = "s1";
pub const SYMBOL_ID: &str = "symbol_1";

/// Wrap a payload in a length-prefixed frame. The length counts characters.
pub fn encode_frame(payload: &str) -> String {
    format!("{FRAME_MARK}{}{FRAME_MARK}{payload}", payload.chars().count())
}

/// Frame a `{"m": name, "p": params}` call.
pub fn encode_message(name: &str, params: Vec<Value>) -> String {
    encode_frame(&json!({ "m": name, "p": params }).to_string())
}

/// Split one socket text message into its frame payloads.
pub fn decode_frames(raw: &str) -> Result<Vec<&str>, DataError> {
    let mut frames = Vec::new();
    let mut rest = raw;

    while !rest.is_empty() {
        let body = rest
            .strip_prefix(FRAME_MARK)
            .ok_or_else(|| malformed("missing frame marker", rest))?;
        let len_end = body
            .find(FRAME_MARK)
            .ok_or_else(|| malformed("unterminated frame length", rest))?;
        let len: usize = body[..len_end]
            .parse()
            .map_err(|_| malformed("non-numeric frame length", rest))?;

        let payload = &body[len_end + FRAME_MARK.len()..];
        let split = match payload.char_indices().nth(len) {
            Some((i, _)) => i,
            None if payload.chars().count() == len => payload.len(),
            None => return Err(malformed("truncated frame", rest)),
        };

        frames.push(&payload[..split]);
        rest = &payload[split..];
    }

    Ok(frames)
}

fn malformed(what: &str, near: &str) -> DataError {
    let snippet: String = near.chars().take(40).collect();
    DataError::ResponseFormatChanged(format!("{what} near '{snippet}'"))
}

/// A server call, e.g. `{"m":"timescale_update","p":[...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerMessage {
    pub m: String,
    #[serde(default)]
    pub p: Vec<Value>,
}

/// Classified frame payload.
#[derive(Debug)]
pub enum Packet {
    /// Keep-alive that must be echoed back unchanged.
    Heartbeat,
    Message(ServerMessage),
    /// Session greeting or anything else without a method name.
    Other,
}

pub fn parse_payload(payload: &str) -> Packet {
    if payload.starts_with(HEARTBEAT_MARK) {
        return Packet::Heartbeat;
    }
    match serde_json::from_str::<ServerMessage>(payload) {
        Ok(msg) => Packet::Message(msg),
        Err(_) => Packet::Other,
    }
}

/// Random chart session id: `cs_` followed by 12 lowercase letters.
pub fn chart_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..12).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();
    format!("cs_{suffix}")
}

/// Framed calls that request `n_bars` of history for a qualified ticker.
pub fn history_requests(
    auth_token: &str,
    chart_session: &str,
    qualified_symbol: &str,
    interval: Interval,
    n_bars: u32,
) -> Vec<String> {
    let resolve = format!(
        "={}",
        json!({
            "symbol": qualified_symbol,
            "adjustment": "splits",
            "session": "regular",
        })
    );

    vec![
        encode_message("set_auth_token", vec![json!(auth_token)]),
        encode_message("chart_create_session", vec![json!(chart_session), json!("")]),
        encode_message(
            "resolve_symbol",
            vec![json!(chart_session), json!(SYMBOL_ID), json!(resolve)],
        ),
        encode_message(
            "create_series",
            vec![
                json!(chart_session),
                json!(SERIES_ID),
                json!(SERIES_ID),
                json!(SYMBOL_ID),
                json!(interval.resolution()),
                json!(n_bars),
            ],
        ),
        encode_message(
            "switch_timezone",
            vec![json!(chart_session), json!("exchange")],
        ),
    ]
}

/// What the socket loop should do after a payload.
#[derive(Debug, PartialEq)]
pub enum Step {
    Continue,
    /// Send this frame back (heartbeat echo).
    Reply(String),
    /// The series finished loading.
    Complete,
}

/// Accumulates bars for one series until `series_completed`.
#[derive(Debug)]
pub struct SeriesCollector {
    symbol: String,
    offset: FixedOffset,
    bars: Vec<RawBar>,
}

impl SeriesCollector {
    pub fn new(symbol: &str, offset: FixedOffset) -> Self {
        Self {
            symbol: symbol.to_string(),
            offset,
            bars: Vec::new(),
        }
    }

    pub fn handle(&mut self, payload: &str) -> Result<Step, DataError> {
        let msg = match parse_payload(payload) {
            Packet::Heartbeat => return Ok(Step::Reply(encode_frame(payload))),
            Packet::Other => return Ok(Step::Continue),
            Packet::Message(msg) => msg,
        };

        match msg.m.as_str() {
            "timescale_update" => {
                let bars = series_bars(&msg, SERIES_ID, self.offset)?;
                self.bars.extend(bars);
                Ok(Step::Continue)
            }
            "series_completed" => Ok(Step::Complete),
            "symbol_error" => Err(DataError::SymbolNotFound {
                symbol: self.symbol.clone(),
            }),
            "series_error" | "critical_error" | "protocol_error" => Err(
                DataError::ResponseFormatChanged(format!("{}: {}", msg.m, Value::Array(msg.p))),
            ),
            _ => Ok(Step::Continue),
        }
    }

    pub fn into_bars(self) -> Vec<RawBar> {
        self.bars
    }
}

/// Extract `[ts, open, high, low, close, volume]` rows of one series from a
/// `timescale_update`. Rows without a volume get `0.0`.
pub fn series_bars(
    msg: &ServerMessage,
    series_id: &str,
    offset: FixedOffset,
) -> Result<Vec<RawBar>, DataError> {
    let Some(points) = msg
        .p
        .get(1)
        .and_then(|p| p.get(series_id))
        .and_then(|s| s.get("s"))
        .and_then(Value::as_array)
    else {
        return Ok(Vec::new());
    };

    points
        .iter()
        .map(|point| {
            let v = point
                .get("v")
                .and_then(Value::as_array)
                .ok_or_else(|| DataError::ResponseFormatChanged("series point without 'v'".into()))?;
            let num = |i: usize| v.get(i).and_then(Value::as_f64);

            let (Some(ts), Some(open), Some(high), Some(low), Some(close)) =
                (num(0), num(1), num(2), num(3), num(4))
            else {
                return Err(DataError::ResponseFormatChanged(format!(
                    "short series point: {}",
                    Value::Array(v.clone())
                )));
            };

            let time = DateTime::from_timestamp(ts as i64, 0)
                .map(|dt| dt.with_timezone(&offset).naive_local())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            Ok(RawBar {
                time,
                open,
                high,
                low,
                close,
                volume: num(5).unwrap_or(0.0),
            })
        })
        .collect()
}
