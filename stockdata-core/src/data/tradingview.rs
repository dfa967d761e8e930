//! TradingView data provider.
//!
//! Sign-in goes through the accounts endpoint over HTTPS and yields an auth
//! token. History is read from the chart WebSocket: one connection per
//! request, closed once the series reports completion.
//!
//! TradingView has no public API for this; the protocol may change without
//! notice. Format surprises surface as `DataError::ResponseFormatChanged`.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::Deserialize;
use tungstenite::client::IntoClientRequest;
use tungstenite::http::HeaderValue;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::protocol::{self, SeriesCollector, Step};
use super::provider::{Authenticator, BarSource, DataError, RawBar};
use crate::domain::{Exchange, Interval};

const SIGN_IN_URL: &str = "https://www.tradingview.com/accounts/signin/";
const SIGN_IN_REFERER: &str = "https://www.tradingview.com";
const WS_URL: &str = "wss://data.tradingview.com/socket.io/websocket";
const WS_HOST: &str = "data.tradingview.com";
const WS_ORIGIN: &str = "https://data.tradingview.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Token accepted by the chart socket without an account. Data is limited.
pub const GUEST_TOKEN: &str = "unauthorized_user_token";

#[derive(Debug, Deserialize)]
struct SignInResponse {
    user: Option<SignInUser>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SignInUser {
    auth_token: Option<String>,
}

/// Pull the auth token out of a sign-in response body.
fn parse_sign_in(body: &str) -> Result<String, DataError> {
    let resp: SignInResponse = serde_json::from_str(body).map_err(|e| {
        DataError::ResponseFormatChanged(format!("failed to parse sign-in response: {e}"))
    })?;

    if let Some(token) = resp
        .user
        .and_then(|u| u.auth_token)
        .filter(|t| !t.is_empty())
    {
        return Ok(token);
    }

    match resp.error.filter(|e| !e.is_empty()) {
        Some(msg) => Err(DataError::AuthenticationFailed(msg)),
        None => Err(DataError::AuthenticationFailed(
            "sign-in response carried no auth token".into(),
        )),
    }
}

/// Exchanges TradingView credentials for a `TradingViewClient`.
pub struct TradingViewAuth {
    http: reqwest::blocking::Client,
    timeout: Duration,
}

impl TradingViewAuth {
    pub fn new(timeout: Duration) -> Result<Self, DataError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, timeout })
    }

    fn sign_in(&self, username: &str, password: &str) -> Result<String, DataError> {
        let resp = self
            .http
            .post(SIGN_IN_URL)
            .header(reqwest::header::REFERER, SIGN_IN_REFERER)
            .form(&[
                ("username", username),
                ("password", password),
                ("remember", "on"),
            ])
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        match parse_sign_in(&body) {
            Err(DataError::ResponseFormatChanged(_)) if !status.is_success() => Err(
                DataError::AuthenticationFailed(format!("HTTP {status} from sign-in endpoint")),
            ),
            other => other,
        }
    }
}

impl Authenticator for TradingViewAuth {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn BarSource>, DataError> {
        let token = if username.is_empty() && password.is_empty() {
            tracing::warn!("no credentials given; using guest access, data may be limited");
            GUEST_TOKEN.to_string()
        } else {
            self.sign_in(username, password)?
        };

        Ok(Box::new(TradingViewClient {
            auth_token: token,
            timeout: self.timeout,
        }))
    }
}

/// Authenticated chart-socket client.
pub struct TradingViewClient {
    auth_token: String,
    timeout: Duration,
}

impl TradingViewClient {
    fn connect(&self) -> Result<WebSocket<MaybeTlsStream<TcpStream>>, DataError> {
        let net = |e: &dyn std::fmt::Display| DataError::NetworkUnreachable(e.to_string());

        let mut request = WS_URL.into_client_request().map_err(|e| net(&e))?;
        request
            .headers_mut()
            .insert("Origin", HeaderValue::from_static(WS_ORIGIN));

        let addr = (WS_HOST, 443)
            .to_socket_addrs()
            .map_err(|e| net(&e))?
            .next()
            .ok_or_else(|| DataError::NetworkUnreachable(format!("cannot resolve {WS_HOST}")))?;

        let stream = TcpStream::connect_timeout(&addr, self.timeout).map_err(|e| net(&e))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .map_err(|e| net(&e))?;
        stream
            .set_write_timeout(Some(self.timeout))
            .map_err(|e| net(&e))?;

        let (socket, _response) = tungstenite::client_tls(request, stream).map_err(|e| net(&e))?;
        Ok(socket)
    }

    fn read_series(
        socket: &mut WebSocket<MaybeTlsStream<TcpStream>>,
        collector: &mut SeriesCollector,
    ) -> Result<(), DataError> {
        loop {
            let text = match socket.read() {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => {
                    return Err(DataError::NetworkUnreachable(
                        "connection closed before the series completed".into(),
                    ))
                }
                Ok(_) => continue,
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            for payload in protocol::decode_frames(text.as_str())? {
                match collector.handle(payload)? {
                    Step::Continue => {}
                    Step::Reply(frame) => socket
                        .send(Message::text(frame))
                        .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?,
                    Step::Complete => return Ok(()),
                }
            }
        }
    }
}

impl BarSource for TradingViewClient {
    fn name(&self) -> &str {
        "tradingview"
    }

    fn get_history(
        &self,
        symbol: &str,
        exchange: Exchange,
        interval: Interval,
        n_bars: u32,
    ) -> Result<Vec<RawBar>, DataError> {
        let mut socket = self.connect()?;
        let chart_session = protocol::chart_session_id();
        let qualified = exchange.qualify(symbol);
        tracing::debug!(%qualified, %chart_session, "chart socket open");

        for frame in protocol::history_requests(
            &self.auth_token,
            &chart_session,
            &qualified,
            interval,
            n_bars,
        ) {
            socket
                .send(Message::text(frame))
                .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        }

        let mut collector = SeriesCollector::new(symbol, exchange.utc_offset());
        let result = Self::read_series(&mut socket, &mut collector);
        let _ = socket.close(None);
        result?;

        Ok(collector.into_bars())
    }
}
