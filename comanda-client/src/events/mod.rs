//! Push-event channel
//!
//! Trades the session credential for a short-lived stream token, opens the
//! one-directional `/eventos` stream and dispatches named events to
//! registered handlers. The channel is an optimization over polling: any
//! failure to establish it degrades to no channel rather than surfacing an
//! error, and a dropped stream stays dropped until the caller deliberately
//! re-opens.

pub mod sse;

pub use sse::{SseEvent, SseParser};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde::Deserialize;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{ClientError, HttpClient};

/// Handler for one named event
pub type EventHandler = Arc<dyn Fn(&SseEvent) + Send + Sync>;

/// Hook invoked once the stream is established
pub type OpenHook = Arc<dyn Fn() + Send + Sync>;

/// Hook invoked when an established stream breaks; re-opening is the
/// caller's decision
pub type ChannelErrorHook = Arc<dyn Fn(&ClientError) + Send + Sync>;

/// Short-lived credential returned by `POST /auth/sse-token`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SseTokenResponse {
    sse_token: Option<String>,
}

/// Channel configuration: which events to handle and lifecycle hooks
#[derive(Default)]
pub struct ChannelOptions {
    events: HashMap<String, EventHandler>,
    on_open: Option<OpenHook>,
    on_error: Option<ChannelErrorHook>,
}

impl ChannelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a named event
    pub fn on<F>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&SseEvent) + Send + Sync + 'static,
    {
        self.events.insert(event.into(), Arc::new(handler));
        self
    }

    pub fn with_on_open<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_open = Some(Arc::new(hook));
        self
    }

    pub fn with_on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ClientError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }
}

/// Live push subscription; dropping it tears the connection down
pub struct Subscription {
    shutdown: CancellationToken,
    task: tokio::task::JoinHandle<()>,
    _guard: DropGuard,
}

impl Subscription {
    /// Close the stream and wait for the read loop to finish
    pub async fn close(self) {
        self.shutdown.cancel();
        let _ = self.task.await;
    }
}

/// Open the push channel.
///
/// `None` means no channel: the token exchange or the connection failed and
/// the caller keeps operating on polling alone.
pub async fn open(http: &HttpClient, options: ChannelOptions) -> Option<Subscription> {
    let sse_token = match exchange_token(http).await {
        Ok(token) => token,
        Err(err) => {
            tracing::warn!(error = %err, "sse token exchange failed, continuing without push channel");
            return None;
        }
    };

    let response = match connect(http, &sse_token).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "event stream connection failed, continuing without push channel");
            return None;
        }
    };

    tracing::info!("push channel open");
    if let Some(hook) = &options.on_open {
        hook();
    }

    let shutdown = CancellationToken::new();
    let task = tokio::spawn(read_loop(
        response,
        options.events,
        options.on_error,
        shutdown.clone(),
    ));

    Some(Subscription {
        shutdown: shutdown.clone(),
        task,
        _guard: shutdown.drop_guard(),
    })
}

async fn exchange_token(http: &HttpClient) -> Result<String, ClientError> {
    let response: SseTokenResponse = http
        .post_empty("auth/sse-token", &CancellationToken::new())
        .await?;
    response
        .sse_token
        .ok_or_else(|| ClientError::InvalidResponse("missing sseToken".to_string()))
}

async fn connect(http: &HttpClient, sse_token: &str) -> Result<reqwest::Response, ClientError> {
    // A dedicated client without a total-request timeout; the session
    // client would kill the long-lived stream when its timeout elapsed.
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(ClientError::Http)?;

    let url = format!("{}/eventos?token={}", http.base_url(), sse_token);
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await?;
    HttpClient::check_status(response).await
}

async fn read_loop(
    response: reqwest::Response,
    handlers: HashMap<String, EventHandler>,
    on_error: Option<ChannelErrorHook>,
    shutdown: CancellationToken,
) {
    let mut stream = response.bytes_stream();
    let mut parser = SseParser::new();

    loop {
        let chunk = tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::debug!("push channel closed");
                return;
            }
            chunk = stream.next() => chunk,
        };

        match chunk {
            Some(Ok(bytes)) => {
                for event in parser.feed(&bytes) {
                    match handlers.get(event.event.as_str()) {
                        Some(handler) => {
                            tracing::debug!(event = %event.event, "push event");
                            handler(&event);
                        }
                        None => {
                            tracing::debug!(event = %event.event, "unhandled push event");
                        }
                    }
                }
            }
            Some(Err(err)) => {
                tracing::warn!(error = %err, "event stream broke");
                if let Some(hook) = &on_error {
                    hook(&ClientError::Http(err));
                }
                return;
            }
            None => {
                tracing::warn!("event stream ended by server");
                if let Some(hook) = &on_error {
                    hook(&ClientError::Internal("event stream closed".to_string()));
                }
                return;
            }
        }
    }
}
