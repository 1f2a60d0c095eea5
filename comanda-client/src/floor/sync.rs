//! Floor synchronization service
//!
//! Connects the editor's refresh to its three triggers: the initial load,
//! the fixed-interval poll, and the push-event channel. Push is strictly
//! an optimization; when the channel cannot be established the floor keeps
//! converging through polling alone.

use std::sync::Arc;
use std::time::Duration;

use crate::api::{FloorApi, HttpApi};
use crate::events::{self, ChannelOptions, Subscription};
use crate::floor::editor::{FloorPlanEditor, ReloadPolicy};
use crate::poll::{PollOptions, PollScheduler};
use crate::{ClientConfig, HttpClient};
use shared::Topic;

/// Tuning for the sync service
#[derive(Debug, Clone)]
pub struct FloorSyncOptions {
    /// Poll period for the background refresh
    pub poll_interval: Duration,
    /// What a committed load does to unsaved edits
    pub policy: ReloadPolicy,
}

impl Default for FloorSyncOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            policy: ReloadPolicy::default(),
        }
    }
}

impl From<&ClientConfig> for FloorSyncOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            ..Default::default()
        }
    }
}

/// Running synchronization for one floor view
pub struct FloorSync {
    editor: Arc<FloorPlanEditor>,
    poller: PollScheduler,
    channel: Option<Subscription>,
}

impl FloorSync {
    /// Start against the real HTTP boundary: initial load, poll loop, and
    /// a push channel when the server grants one.
    pub async fn start(http: HttpClient, options: FloorSyncOptions) -> Self {
        let api: Arc<dyn FloorApi> = Arc::new(HttpApi::new(http.clone()));
        Self::start_with_api(api, Some(http), options).await
    }

    /// Start over any API implementation. Without an HTTP client no push
    /// channel is attempted; tests run this way against in-memory APIs.
    pub async fn start_with_api(
        api: Arc<dyn FloorApi>,
        http: Option<HttpClient>,
        options: FloorSyncOptions,
    ) -> Self {
        let editor = Arc::new(FloorPlanEditor::new(api, options.policy));

        // Initial load; failures surface through the editor's error state.
        editor.refresh().await;

        let poller = {
            let editor = editor.clone();
            PollScheduler::new(
                move || {
                    let editor = editor.clone();
                    async move {
                        editor.refresh().await;
                        Ok(())
                    }
                },
                options.poll_interval,
                PollOptions::default(),
            )
        };

        let channel = match http {
            Some(http) => {
                let mut channel_options = ChannelOptions::new();
                for topic in Topic::ALL {
                    let editor = editor.clone();
                    channel_options = channel_options.on(topic.name(), move |_event| {
                        let editor = editor.clone();
                        tokio::spawn(async move {
                            editor.refresh().await;
                        });
                    });
                }
                events::open(&http, channel_options).await
            }
            None => None,
        };
        if channel.is_none() {
            tracing::info!("floor sync running on polling only");
        }

        Self {
            editor,
            poller,
            channel,
        }
    }

    /// The editor this service keeps in sync
    pub fn editor(&self) -> &Arc<FloorPlanEditor> {
        &self.editor
    }

    /// Manual reload (the retry button)
    pub async fn refresh(&self) -> bool {
        self.editor.refresh().await
    }

    /// Whether server push is currently feeding refreshes
    pub fn has_push_channel(&self) -> bool {
        self.channel.is_some()
    }

    /// Pause or resume the background poll
    pub fn set_polling(&self, enabled: bool) {
        self.poller.set_enabled(enabled);
    }

    /// Stop polling and close the push channel
    pub async fn shutdown(self) {
        self.poller.stop();
        if let Some(channel) = self.channel {
            channel.close().await;
        }
    }
}

impl std::fmt::Debug for FloorSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloorSync")
            .field("push", &self.channel.is_some())
            .finish()
    }
}
