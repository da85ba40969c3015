//! Wrapper around chat clients.

use crate::base::{
    config::Config,
    types::{ChatMessage, Res, Void},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{info, instrument};

use std::{ops::Deref, sync::Arc};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Constants.

/// Upper bound on how much channel history a single match scan consumes.
/// One bounded call, no pagination.
const HISTORY_LIMIT: u16 = 200;

// Traits.

/// Generic "chat" trait that clients must implement.
#[async_trait]
pub trait GenericChatClient {
    /// Fetch the most recent messages in a channel, newest first,
    /// filtered to ordinary messages (no joins or system notices).
    async fn fetch_history(&self, channel_id: &str) -> Res<Vec<ChatMessage>>;
    /// Add an emoji reaction to the message identified by `timestamp`.
    async fn add_reaction(&self, channel_id: &str, timestamp: &str, name: &str) -> Void;
    /// Remove an emoji reaction from the message identified by `timestamp`.
    async fn remove_reaction(&self, channel_id: &str, timestamp: &str, name: &str) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient + Send + Sync + 'static>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    /// Wraps any chat client implementation (used by tests to inject mocks).
    pub fn new(inner: Arc<dyn GenericChatClient + Send + Sync + 'static>) -> Self {
        Self { inner }
    }

    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    token: SlackApiToken,
    client: Arc<FullClient>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    ///
    /// Runs `auth.test` so a bad token fails at startup rather than on the
    /// first webhook delivery.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        let session = client.open_session(&token);
        let identity = session.auth_test().await?;

        info!("Slack bot user ID: {}", identity.user_id.0);

        Ok(Self { token, client })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    #[instrument(skip(self))]
    async fn fetch_history(&self, channel_id: &str) -> Res<Vec<ChatMessage>> {
        let request = SlackApiConversationsHistoryRequest::new().with_channel(SlackChannelId(channel_id.to_string())).with_limit(HISTORY_LIMIT);

        let session = self.client.open_session(&self.token);

        let response = session.conversations_history(&request).await.map_err(|e| anyhow::anyhow!("Failed to fetch channel history: {}", e))?;

        // Subtyped entries (channel joins, notices, ...) are not ordinary
        // messages and cannot carry a merge-request link worth matching.
        let messages = response
            .messages
            .into_iter()
            .filter(|m| m.subtype.is_none())
            .map(|m| ChatMessage {
                text: m.content.text.clone().unwrap_or_default(),
                timestamp: m.origin.ts.0.clone(),
                channel_id: channel_id.to_string(),
            })
            .collect();

        Ok(messages)
    }

    #[instrument(skip(self))]
    async fn add_reaction(&self, channel_id: &str, timestamp: &str, name: &str) -> Void {
        let request = SlackApiReactionsAddRequest {
            channel: SlackChannelId(channel_id.to_string()),
            name: SlackReactionName(name.to_string()),
            timestamp: SlackTs(timestamp.to_string()),
        };

        let session = self.client.open_session(&self.token);

        let _ = session.reactions_add(&request).await.map_err(|e| anyhow::anyhow!("Failed to add reaction: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_reaction(&self, channel_id: &str, timestamp: &str, name: &str) -> Void {
        let request = SlackApiReactionsRemoveRequest::new(SlackReactionName(name.to_string()))
            .with_channel(SlackChannelId(channel_id.to_string()))
            .with_timestamp(SlackTs(timestamp.to_string()));

        let session = self.client.open_session(&self.token);

        let _ = session.reactions_remove(&request).await.map_err(|e| anyhow::anyhow!("Failed to remove reaction: {}", e))?;

        Ok(())
    }
}
