use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{ChatMessage, MrAction, MrEvent},
    },
    service::chat::ChatClient,
};

/// Scans the channel's recent history for the first message whose text
/// mentions the merge-request URL.
///
/// The scan preserves the order the service returns (newest first). A
/// failed history fetch is logged and treated as an empty history: the
/// webhook sender must never see a chat-side outage.
#[instrument(skip(chat))]
pub async fn find_match(chat: &ChatClient, channel_id: &str, url: &str) -> Option<ChatMessage> {
    let messages = match chat.fetch_history(channel_id).await {
        Ok(messages) => messages,
        Err(err) => {
            warn!("Failed to list channel messages: {}", err);
            Vec::new()
        }
    };

    messages.into_iter().find(|message| message.text.contains(url))
}

/// Adds or removes the configured reaction for `action` on the matched
/// message.
///
/// Exactly one chat call per dispatch. Idempotence is deferred to the chat
/// service: re-adding an existing reaction or removing an absent one comes
/// back as an API error, which is logged and swallowed like any other.
#[instrument(skip(chat, config, message), fields(timestamp = %message.timestamp))]
pub async fn apply_reaction(chat: &ChatClient, config: &Config, message: &ChatMessage, action: MrAction) {
    let result = match action {
        MrAction::Comment => chat.add_reaction(&message.channel_id, &message.timestamp, &config.reaction_comments).await,
        MrAction::Approve => chat.add_reaction(&message.channel_id, &message.timestamp, &config.reaction_approved).await,
        MrAction::Unapprove => chat.remove_reaction(&message.channel_id, &message.timestamp, &config.reaction_approved).await,
        MrAction::Merge => chat.add_reaction(&message.channel_id, &message.timestamp, &config.reaction_merged).await,
    };

    if let Err(err) = result {
        warn!("Failed to update reaction: {}", err);
    }
}

/// Relays one classified merge-request event into the channel: match first,
/// then react. No match means no side effect.
#[instrument(skip(chat, config))]
pub async fn handle_webhook_event(chat: &ChatClient, config: &Config, channel_id: &str, event: &MrEvent) {
    let Some(message) = find_match(chat, channel_id, &event.url).await else {
        info!("No message in {} mentions {}", channel_id, event.url);
        return;
    };

    apply_reaction(chat, config, &message, event.action).await;
}
