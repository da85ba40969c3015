//! Common types and result aliases shared across the application.

use serde::{Deserialize, Serialize};

/// The crate-wide error type.
pub type Err = anyhow::Error;
/// A result with the crate-wide error type.
pub type Res<T> = Result<T, Err>;
/// A result that carries no value on success.
pub type Void = Res<()>;

/// The merge-request lifecycle actions the relay reacts to.
///
/// Anything GitLab sends outside these four kinds is classified as
/// "nothing to do" rather than producing a partially-populated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MrAction {
    /// A new comment was posted on the merge request.
    Comment,
    /// The merge request was approved.
    Approve,
    /// An approval on the merge request was revoked.
    Unapprove,
    /// The merge request was merged.
    Merge,
}

/// A single actionable merge-request event, produced once per webhook
/// delivery and discarded after dispatch.
///
/// `url` is the canonical merge-request URL; for comment events the
/// in-page anchor (`#note_...`) has already been stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrEvent {
    /// The canonical merge-request URL.
    pub url: String,
    /// The lifecycle action this event represents.
    pub action: MrAction,
}

/// One message from a channel's history.
///
/// `timestamp` is the opaque Slack `ts` token that identifies the
/// message for reaction mutations; it is never parsed as a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The message text.
    pub text: String,
    /// The opaque Slack `ts` token identifying the message.
    pub timestamp: String,
    /// The ID of the channel the message belongs to.
    pub channel_id: String,
}
