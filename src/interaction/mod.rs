//! Event handling for incoming GitLab webhooks.
//!
//! This module turns raw webhook payloads into actionable merge-request
//! events and relays them into the chat channel:
//! - Classifying payloads into comment/approve/unapprove/merge events
//! - Matching events against recent channel history
//! - Applying the corresponding emoji reaction

pub mod classify;
pub mod webhook_event;
