//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by mr-relay:
//! - Chat services (e.g., Slack)
//!
//! The service module defines both a generic trait and a concrete
//! implementation, allowing for extensibility and easy testing.

pub mod chat;
