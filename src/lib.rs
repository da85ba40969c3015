//! Library root for `mr-relay`.
//!
//! Mr-relay is a small notification bridge between GitLab and Slack:
//! - Accepts GitLab merge-request webhooks (comments, approvals, merges)
//! - Finds the channel message that announced the merge request
//! - Annotates it with an emoji reaction reflecting the event
//!
//! The bridge holds no durable state; each webhook delivery is classified,
//! matched against recent channel history, and dispatched within a single
//! request. The architecture is built around an extensible chat trait that
//! allows for different implementations of the chat service.

#[deny(missing_docs)]
pub mod base;
pub mod interaction;
pub mod runtime;
pub mod server;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the mr-relay runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the chat client
/// - Starts the webhook server
pub async fn start(config: Config) -> Void {
    info!("Starting mr-relay ...");

    // Start the crypto provider.
    crypto::ring::default_provider().install_default().unwrap();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
