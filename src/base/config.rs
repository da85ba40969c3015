//! Load configuration via `config` crate with env-override support.

use std::{net::SocketAddr, ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default reaction for a new comment on a merge request.
fn default_reaction_comments() -> String {
    "speech_balloon".to_string()
}

/// Default reaction for an approved merge request.
fn default_reaction_approved() -> String {
    "white_check_mark".to_string()
}

/// Default reaction for a merged merge request.
fn default_reaction_merged() -> String {
    "leftwards_arrow_with_hook".to_string()
}

/// Default address the webhook server binds to.
fn default_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

/// Configuration for the mr-relay application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Shared, immutable configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// The actual configuration values, shared behind [`Config`]'s `Arc`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack app token used for all outbound chat calls (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Shared secret expected in `X-Gitlab-Token` (`GITLAB_WEBHOOK_TOKEN`).
    ///
    /// When absent, webhook authentication is skipped entirely.
    #[serde(default)]
    pub gitlab_webhook_token: Option<String>,
    /// Reaction added for merge-request comments (`REACTION_COMMENTS`).
    #[serde(default = "default_reaction_comments")]
    pub reaction_comments: String,
    /// Reaction added on approval and removed on un-approval (`REACTION_APPROVED`).
    #[serde(default = "default_reaction_approved")]
    pub reaction_approved: String,
    /// Reaction added when a merge request is merged (`REACTION_MERGED`).
    #[serde(default = "default_reaction_merged")]
    pub reaction_merged: String,
    /// Socket address the webhook server listens on (`LISTEN_ADDRESS`).
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

impl Config {
    /// Loads configuration from the environment and an optional TOML file.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default());

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.reaction_comments.is_empty() || result.reaction_approved.is_empty() || result.reaction_merged.is_empty() {
            return Err(anyhow::anyhow!("Reaction names must not be empty."));
        }

        if result.listen_address.parse::<SocketAddr>().is_err() {
            return Err(anyhow::anyhow!("Listen address must be a valid socket address."));
        }

        Ok(result)
    }
}
