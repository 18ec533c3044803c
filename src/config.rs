//! Runtime configuration.
//!
//! One [`RelayConfig`] is built from the environment at startup and passed by
//! reference into the components that need it. No component reads the
//! environment on its own.

use crate::persona::default_persona;
use std::time::Duration;

pub const DEFAULT_CONTEXT_LIMIT: usize = 1000;
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Endpoint and fixed sampling parameters for the completion service.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Everything the relay needs at runtime.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Conversations the bot participates in; all others are ignored.
    pub watched_conversations: Vec<String>,
    /// Upper bound on stored messages included in one transcript.
    pub context_limit: usize,
    /// Sender identity recorded on generated replies.
    pub bot_name: String,
    /// System-role instructions prepended to every transcript.
    pub persona: String,
    pub db_path: String,
    pub creds_path: String,
    /// Address of the transport bridge sidecar.
    pub bridge_addr: String,
    /// Fixed pause between reconnect attempts.
    pub reconnect_delay: Duration,
    pub completion: CompletionConfig,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        let bot_name =
            std::env::var("RELAY_BOT_NAME").unwrap_or_else(|_| "relaybot".to_string());
        let persona_text =
            std::env::var("RELAY_PERSONA").unwrap_or_else(|_| default_persona(&bot_name));

        Self {
            watched_conversations: std::env::var("RELAY_CONVERSATIONS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            context_limit: std::env::var("RELAY_CONTEXT_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CONTEXT_LIMIT),
            bot_name,
            persona: persona_text,
            db_path: std::env::var("RELAY_DB_PATH")
                .unwrap_or_else(|_| format!("{home}/.relaybot/messages.db")),
            creds_path: std::env::var("RELAY_CREDS_PATH")
                .unwrap_or_else(|_| format!("{home}/.relaybot/creds.json")),
            bridge_addr: std::env::var("RELAY_BRIDGE_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:7455".to_string()),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            completion: CompletionConfig {
                base_url: std::env::var("AI_API_URL")
                    .unwrap_or_else(|_| "https://integrate.api.nvidia.com/v1".to_string()),
                api_key: std::env::var("AI_API_KEY").unwrap_or_default(),
                model: std::env::var("AI_MODEL")
                    .unwrap_or_else(|_| "meta/llama-3.1-405b-instruct".to_string()),
                max_tokens: 1024,
                temperature: 0.8,
                top_p: 1.0,
            },
        }
    }
}

/// Split a comma-separated allow-list, dropping empty entries.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_splits_and_trims() {
        assert_eq!(
            parse_list("a@g.us, b@g.us ,c@g.us"),
            vec!["a@g.us", "b@g.us", "c@g.us"]
        );
    }

    #[test]
    fn parse_list_drops_empty_entries() {
        assert_eq!(parse_list(""), Vec::<String>::new());
        assert_eq!(parse_list("a,,b,"), vec!["a", "b"]);
    }
}
