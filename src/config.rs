//! Runtime configuration
//!
//! Every value has a built-in default and can be overridden through a
//! `MEDMUSIC_*` environment variable. There are no configuration files.

use std::env;
use std::path::PathBuf;

pub const SPOTIFY_CLIENT_ID: &str = "fa3ca1ebe37a412c966ebdfca389a02d";
pub const SPOTIFY_REDIRECT_URI: &str = "http://localhost:5173/";
pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const SCOPES: &str = "user-read-private user-read-email user-read-playback-state user-modify-playback-state streaming app-remote-control user-library-read user-library-modify playlist-read-private";

pub const STORAGE_FILE: &str = ".cache/local_storage.json";

pub const AI_API_URL: &str = "https://api.cloudflare.com/client/v4";
pub const AI_MODEL: &str = "@cf/meta/llama-3-8b-instruct";

/// Credentials for the text-generation endpoint. Absent means the track
/// summary feature is off.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextGenConfig {
    pub base_url: String,
    pub account_id: String,
    pub api_token: String,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub api_url: String,
    pub scopes: Vec<String>,
    pub storage_path: PathBuf,
    pub text_gen: Option<TextGenConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: SPOTIFY_CLIENT_ID.to_string(),
            redirect_uri: SPOTIFY_REDIRECT_URI.to_string(),
            auth_url: SPOTIFY_AUTH_URL.to_string(),
            api_url: SPOTIFY_API_URL.to_string(),
            scopes: SCOPES.split_whitespace().map(str::to_string).collect(),
            storage_path: PathBuf::from(STORAGE_FILE),
            text_gen: None,
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let text_gen = match (var("MEDMUSIC_AI_ACCOUNT_ID"), var("MEDMUSIC_AI_API_TOKEN")) {
            (Some(account_id), Some(api_token)) => Some(TextGenConfig {
                base_url: var("MEDMUSIC_AI_URL").unwrap_or_else(|| AI_API_URL.to_string()),
                account_id,
                api_token,
                model: var("MEDMUSIC_AI_MODEL").unwrap_or_else(|| AI_MODEL.to_string()),
            }),
            _ => None,
        };

        Self {
            client_id: var("MEDMUSIC_CLIENT_ID").unwrap_or(defaults.client_id),
            redirect_uri: var("MEDMUSIC_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
            auth_url: var("MEDMUSIC_AUTH_URL").unwrap_or(defaults.auth_url),
            api_url: var("MEDMUSIC_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            scopes: defaults.scopes,
            storage_path: var("MEDMUSIC_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            text_gen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.api_url, SPOTIFY_API_URL);
        assert_eq!(config.storage_path, PathBuf::from(STORAGE_FILE));
        assert!(config.scopes.iter().any(|s| s == "streaming"));
        assert!(config.text_gen.is_none());
    }

    #[test]
    fn overrides_and_trims_api_url() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("MEDMUSIC_API_URL", "http://127.0.0.1:9000/v1/"),
            ("MEDMUSIC_CLIENT_ID", "abc"),
        ]));
        assert_eq!(config.api_url, "http://127.0.0.1:9000/v1");
        assert_eq!(config.client_id, "abc");
    }

    #[test]
    fn text_gen_needs_account_and_token() {
        let only_account = AppConfig::from_lookup(lookup_from(&[("MEDMUSIC_AI_ACCOUNT_ID", "acct")]));
        assert!(only_account.text_gen.is_none());

        let both = AppConfig::from_lookup(lookup_from(&[
            ("MEDMUSIC_AI_ACCOUNT_ID", "acct"),
            ("MEDMUSIC_AI_API_TOKEN", "secret"),
        ]));
        let text_gen = both.text_gen.expect("text gen configured");
        assert_eq!(text_gen.model, AI_MODEL);
        assert_eq!(text_gen.base_url, AI_API_URL);
    }
}
