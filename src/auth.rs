//! Implicit-grant login: authorization URL and redirect fragment parsing

use std::collections::HashMap;

use anyhow::{Result, bail};

use crate::config::AppConfig;

/// Key under which the identity provider returns the bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Build the URL the user opens to authorize the application.
///
/// The provider answers by redirecting to `redirect_uri` with the token in
/// the fragment: `#access_token=...&token_type=Bearer&expires_in=3600`.
pub fn authorize_url(config: &AppConfig) -> String {
    let scope = config
        .scopes
        .iter()
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("%20");

    format!(
        "{auth_url}?client_id={client_id}&response_type=token&redirect_uri={redirect_uri}&scope={scope}",
        auth_url = config.auth_url,
        client_id = urlencoding::encode(&config.client_id),
        redirect_uri = urlencoding::encode(&config.redirect_uri),
        scope = scope,
    )
}

/// Parse a location fragment (the part after `#`) into its key/value pairs.
///
/// A malformed fragment yields an empty map; the failure is logged and never
/// reaches the caller.
pub fn token_from_fragment(fragment: &str) -> HashMap<String, String> {
    match parse_fragment(fragment) {
        Ok(params) => params,
        Err(e) => {
            tracing::error!(error = %e, "Error parsing token from URL fragment");
            HashMap::new()
        }
    }
}

fn parse_fragment(fragment: &str) -> Result<HashMap<String, String>> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut params = HashMap::new();

    for pair in fragment.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode_component(key)?, decode_component(value)?);
    }

    Ok(params)
}

fn decode_component(raw: &str) -> Result<String> {
    let bytes = raw.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !matches!(escape, Some([h, l]) if h.is_ascii_hexdigit() && l.is_ascii_hexdigit()) {
                bail!("malformed percent escape in {raw:?}");
            }
        }
    }

    Ok(urlencoding::decode(raw)?.into_owned())
}
