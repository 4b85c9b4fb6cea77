use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds before expiry at which a token is treated as stale
pub const REFRESH_MARGIN_SECS: u64 = 5 * 60;

pub(crate) fn current_time_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Bearer token for the management plane
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    /// Seconds since UNIX epoch; `None` when the token carries no `exp`
    pub expires_at: Option<u64>,
}

impl AccessToken {
    /// Wrap a raw bearer token, reading its expiry from the JWT payload
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let expires_at = JwtUtils::get_expiration(&token);
        Self { token, expires_at }
    }

    pub fn with_expiry(token: impl Into<String>, expires_at: u64) -> Self {
        Self {
            token: token.into(),
            expires_at: Some(expires_at),
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => current_time_secs() >= expires_at,
            None => false,
        }
    }

    /// Within the refresh margin of expiry
    pub fn needs_refresh(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => current_time_secs() + REFRESH_MARGIN_SECS >= expires_at,
            None => false,
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

pub struct JwtUtils;

impl JwtUtils {
    /// Parse JWT expiration time (no signature verification)
    pub fn get_expiration(jwt: &str) -> Option<u64> {
        let parts: Vec<&str> = jwt.split('.').collect();
        if parts.len() != 3 {
            return None;
        }

        // JWT segments are base64url without padding
        use base64::Engine;
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(parts[1].trim_end_matches('='))
            .ok()?;

        let payload: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
        payload.get("exp")?.as_u64()
    }
}
