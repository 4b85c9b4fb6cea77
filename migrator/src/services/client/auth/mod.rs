//! Credentials for the Azure management plane
//!
//! - **token**: bearer token value with JWT expiry parsing
//! - **device_code**: interactive device code login with silent refresh

pub mod device_code;
pub mod token;

pub use device_code::DeviceCodeCredential;
pub use token::{AccessToken, JwtUtils};

use async_trait::async_trait;
use std::sync::Arc;

use super::errors::{ClientError, ClientResult};

/// Source of bearer tokens for management API requests
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn access_token(&self) -> ClientResult<AccessToken>;
}

/// A token issued elsewhere (e.g. `az account get-access-token`)
pub struct StaticTokenCredential {
    token: AccessToken,
}

impl StaticTokenCredential {
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn access_token(&self) -> ClientResult<AccessToken> {
        if self.token.is_expired() {
            return Err(ClientError::Authentication {
                message: "Supplied access token has expired".to_string(),
            });
        }
        Ok(self.token.clone())
    }
}

/// Pick the credential for a run: a supplied token wins over interactive login
pub fn select_credential(
    http_client: reqwest::Client,
    static_token: Option<AccessToken>,
    authority: &str,
    tenant: &str,
) -> Arc<dyn TokenCredential> {
    match static_token {
        Some(token) => {
            tracing::info!("Using access token supplied through the environment");
            Arc::new(StaticTokenCredential::new(token))
        }
        None => Arc::new(DeviceCodeCredential::new(http_client, authority, tenant)),
    }
}
