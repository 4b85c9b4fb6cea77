//! Interactive device code login against Azure AD (OAuth 2.0 device authorization grant)
//!
//! The user is shown a code and a verification URL, signs in from any browser,
//! and the credential polls the token endpoint until the sign-in completes.
//! Tokens are cached and silently refreshed with the refresh token when they
//! get close to expiry.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::token::{current_time_secs, AccessToken};
use super::TokenCredential;
use crate::services::client::errors::{ClientError, ClientResult};

/// Public client id of the Azure CLI, accepted by every tenant for device login
pub const AZURE_CLI_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";

/// Scope for the Azure Resource Manager API
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default offline_access";

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

#[derive(Deserialize, Debug)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    #[serde(default = "default_interval")]
    interval: u64,
    #[serde(default)]
    message: Option<String>,
}

fn default_interval() -> u64 {
    5
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

struct CachedSession {
    access: AccessToken,
    refresh_token: Option<String>,
}

/// Device code credential for one tenant
pub struct DeviceCodeCredential {
    http_client: Client,
    authority: String,
    tenant: String,
    client_id: String,
    scope: String,
    session: Mutex<Option<CachedSession>>,
}

impl DeviceCodeCredential {
    pub fn new(http_client: Client, authority: &str, tenant: &str) -> Self {
        let tenant = if tenant.is_empty() {
            warn!("No tenant configured; signing in against the organizations endpoint");
            "organizations".to_string()
        } else {
            tenant.to_string()
        };

        Self {
            http_client,
            authority: authority.trim_end_matches('/').to_string(),
            tenant,
            client_id: AZURE_CLI_CLIENT_ID.to_string(),
            scope: MANAGEMENT_SCOPE.to_string(),
            session: Mutex::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/oauth2/v2.0/{}", self.authority, self.tenant, path)
    }

    #[instrument(skip(self), fields(tenant = %self.tenant), err)]
    async fn start_device_flow(&self) -> ClientResult<DeviceCodeResponse> {
        let response = self
            .http_client
            .post(self.endpoint("devicecode"))
            .form(&[("client_id", self.client_id.as_str()), ("scope", self.scope.as_str())])
            .send()
            .await
            .map_err(|e| ClientError::Authentication {
                message: format!("Failed to request device code: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Device code request failed with status {}: {}", status, error_text);
            return Err(ClientError::Authentication {
                message: format!("Device code request rejected ({}): {}", status, error_text),
            });
        }

        response.json().await.map_err(|e| ClientError::Authentication {
            message: format!("Failed to parse device code response: {}", e),
        })
    }

    async fn poll_for_token(&self, device: &DeviceCodeResponse) -> ClientResult<CachedSession> {
        let deadline = current_time_secs() + device.expires_in;
        let mut interval = device.interval.max(1);

        loop {
            tokio::time::sleep(Duration::from_secs(interval)).await;

            if current_time_secs() >= deadline {
                return Err(ClientError::Authentication {
                    message: "Device code expired before sign-in completed".to_string(),
                });
            }

            let form = [
                ("grant_type", DEVICE_CODE_GRANT),
                ("client_id", self.client_id.as_str()),
                ("device_code", device.device_code.as_str()),
            ];

            match self.request_token(&form).await? {
                Ok(session) => return Ok(session),
                Err(token_error) => match token_error.error.as_str() {
                    "authorization_pending" => {
                        debug!("Waiting for device sign-in to complete");
                    }
                    "slow_down" => {
                        interval += 5;
                        debug!("Token endpoint asked to slow down, polling every {}s", interval);
                    }
                    other => {
                        return Err(ClientError::Authentication {
                            message: format!(
                                "{}: {}",
                                other,
                                token_error.error_description.unwrap_or_default()
                            ),
                        });
                    }
                },
            }
        }
    }

    /// POST to the token endpoint; the inner `Err` is a protocol-level OAuth error
    async fn request_token(
        &self,
        form: &[(&str, &str)],
    ) -> ClientResult<Result<CachedSession, TokenErrorResponse>> {
        let response = self
            .http_client
            .post(self.endpoint("token"))
            .form(form)
            .send()
            .await
            .map_err(|e| ClientError::Authentication {
                message: format!("Failed to call token endpoint: {}", e),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ClientError::Authentication {
            message: format!("Failed to read token response: {}", e),
        })?;

        if status.is_success() {
            let token: TokenResponse = serde_json::from_str(&body)?;
            let access = match token.expires_in {
                Some(expires_in) => {
                    AccessToken::with_expiry(token.access_token, current_time_secs() + expires_in)
                }
                None => AccessToken::new(token.access_token),
            };
            Ok(Ok(CachedSession {
                access,
                refresh_token: token.refresh_token,
            }))
        } else {
            let token_error: TokenErrorResponse =
                serde_json::from_str(&body).map_err(|_| ClientError::Authentication {
                    message: format!("Token endpoint returned {}: {}", status, body),
                })?;
            Ok(Err(token_error))
        }
    }

    async fn refresh(&self, refresh_token: &str) -> ClientResult<CachedSession> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("refresh_token", refresh_token),
            ("scope", self.scope.as_str()),
        ];

        self.request_token(&form)
            .await?
            .map_err(|token_error| ClientError::Authentication {
                message: format!(
                    "Token refresh failed: {} {}",
                    token_error.error,
                    token_error.error_description.unwrap_or_default()
                ),
            })
    }

    async fn interactive_login(&self) -> ClientResult<CachedSession> {
        let device = self.start_device_flow().await?;
        let prompt = device.message.clone().unwrap_or_else(|| {
            format!(
                "To sign in, open {} and enter the code {}",
                device.verification_uri, device.user_code
            )
        });
        info!("{}", prompt);
        eprintln!("{}", prompt);

        let session = self.poll_for_token(&device).await?;
        info!("Signed in to tenant {}", self.tenant);
        Ok(session)
    }
}

#[async_trait]
impl TokenCredential for DeviceCodeCredential {
    async fn access_token(&self) -> ClientResult<AccessToken> {
        let mut cached = self.session.lock().await;

        if let Some(session) = cached.as_ref() {
            if !session.access.needs_refresh() {
                return Ok(session.access.clone());
            }
        }

        let refreshed = match cached.as_ref().and_then(|s| s.refresh_token.clone()) {
            Some(refresh_token) => match self.refresh(&refresh_token).await {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Silent token refresh failed, signing in again: {}", e);
                    None
                }
            },
            None => None,
        };

        let session = match refreshed {
            Some(session) => session,
            None => self.interactive_login().await?,
        };

        let access = session.access.clone();
        *cached = Some(session);
        Ok(access)
    }
}
