use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument};

use super::auth::TokenCredential;
use super::errors::{ClientError, ClientResult};
use super::traits::ApimApi;
use super::types::*;
use crate::services::config::NetworkConfig;

/// Client for the API Management resource provider of Azure Resource Manager
#[derive(Clone)]
pub struct ArmClient {
    pub(crate) http_client: Client,
    credential: Arc<dyn TokenCredential>,
    endpoint: String,
    subscription_id: String,
    api_version: String,
}

impl ArmClient {
    pub fn new(
        http_client: Client,
        credential: Arc<dyn TokenCredential>,
        subscription_id: &str,
        network: &NetworkConfig,
    ) -> Self {
        Self {
            http_client,
            credential,
            endpoint: network.management_endpoint.trim_end_matches('/').to_string(),
            subscription_id: subscription_id.to_string(),
            api_version: network.api_version.clone(),
        }
    }

    /// Shared HTTP client honouring the network settings
    pub fn build_http_client(network: &NetworkConfig) -> ClientResult<Client> {
        Client::builder()
            .user_agent(network.user_agent.as_str())
            .timeout(Duration::from_millis(network.request_timeout_ms))
            .build()
            .map_err(|e| ClientError::Network {
                message: format!("Failed to create HTTP client: {}", e),
            })
    }

    /// `{endpoint}{service path}/{segments...}?api-version=...`
    ///
    /// Every identifier becomes its own percent-encoded path segment.
    pub(crate) fn service_url(&self, service: &ServiceLocator, segments: &[&str]) -> ClientResult<Url> {
        let invalid = |message: &str| ClientError::InvalidUrl {
            url: self.endpoint.clone(),
            message: message.to_string(),
        };

        let mut url = Url::parse(&self.endpoint).map_err(|e| invalid(&e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend([
                "subscriptions",
                self.subscription_id.as_str(),
                "resourceGroups",
                service.resource_group.as_str(),
                "providers",
            ])
            .extend(APIM_PROVIDER.split('/'))
            .push(&service.service_name)
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    /// Attach the bearer token, fetching or refreshing it as needed
    pub(crate) async fn authorized(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        let token = self.credential.access_token().await?;
        Ok(request.header("Authorization", token.bearer()))
    }

    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        operation: &str,
    ) -> ClientResult<Page<T>> {
        debug!("[ArmClient] {} GET {}", operation, url);
        let request = self.authorized(self.http_client.get(url)).await?;
        let response = send(request, operation).await?;
        let response = check_status(response, operation, url).await?;

        response.json().await.map_err(|e| ClientError::InvalidResponse {
            expected: format!("{} page", operation),
            got: e.to_string(),
        })
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
        resource: &str,
    ) -> ClientResult<T> {
        let request = self.authorized(request).await?;
        let response = send(request, operation).await?;
        let response = check_status(response, operation, resource).await?;

        response.json().await.map_err(|e| ClientError::InvalidResponse {
            expected: format!("{} response body", operation),
            got: e.to_string(),
        })
    }

    pub(crate) async fn send_empty(
        &self,
        request: RequestBuilder,
        operation: &str,
        resource: &str,
    ) -> ClientResult<()> {
        let request = self.authorized(request).await?;
        let response = send(request, operation).await?;
        check_status(response, operation, resource).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder, operation: &str) -> ClientResult<Response> {
    request.send().await.map_err(|e| ClientError::Network {
        message: format!("Failed to call {}: {}", operation, e),
    })
}

/// Map non-success statuses onto `ClientError`
async fn check_status(response: Response, operation: &str, resource: &str) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound {
            resource: resource.to_string(),
        });
    }

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        error!("{} was not authorized ({}): {}", operation, status, error_text);
        return Err(ClientError::Authentication {
            message: format!("{} rejected with {}: {}", operation, status, error_text),
        });
    }

    error!("{} failed with status {}: {}", operation, status, error_text);
    Err(ClientError::Api {
        operation: operation.to_string(),
        status: status.as_u16(),
        message: error_text,
    })
}

#[async_trait]
impl ApimApi for ArmClient {
    #[instrument(skip(self), err)]
    async fn list_users(&self, service: &ServiceLocator) -> ClientResult<Page<UserContract>> {
        super::api::list_users_impl(self, service).await
    }

    #[instrument(skip(self), err)]
    async fn list_users_next(&self, next_link: &str) -> ClientResult<Page<UserContract>> {
        super::api::list_users_next_impl(self, next_link).await
    }

    #[instrument(skip(self), err)]
    async fn list_groups(&self, service: &ServiceLocator) -> ClientResult<Page<GroupContract>> {
        super::api::list_groups_impl(self, service).await
    }

    #[instrument(skip(self), err)]
    async fn list_groups_next(&self, next_link: &str) -> ClientResult<Page<GroupContract>> {
        super::api::list_groups_next_impl(self, next_link).await
    }

    #[instrument(skip(self), err)]
    async fn list_group_users(
        &self,
        service: &ServiceLocator,
        group_id: &str,
    ) -> ClientResult<Page<UserContract>> {
        super::api::list_group_users_impl(self, service, group_id).await
    }

    #[instrument(skip(self), err)]
    async fn list_group_users_next(&self, next_link: &str) -> ClientResult<Page<UserContract>> {
        super::api::list_group_users_next_impl(self, next_link).await
    }

    #[instrument(skip(self), err)]
    async fn list_subscriptions(
        &self,
        service: &ServiceLocator,
    ) -> ClientResult<Page<SubscriptionContract>> {
        super::api::list_subscriptions_impl(self, service).await
    }

    #[instrument(skip(self), err)]
    async fn list_subscriptions_next(
        &self,
        next_link: &str,
    ) -> ClientResult<Page<SubscriptionContract>> {
        super::api::list_subscriptions_next_impl(self, next_link).await
    }

    #[instrument(skip(self, parameters), err)]
    async fn create_or_update_user(
        &self,
        service: &ServiceLocator,
        user_id: &str,
        parameters: &UserCreateParameters,
    ) -> ClientResult<UserContract> {
        super::api::create_or_update_user_impl(self, service, user_id, parameters).await
    }

    #[instrument(skip(self), err)]
    async fn create_group_user(
        &self,
        service: &ServiceLocator,
        group_id: &str,
        user_id: &str,
    ) -> ClientResult<UserContract> {
        super::api::create_group_user_impl(self, service, group_id, user_id).await
    }

    #[instrument(skip(self, parameters), err)]
    async fn create_or_update_subscription(
        &self,
        service: &ServiceLocator,
        subscription_id: &str,
        parameters: &SubscriptionCreateParameters,
    ) -> ClientResult<SubscriptionContract> {
        super::api::create_or_update_subscription_impl(self, service, subscription_id, parameters)
            .await
    }

    #[instrument(skip(self), err)]
    async fn delete_user(
        &self,
        service: &ServiceLocator,
        user_id: &str,
        if_match: &str,
        options: DeleteUserOptions,
    ) -> ClientResult<()> {
        super::api::delete_user_impl(self, service, user_id, if_match, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::client::auth::{AccessToken, StaticTokenCredential};

    fn client() -> ArmClient {
        let network = NetworkConfig::default();
        ArmClient::new(
            Client::new(),
            Arc::new(StaticTokenCredential::new(AccessToken::new("token"))),
            "00000000-0000-0000-0000-000000000000",
            &network,
        )
    }

    #[test]
    fn test_service_url() {
        let url = client()
            .service_url(&ServiceLocator::new("rg-src", "apim-src"), &["users"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://management.azure.com/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg-src/providers/Microsoft.ApiManagement/service/apim-src/users?api-version=2021-08-01"
        );
    }

    #[test]
    fn test_service_url_encodes_identifiers() {
        let url = client()
            .service_url(
                &ServiceLocator::new("rg-src", "apim-src"),
                &["groups", "Partner Team #2", "users", "a/b"],
            )
            .unwrap();
        assert!(url
            .as_str()
            .ends_with("/service/apim-src/groups/Partner%20Team%20%232/users/a%2Fb?api-version=2021-08-01"));
    }

    #[test]
    fn test_invalid_endpoint_is_reported() {
        let network = NetworkConfig {
            management_endpoint: "not a url".to_string(),
            ..NetworkConfig::default()
        };
        let client = ArmClient::new(
            Client::new(),
            Arc::new(StaticTokenCredential::new(AccessToken::new("token"))),
            "sub",
            &network,
        );
        assert!(matches!(
            client.service_url(&ServiceLocator::new("rg", "svc"), &["users"]),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_authorized_sets_bearer() {
        let client = client();
        let request = client
            .authorized(client.http_client.get("https://management.azure.com/"))
            .await
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.headers()["Authorization"], "Bearer token");
    }
}
