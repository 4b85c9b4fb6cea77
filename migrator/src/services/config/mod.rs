use std::fmt;

use crate::services::client::{AccessToken, ServiceLocator};
use crate::services::errors::{MigrationError, MigrationResult};

/// Everything one migration run needs, read once at startup
#[derive(Clone)]
pub struct MigratorConfig {
    pub source: ServiceLocator,
    pub destination: ServiceLocator,
    /// Product whose subscriptions are migrated
    pub product_id: String,
    /// Azure subscription holding both services
    pub subscription_id: String,
    pub tenant_domain: String,
    /// Delete destination users before migrating (destructive)
    pub cleanup_enabled: bool,
    pub concurrency: ConcurrencyConfig,
    pub network: NetworkConfig,
    /// Pre-issued bearer token; skips interactive login when set
    pub access_token: Option<AccessToken>,
}

/// In-flight limits per phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcurrencyConfig {
    pub users: usize,
    pub group_users: usize,
    pub subscriptions: usize,
    pub cleanup: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub management_endpoint: String,
    pub login_endpoint: String,
    pub api_version: String,
    pub request_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            users: 10,
            group_users: 10,
            // Subscriptions carry key material
            subscriptions: 5,
            cleanup: 10,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            management_endpoint: "https://management.azure.com".to_string(),
            login_endpoint: "https://login.microsoftonline.com".to_string(),
            api_version: "2021-08-01".to_string(),
            request_timeout_ms: 60_000,
            user_agent: concat!("apim-migrator/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl fmt::Debug for MigratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigratorConfig")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("product_id", &self.product_id)
            .field("subscription_id", &self.subscription_id)
            .field("tenant_domain", &self.tenant_domain)
            .field("cleanup_enabled", &self.cleanup_enabled)
            .field("concurrency", &self.concurrency)
            .field("network", &self.network)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl MigratorConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; missing keys become empty strings
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).unwrap_or_default();
        let mut network = NetworkConfig::default();
        if let Some(endpoint) = lookup("AZURE_MANAGEMENT_ENDPOINT").filter(|v| !v.is_empty()) {
            network.management_endpoint = endpoint;
        }
        if let Some(authority) = lookup("AZURE_AUTHORITY_HOST").filter(|v| !v.is_empty()) {
            network.login_endpoint = authority;
        }

        Self {
            source: ServiceLocator::new(var("SRC_RESOURCE_GROUP_NAME"), var("SRC_APIM_SERVICE_NAME")),
            destination: ServiceLocator::new(
                var("DEST_RESOURCE_GROUP_NAME"),
                var("DEST_APIM_SERVICE_NAME"),
            ),
            product_id: var("PRODUCT_ID"),
            subscription_id: var("SUBSCRIPTION_ID"),
            tenant_domain: var("TENANT_DOMAIN"),
            cleanup_enabled: lookup("MIGRATE_CLEANUP").map(|v| parse_flag(&v)).unwrap_or(false),
            concurrency: ConcurrencyConfig::default(),
            network,
            access_token: lookup("AZURE_ACCESS_TOKEN")
                .filter(|v| !v.is_empty())
                .map(AccessToken::new),
        }
    }

    pub fn validate(&self) -> MigrationResult<()> {
        let required = [
            ("SRC_RESOURCE_GROUP_NAME", &self.source.resource_group),
            ("SRC_APIM_SERVICE_NAME", &self.source.service_name),
            ("DEST_RESOURCE_GROUP_NAME", &self.destination.resource_group),
            ("DEST_APIM_SERVICE_NAME", &self.destination.service_name),
            ("PRODUCT_ID", &self.product_id),
            ("SUBSCRIPTION_ID", &self.subscription_id),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(MigrationError::Configuration {
                    field: field.to_string(),
                    message: "must be set".to_string(),
                });
            }
        }

        // Device code login needs a tenant; a pre-issued token does not
        if self.access_token.is_none() && self.tenant_domain.trim().is_empty() {
            return Err(MigrationError::Configuration {
                field: "TENANT_DOMAIN".to_string(),
                message: "must be set unless AZURE_ACCESS_TOKEN is provided".to_string(),
            });
        }

        let limits = [
            ("concurrency.users", self.concurrency.users),
            ("concurrency.group_users", self.concurrency.group_users),
            ("concurrency.subscriptions", self.concurrency.subscriptions),
            ("concurrency.cleanup", self.concurrency.cleanup),
        ];

        for (field, limit) in limits {
            if limit == 0 {
                return Err(MigrationError::Configuration {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }

        if self.network.request_timeout_ms == 0 {
            return Err(MigrationError::Configuration {
                field: "network.request_timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Scope that selects the migrated product's subscriptions on the source
    pub fn source_product_scope(&self) -> String {
        format!(
            "{}/products/{}",
            self.source.resource_path(&self.subscription_id),
            self.product_id.to_lowercase()
        )
    }

    /// Scope given to re-created subscriptions on the destination
    pub fn destination_product_scope(&self) -> String {
        format!("/products/{}", self.product_id)
    }
}
