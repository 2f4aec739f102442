//! DynamoDB session backend.

use crate::config::{CredentialsSource, load_sdk_config};
use crate::error::from_sdk;
use crate::item::{self, DATA_ATTRIBUTE, DEFAULT_TTL_ATTRIBUTE, UPDATE_EXPRESSION};
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use dynamo_session_core::{
    BackendResult, KeyValueBackend, SessionConfig, SessionError, SessionResult, StoredSession,
};
use tracing::{debug, info};

/// DynamoDB-backed session storage.
///
/// Items are keyed by the string attribute `id`, hold the codec payload in
/// `data`, and carry their expiry as epoch seconds in the TTL attribute
/// (`ttl` unless overridden). Enable DynamoDB's native TTL on that attribute
/// so stale sessions are eventually removed by the service.
///
/// The wrapped [`Client`] is cheap to clone and safe to share across
/// concurrent requests.
///
/// # Examples
///
/// ```no_run
/// use dynamo_session_core::{SessionConfig, SessionInterface};
/// use dynamo_session_dynamodb::DynamoDbBackend;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SessionConfig::new("app-sessions")
///     .with_region("us-east-1")
///     .with_consistent_read(true);
///
/// let backend = DynamoDbBackend::connect(&config).await?;
/// let sessions = SessionInterface::new(config, Arc::new(backend))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DynamoDbBackend {
    client: Client,
    table_name: String,
    ttl_attribute: String,
}

impl DynamoDbBackend {
    /// Wrap an existing client.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            ttl_attribute: DEFAULT_TTL_ATTRIBUTE.to_string(),
        }
    }

    /// Build a client from the session configuration using the default
    /// credential chain.
    pub async fn connect(config: &SessionConfig) -> SessionResult<Self> {
        Self::connect_with_credentials(config, CredentialsSource::Auto).await
    }

    /// Build a client from the session configuration and an explicit
    /// credentials source.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] when no region is configured and
    /// none can be found in the environment.
    pub async fn connect_with_credentials(
        config: &SessionConfig,
        credentials: CredentialsSource,
    ) -> SessionResult<Self> {
        let sdk_config = load_sdk_config(config, &credentials).await;

        if sdk_config.region().is_none() {
            return Err(SessionError::Config(
                "AWS region not specified; set SESSION_DYNAMODB_REGION or AWS_REGION".to_string(),
            ));
        }

        let client = Client::new(&sdk_config);
        info!(
            table = %config.table_name,
            region = ?sdk_config.region(),
            endpoint = ?config.endpoint_url,
            "DynamoDB session client initialized"
        );

        Ok(Self::new(client, config.table_name.clone()))
    }

    /// Override the TTL attribute name.
    pub fn with_ttl_attribute(mut self, name: impl Into<String>) -> Self {
        self.ttl_attribute = name.into();
        self
    }

    /// Table holding the sessions.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// TTL attribute name.
    pub fn ttl_attribute(&self) -> &str {
        &self.ttl_attribute
    }

    /// The underlying SDK client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl KeyValueBackend for DynamoDbBackend {
    async fn get(&self, id: &str, consistent_read: bool) -> BackendResult<Option<StoredSession>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(item::key(id)))
            .consistent_read(consistent_read)
            .send()
            .await
            .map_err(|e| from_sdk("get", e))?;

        match output.item() {
            Some(found) => item::parse_item(id, found, &self.ttl_attribute).map(Some),
            None => {
                debug!(session_id = id, table = %self.table_name, "No session item");
                Ok(None)
            }
        }
    }

    async fn put(&self, id: &str, payload: &str, expires_at: DateTime<Utc>) -> BackendResult<()> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(item::key(id)))
            .update_expression(UPDATE_EXPRESSION)
            .expression_attribute_names("#data", DATA_ATTRIBUTE)
            .expression_attribute_names("#ttl", &self.ttl_attribute)
            .expression_attribute_values(":data", AttributeValue::S(payload.to_string()))
            .expression_attribute_values(":ttl", AttributeValue::N(expires_at.timestamp().to_string()))
            .send()
            .await
            .map_err(|e| from_sdk("put", e))?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> BackendResult<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(item::key(id)))
            .send()
            .await
            .map_err(|e| from_sdk("delete", e))?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "dynamodb"
    }
}
