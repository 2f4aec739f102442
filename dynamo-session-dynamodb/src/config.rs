//! AWS SDK configuration for the DynamoDB backend.

use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use dynamo_session_core::SessionConfig;
use serde::{Deserialize, Serialize};

/// Credentials source for AWS authentication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialsSource {
    /// Auto-detect credentials (default AWS SDK chain: environment, profile,
    /// web identity, container and instance roles).
    #[default]
    Auto,
    /// Use a named profile from `~/.aws/credentials`.
    Profile(String),
    /// Use explicit credentials.
    Explicit {
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    },
}

impl CredentialsSource {
    /// Explicit static credentials.
    pub fn explicit(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self::Explicit {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }
}

/// Build the AWS SDK configuration from the session settings.
///
/// Region and endpoint come from the session config; every operation is
/// bounded by `backend_timeout` on the SDK side as well.
pub(crate) async fn load_sdk_config(
    config: &SessionConfig,
    credentials: &CredentialsSource,
) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest()).timeout_config(
        TimeoutConfig::builder()
            .operation_timeout(config.backend_timeout)
            .build(),
    );

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }

    match credentials {
        CredentialsSource::Profile(profile) => {
            loader = loader.profile_name(profile);
        }
        CredentialsSource::Explicit {
            access_key_id,
            secret_access_key,
            session_token,
        } => {
            let creds = aws_credential_types::Credentials::new(
                access_key_id,
                secret_access_key,
                session_token.clone(),
                None,
                "dynamo-session",
            );
            loader = loader.credentials_provider(creds);
        }
        CredentialsSource::Auto => {}
    }

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}
