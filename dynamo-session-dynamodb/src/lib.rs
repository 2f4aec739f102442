//! # DynamoDB session backend
//!
//! [`DynamoDbBackend`] stores sessions in a DynamoDB table through
//! `aws-sdk-dynamodb`. The table needs a string partition key named `id`;
//! enable DynamoDB TTL on the `ttl` attribute so expired sessions are
//! removed by the service.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dynamo_session_core::{SessionConfig, SessionInterface};
//! use dynamo_session_dynamodb::{CredentialsSource, DynamoDbBackend};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::from_env()?
//!         .with_region("us-east-1")
//!         .with_endpoint_url("http://localhost:4566");
//!
//!     let backend = DynamoDbBackend::connect_with_credentials(
//!         &config,
//!         CredentialsSource::Profile("dev".to_string()),
//!     )
//!     .await?;
//!
//!     let sessions = SessionInterface::new(config, Arc::new(backend))?;
//!     Ok(())
//! }
//! ```

mod backend;
mod config;
mod error;
pub mod item;

pub use backend::DynamoDbBackend;
pub use config::CredentialsSource;
