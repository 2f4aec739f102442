// dynamo-session - Server-side HTTP sessions persisted in DynamoDB
//
// The core crate owns the session record, payload codec, identifier transport
// and open/save orchestration; storage adapters and framework glue are
// optional members behind features.

// Re-export core functionality
pub use dynamo_session_core::*;

// Re-export optional crates
#[cfg(feature = "dynamodb")]
pub use dynamo_session_dynamodb;

#[cfg(feature = "dynamodb")]
pub use dynamo_session_dynamodb::{CredentialsSource, DynamoDbBackend};

#[cfg(feature = "tower")]
pub use dynamo_session_tower;

#[cfg(feature = "tower")]
pub use dynamo_session_tower::{SessionHandle, SessionLayer, SessionService};

// Prelude for common imports
pub mod prelude {
    pub use dynamo_session_core::prelude::*;

    #[cfg(feature = "dynamodb")]
    pub use dynamo_session_dynamodb::DynamoDbBackend;

    #[cfg(feature = "tower")]
    pub use dynamo_session_tower::{SessionHandle, SessionLayer};
}
