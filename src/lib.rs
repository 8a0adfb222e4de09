//! # canopy-graphql
//!
//! Multi-tenant GraphQL API services for the Canopy platform.
//!
//! ## Features
//!
//! - **Security** - user and group management with permission-gated access
//! - **Form Builder** - form revisions with a draft/published lifecycle
//! - **Headless CMS** - content entry read API with filtering and cursors
//! - **Response Envelope** - uniform `{data, error}` / `{data, meta, error}` shapes
//! - **Gateway** - Axum handler building a per-request execution context
//!
//! ## Usage
//!
//! ```rust,ignore
//! use canopy_graphql::{build_schema, ApiGateway};
//!
//! let gateway = ApiGateway::new(security, forms, cms, permissions, options);
//! let schema = build_schema();
//! ```

pub mod cms;
pub mod context;
pub mod forms;
pub mod handler;
pub mod identity;
pub mod pagination;
pub mod response;
pub mod schema;
pub mod security;
pub mod types;
pub mod users;

pub use context::{ApiContext, GatewayOptions};
pub use handler::{graphql_handler, ApiGateway};
pub use identity::Identity;
pub use pagination::{CursorCodec, ListParams};
pub use response::{ListMeta, ListResponse, Response, ResponseError};
pub use schema::{build_schema, ApiSchema, MutationRoot, QueryRoot};
pub use security::{has_rwd, MissingPermissionPolicy, Permission, SecurityGateway};
pub use types::DateTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code reported when an entity lookup comes back empty.
pub const NOT_FOUND: &str = "NOT_FOUND";

/// Structured error raised by CRUD collaborators.
///
/// Carries the `code`/`message`/`data` triple that is surfaced verbatim in
/// the response envelope. Collaborators return this instead of letting
/// failures escape as GraphQL field errors.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct CrudError {
    pub code: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl CrudError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Attach a structured payload to the error.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Result type for collaborator operations
pub type CrudResult<T> = std::result::Result<T, CrudError>;
