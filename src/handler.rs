//! GraphQL gateway and context injection
//!
//! Provides helpers for:
//! - Extracting the caller identity from HTTP headers
//! - Building the per-request execution context
//! - Standard Axum handler for the GraphQL endpoint

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::{Request, Response as GraphQLResponse};
use axum::{extract::Extension, http::HeaderMap, Json};
use tracing::info;
use uuid::Uuid;

use crate::cms::ContentCrud;
use crate::context::{ApiContext, GatewayOptions};
use crate::forms::FormsCrud;
use crate::identity::Identity;
use crate::schema::ApiSchema;
use crate::security::SecurityGateway;
use crate::users::SecurityCrud;

/// Extract the caller identity from `x-identity-*` headers.
///
/// Requests without identity headers get a fresh anonymous identity. The
/// optional `x-identity-claims` header carries a JSON object of verified
/// extra claims; token verification itself happens upstream of this layer.
pub fn extract_identity(headers: &HeaderMap) -> Identity {
    let id = headers
        .get("x-identity-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let identity_type = headers
        .get("x-identity-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous")
        .to_string();

    let claims: HashMap<String, serde_json::Value> = headers
        .get("x-identity-claims")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();

    Identity {
        id,
        identity_type,
        claims,
    }
}

/// Gateway owning the collaborator handles shared across requests.
///
/// The handles themselves are immutable; every request gets its own
/// [`ApiContext`] built from them.
#[derive(Clone)]
pub struct ApiGateway {
    security: Arc<dyn SecurityCrud>,
    forms: Arc<dyn FormsCrud>,
    cms: Arc<dyn ContentCrud>,
    permissions: Arc<dyn SecurityGateway>,
    options: GatewayOptions,
}

impl ApiGateway {
    pub fn new(
        security: Arc<dyn SecurityCrud>,
        forms: Arc<dyn FormsCrud>,
        cms: Arc<dyn ContentCrud>,
        permissions: Arc<dyn SecurityGateway>,
        options: GatewayOptions,
    ) -> Self {
        Self {
            security,
            forms,
            cms,
            permissions,
            options,
        }
    }

    /// Build the execution context for one request.
    pub fn context(&self, identity: Identity) -> ApiContext {
        ApiContext {
            identity,
            security: self.security.clone(),
            forms: self.forms.clone(),
            cms: self.cms.clone(),
            permissions: self.permissions.clone(),
            options: self.options.clone(),
        }
    }
}

/// Standard GraphQL handler with execution-context injection
///
/// Extracts the caller identity from headers, builds the request-scoped
/// context and executes the schema.
///
/// # Example
///
/// ```rust,no_run
/// use axum::{routing::post, Router};
/// use canopy_graphql::graphql_handler;
///
/// let app: Router = Router::new().route("/graphql", post(graphql_handler));
/// ```
pub async fn graphql_handler(
    Extension(schema): Extension<ApiSchema>,
    Extension(gateway): Extension<Arc<ApiGateway>>,
    headers: HeaderMap,
    req: Json<Request>,
) -> Json<GraphQLResponse> {
    let identity = extract_identity(&headers);
    info!(identity = %identity.id, identity_type = %identity.identity_type, "graphql request");

    let request = req.0.data(gateway.context(identity));
    let response = schema.execute(request).await;

    Json(response)
}
