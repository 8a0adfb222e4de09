//! Request-scoped execution context
//!
//! The gateway builds one [`ApiContext`] per request and injects it into the
//! GraphQL request data. Resolvers pull it back out with [`api_context`] and
//! go through [`ApiContext::authorize`] before touching any collaborator.

use std::sync::Arc;

use async_graphql::Context;
use serde::Deserialize;
use tracing::warn;

use crate::cms::ContentCrud;
use crate::forms::FormsCrud;
use crate::identity::Identity;
use crate::security::{has_rwd, MissingPermissionPolicy, SecurityGateway};
use crate::users::SecurityCrud;
use crate::{CrudError, CrudResult};

/// Gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayOptions {
    /// Access decision when no permission record exists for a resource.
    /// Defaults to `Allow`, the platform's historical fail-open behavior.
    #[serde(default)]
    pub missing_permission_policy: MissingPermissionPolicy,
}

/// Per-request bundle of collaborator handles and caller identity.
///
/// Constructed fresh for every request and discarded afterwards; nothing in
/// here is shared mutably across requests.
#[derive(Clone)]
pub struct ApiContext {
    pub identity: Identity,
    pub security: Arc<dyn SecurityCrud>,
    pub forms: Arc<dyn FormsCrud>,
    pub cms: Arc<dyn ContentCrud>,
    pub permissions: Arc<dyn SecurityGateway>,
    pub options: GatewayOptions,
}

impl ApiContext {
    /// Evaluate the caller's permission for `resource` against one flag.
    ///
    /// A present permission record that fails [`has_rwd`] denies access; an
    /// absent record falls back to the configured missing-permission policy.
    pub async fn authorize(&self, resource: &str, flag: char) -> CrudResult<bool> {
        let permission = self.permissions.get_permission(resource).await?;
        let granted = match (&permission, self.options.missing_permission_policy) {
            (None, MissingPermissionPolicy::Deny) => false,
            _ => has_rwd(permission.as_ref(), flag),
        };
        if !granted {
            warn!(
                resource,
                flag = %flag,
                identity = %self.identity.id,
                "permission denied"
            );
        }
        Ok(granted)
    }
}

/// Fetch the request-scoped context from the GraphQL context.
///
/// The surrounding framework is responsible for installing it; when it is
/// missing the resolver fails fast with an error envelope instead of
/// panicking.
pub fn api_context<'a>(ctx: &Context<'a>) -> CrudResult<&'a ApiContext> {
    ctx.data_opt::<ApiContext>().ok_or_else(|| {
        CrudError::new(
            "INTERNAL_SERVER_ERROR",
            "Execution context was not installed for this request.",
        )
    })
}
