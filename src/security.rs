//! Permission model and the security subsystem contract
//!
//! Permissions follow an additive "rwd" flag model: a permission record with
//! no `rwd` string grants everything for its resource, and a record whose
//! `rwd` string lacks a needed letter is the only way to deny.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::CrudResult;

/// Permission record granted to an identity for one named resource.
///
/// `rwd` characters are a subset of `r` (read), `w` (write), `d` (delete)
/// and `p` (publish). A missing `rwd` means unrestricted access to the
/// resource. The security subsystem keys records by `name`, at most one per
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub name: String,
    pub rwd: Option<String>,
}

impl Permission {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rwd: None,
        }
    }

    /// Restrict the permission to the given flag characters.
    pub fn with_rwd(mut self, rwd: impl Into<String>) -> Self {
        self.rwd = Some(rwd.into());
        self
    }
}

/// Check whether a permission grants the required flag.
///
/// An absent permission record, or one without an `rwd` string, encodes no
/// restriction and grants access. Otherwise access is granted iff the flag
/// occurs in the string.
pub fn has_rwd(permission: Option<&Permission>, flag: char) -> bool {
    match permission {
        None => true,
        Some(permission) => match &permission.rwd {
            None => true,
            Some(rwd) => rwd.contains(flag),
        },
    }
}

/// Decision applied when the security subsystem has no permission record at
/// all for a resource.
///
/// The platform historically treats a missing record as full access. That
/// fail-open default is preserved here but made explicit; deployments that
/// want deny-by-default opt into `Deny` through
/// [`GatewayOptions`](crate::GatewayOptions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPermissionPolicy {
    #[default]
    Allow,
    Deny,
}

/// Security subsystem consumed by the resolvers.
///
/// Returns the caller's permission record for a stable resource name, or
/// `None` when no record exists for it.
#[async_trait]
pub trait SecurityGateway: Send + Sync {
    async fn get_permission(&self, name: &str) -> CrudResult<Option<Permission>>;
}

/// Resource names the services check permissions against.
pub mod resources {
    pub const SECURITY_USER: &str = "security.user";
    pub const SECURITY_GROUP: &str = "security.group";
    pub const FORMS: &str = "forms.forms";
    pub const CMS_ENTRY: &str = "cms.contentEntry";
}
