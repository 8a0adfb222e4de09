//! Schema assembly
//!
//! The three services hang off namespace fields, so callers address
//! operations as `security { createUser }`, `formBuilder { publishRevision }`
//! and `cms { listEntries }`.

use async_graphql::{EmptySubscription, Object, Schema};

use crate::cms::{CmsMutation, CmsQuery};
use crate::forms::{FormsMutation, FormsQuery};
use crate::users::{SecurityMutation, SecurityQuery};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn security(&self) -> SecurityQuery {
        SecurityQuery
    }

    async fn form_builder(&self) -> FormsQuery {
        FormsQuery
    }

    async fn cms(&self) -> CmsQuery {
        CmsQuery
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn security(&self) -> SecurityMutation {
        SecurityMutation
    }

    async fn form_builder(&self) -> FormsMutation {
        FormsMutation
    }

    async fn cms(&self) -> CmsMutation {
        CmsMutation
    }
}

/// GraphQL schema type
pub type ApiSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Assemble the platform schema.
pub fn build_schema() -> ApiSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription).finish()
}
