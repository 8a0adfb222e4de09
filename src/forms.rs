//! Form builder service - form revisions with a draft/published lifecycle
//!
//! `publishRevision` and `unPublishRevision` toggle a revision between the
//! `Draft` and `Published` states. The resolvers do not special-case a
//! revision that is already in the target state; that decision belongs to
//! the collaborator.

use async_graphql::{Context, Enum, InputObject, Object, SimpleObject, ID};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::api_context;
use crate::response::{ListMeta, ListResponse, Response};
use crate::security::resources;
use crate::types::DateTime;
use crate::CrudResult;

/// Lifecycle state of a form revision.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormStatus {
    Draft,
    Published,
}

/// A versioned form revision.
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub id: ID,
    pub name: String,
    pub version: i32,
    pub status: FormStatus,
    pub published: bool,
    pub created_on: DateTime,
    pub saved_on: DateTime,
}

#[derive(InputObject, Debug, Clone)]
pub struct FormCreateInput {
    pub name: String,
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct FormUpdateInput {
    pub name: Option<String>,
}

/// CRUD collaborator backing the form builder service.
#[async_trait]
pub trait FormsCrud: Send + Sync {
    async fn get_form(&self, id: &str) -> CrudResult<Option<Form>>;
    async fn list_forms(&self) -> CrudResult<Vec<Form>>;
    async fn create_form(&self, data: FormCreateInput) -> CrudResult<Form>;
    async fn update_form(&self, id: &str, data: FormUpdateInput) -> CrudResult<Form>;
    async fn delete_form(&self, id: &str) -> CrudResult<bool>;
    async fn publish_form(&self, id: &str) -> CrudResult<()>;
    async fn un_publish_form(&self, id: &str) -> CrudResult<()>;
}

fn form_not_found(id: &str) -> String {
    format!(r#"Form with id:"{}" not found!"#, id)
}

pub struct FormsQuery;

#[Object]
impl FormsQuery {
    async fn get_form(&self, ctx: &Context<'_>, id: ID) -> Response<Form> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::FORMS, 'r').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        match api.forms.get_form(&id).await {
            Ok(Some(form)) => Response::ok(form),
            Ok(None) => Response::not_found(form_not_found(&id)),
            Err(err) => Response::from_error(err),
        }
    }

    async fn list_forms(&self, ctx: &Context<'_>) -> ListResponse<Form> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return ListResponse::from_error(err),
        };
        match api.authorize(resources::FORMS, 'r').await {
            Ok(true) => {}
            Ok(false) => return ListResponse::not_authorized(),
            Err(err) => return ListResponse::from_error(err),
        }

        match api.forms.list_forms().await {
            Ok(forms) => {
                let meta = ListMeta {
                    cursor: None,
                    has_more_items: false,
                    total_count: forms.len() as i64,
                };
                ListResponse::ok(forms, meta)
            }
            Err(err) => ListResponse::from_error(err),
        }
    }
}

pub struct FormsMutation;

#[Object]
impl FormsMutation {
    async fn create_form(&self, ctx: &Context<'_>, data: FormCreateInput) -> Response<Form> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::FORMS, 'w').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        match api.forms.create_form(data).await {
            Ok(form) => {
                info!(id = %form.id.as_str(), "form created");
                Response::ok(form)
            }
            Err(err) => Response::from_error(err),
        }
    }

    async fn update_revision(
        &self,
        ctx: &Context<'_>,
        id: ID,
        data: FormUpdateInput,
    ) -> Response<Form> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::FORMS, 'w').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        let existing = match api.forms.get_form(&id).await {
            Ok(Some(form)) => form,
            Ok(None) => return Response::not_found(form_not_found(&id)),
            Err(err) => return Response::from_error(err),
        };

        if let Err(err) = api.forms.update_form(&existing.id, data).await {
            return Response::from_error(err);
        }

        match api.forms.get_form(&id).await {
            Ok(Some(form)) => Response::ok(form),
            Ok(None) => Response::not_found(form_not_found(&id)),
            Err(err) => Response::from_error(err),
        }
    }

    async fn delete_form(&self, ctx: &Context<'_>, id: ID) -> Response<bool> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::FORMS, 'd').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        let existing = match api.forms.get_form(&id).await {
            Ok(Some(form)) => form,
            Ok(None) => return Response::not_found(form_not_found(&id)),
            Err(err) => return Response::from_error(err),
        };

        match api.forms.delete_form(&existing.id).await {
            Ok(deleted) => Response::ok(deleted),
            Err(err) => Response::from_error(err),
        }
    }

    async fn publish_revision(&self, ctx: &Context<'_>, id: ID) -> Response<Form> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        // A permission with "rwd" set but missing "p" bails before any data access.
        match api.authorize(resources::FORMS, 'p').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        let existing = match api.forms.get_form(&id).await {
            Ok(Some(form)) => form,
            Ok(None) => return Response::not_found(form_not_found(&id)),
            Err(err) => return Response::from_error(err),
        };

        if let Err(err) = api.forms.publish_form(&existing.id).await {
            return Response::from_error(err);
        }

        match api.forms.get_form(&id).await {
            Ok(Some(form)) => Response::ok(form),
            Ok(None) => Response::not_found(form_not_found(&id)),
            Err(err) => Response::from_error(err),
        }
    }

    async fn un_publish_revision(&self, ctx: &Context<'_>, id: ID) -> Response<Form> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        // Same gate as publishing: the "p" flag covers both directions.
        match api.authorize(resources::FORMS, 'p').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        let existing = match api.forms.get_form(&id).await {
            Ok(Some(form)) => form,
            Ok(None) => return Response::not_found(form_not_found(&id)),
            Err(err) => return Response::from_error(err),
        };

        if let Err(err) = api.forms.un_publish_form(&existing.id).await {
            return Response::from_error(err);
        }

        match api.forms.get_form(&id).await {
            Ok(Some(form)) => Response::ok(form),
            Ok(None) => Response::not_found(form_not_found(&id)),
            Err(err) => Response::from_error(err),
        }
    }
}
