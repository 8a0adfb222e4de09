//! Security service - user and group management
//!
//! Resolvers follow the platform's uniform protocol: authorize against the
//! caller's permission record, delegate to the CRUD collaborator, and map
//! every outcome into the response envelope. Users are keyed by login and
//! carry a deterministic gravatar URL derived from it.

use async_graphql::{ComplexObject, Context, InputObject, Object, SimpleObject};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::api_context;
use crate::response::{ListMeta, ListResponse, Response};
use crate::security::resources;
use crate::CrudResult;

/// Security group a user belongs to.
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub slug: String,
    pub name: String,
}

/// Platform user, keyed by login.
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[graphql(complex)]
pub struct User {
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub group: Option<Group>,
}

#[ComplexObject]
impl User {
    /// Avatar URL derived from the login.
    async fn gravatar(&self) -> String {
        gravatar(&self.login)
    }
}

/// Gravatar URL for a login.
pub fn gravatar(login: &str) -> String {
    format!("https://www.gravatar.com/avatar/{:x}", md5::compute(login))
}

#[derive(InputObject, Debug, Clone)]
pub struct UserCreateInput {
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    /// Slug of the group the user is assigned to.
    pub group: Option<String>,
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct UserUpdateInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub group: Option<String>,
}

#[derive(InputObject, Debug, Clone)]
pub struct GroupInput {
    pub slug: String,
    pub name: String,
}

#[derive(InputObject, Debug, Clone)]
pub struct InstallInput {
    pub first_name: String,
    pub last_name: String,
    pub login: String,
}

/// CRUD collaborator backing the security service.
///
/// All persistence goes through this contract; resolvers never touch storage
/// directly. Failures carry the structured `code`/`message`/`data` triple.
#[async_trait]
pub trait SecurityCrud: Send + Sync {
    async fn get_user(&self, login: &str) -> CrudResult<Option<User>>;
    async fn list_users(&self) -> CrudResult<Vec<User>>;
    async fn create_user(&self, data: UserCreateInput) -> CrudResult<User>;
    async fn update_user(&self, login: &str, data: UserUpdateInput) -> CrudResult<User>;
    async fn delete_user(&self, login: &str) -> CrudResult<bool>;
    async fn get_group(&self, slug: &str) -> CrudResult<Option<Group>>;
    async fn create_group(&self, data: GroupInput) -> CrudResult<Group>;
    /// Seed the default admin user and the `full-access` group.
    async fn install(&self, data: InstallInput) -> CrudResult<()>;
}

fn user_not_found(login: &str) -> String {
    format!(r#"User "{}" was not found!"#, login)
}

pub struct SecurityQuery;

#[Object]
impl SecurityQuery {
    async fn get_user(&self, ctx: &Context<'_>, login: String) -> Response<User> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::SECURITY_USER, 'r').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        match api.security.get_user(&login).await {
            Ok(Some(user)) => Response::ok(user),
            Ok(None) => Response::not_found(user_not_found(&login)),
            Err(err) => Response::from_error(err),
        }
    }

    async fn list_users(&self, ctx: &Context<'_>) -> ListResponse<User> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return ListResponse::from_error(err),
        };
        match api.authorize(resources::SECURITY_USER, 'r').await {
            Ok(true) => {}
            Ok(false) => return ListResponse::not_authorized(),
            Err(err) => return ListResponse::from_error(err),
        }

        match api.security.list_users().await {
            Ok(users) => {
                let meta = ListMeta {
                    cursor: None,
                    has_more_items: false,
                    total_count: users.len() as i64,
                };
                ListResponse::ok(users, meta)
            }
            Err(err) => ListResponse::from_error(err),
        }
    }

    async fn get_group(&self, ctx: &Context<'_>, slug: String) -> Response<Group> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::SECURITY_GROUP, 'r').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        match api.security.get_group(&slug).await {
            Ok(Some(group)) => Response::ok(group),
            Ok(None) => Response::not_found(format!(r#"Group "{}" was not found!"#, slug)),
            Err(err) => Response::from_error(err),
        }
    }
}

pub struct SecurityMutation;

#[Object]
impl SecurityMutation {
    /// Seed the default admin user and the `full-access` group. Runs during
    /// platform setup, before any permission records exist.
    async fn install(&self, ctx: &Context<'_>, data: InstallInput) -> Response<bool> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };

        match api.security.install(data).await {
            Ok(()) => {
                info!("security installed");
                Response::ok(true)
            }
            Err(err) => Response::from_error(err),
        }
    }

    async fn create_group(&self, ctx: &Context<'_>, data: GroupInput) -> Response<Group> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::SECURITY_GROUP, 'w').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        match api.security.create_group(data).await {
            Ok(group) => Response::ok(group),
            Err(err) => Response::from_error(err),
        }
    }

    async fn create_user(&self, ctx: &Context<'_>, data: UserCreateInput) -> Response<User> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::SECURITY_USER, 'w').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        match api.security.create_user(data).await {
            Ok(user) => {
                info!(login = %user.login, "user created");
                Response::ok(user)
            }
            Err(err) => Response::from_error(err),
        }
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        login: String,
        data: UserUpdateInput,
    ) -> Response<User> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::SECURITY_USER, 'w').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        let existing = match api.security.get_user(&login).await {
            Ok(Some(user)) => user,
            Ok(None) => return Response::not_found(user_not_found(&login)),
            Err(err) => return Response::from_error(err),
        };

        if let Err(err) = api.security.update_user(&existing.login, data).await {
            return Response::from_error(err);
        }

        match api.security.get_user(&login).await {
            Ok(Some(user)) => Response::ok(user),
            Ok(None) => Response::not_found(user_not_found(&login)),
            Err(err) => Response::from_error(err),
        }
    }

    async fn delete_user(&self, ctx: &Context<'_>, login: String) -> Response<bool> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::SECURITY_USER, 'd').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        let existing = match api.security.get_user(&login).await {
            Ok(Some(user)) => user,
            Ok(None) => return Response::not_found(user_not_found(&login)),
            Err(err) => return Response::from_error(err),
        };

        match api.security.delete_user(&existing.login).await {
            Ok(deleted) => Response::ok(deleted),
            Err(err) => Response::from_error(err),
        }
    }
}
