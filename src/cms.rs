//! Headless CMS service - content entries
//!
//! Entries belong to a named content model and carry a dynamic values map
//! next to the indexed `title` attribute. The read API filters with a
//! where-input, orders with `field_ASC`/`field_DESC` sorters and pages with
//! a limit plus base64 cursor.

use std::cmp::Ordering;

use async_graphql::{Context, Enum, InputObject, Json, Object, SimpleObject, ID};
use async_trait::async_trait;

use crate::context::api_context;
use crate::pagination::ListParams;
use crate::response::{ListMeta, ListResponse, Response};
use crate::security::resources;
use crate::types::DateTime;
use crate::CrudResult;

/// A content entry of some model.
#[derive(SimpleObject, Debug, Clone)]
pub struct ContentEntry {
    pub id: ID,
    pub model: String,
    pub title: String,
    pub values: Json<serde_json::Value>,
    pub created_on: DateTime,
    pub updated_on: DateTime,
    pub saved_on: DateTime,
}

/// Filter applied to entry lookups and listings.
#[derive(InputObject, Debug, Clone, Default)]
pub struct EntryWhereInput {
    pub id: Option<ID>,
    #[graphql(name = "id_in")]
    pub id_in: Option<Vec<ID>>,
    pub title: Option<String>,
    #[graphql(name = "title_contains")]
    pub title_contains: Option<String>,
}

impl EntryWhereInput {
    /// Whether the entry satisfies every condition present in the filter.
    pub fn matches(&self, entry: &ContentEntry) -> bool {
        if let Some(id) = &self.id {
            if *id != entry.id {
                return false;
            }
        }
        if let Some(ids) = &self.id_in {
            if !ids.contains(&entry.id) {
                return false;
            }
        }
        if let Some(title) = &self.title {
            if *title != entry.title {
                return false;
            }
        }
        if let Some(fragment) = &self.title_contains {
            if !entry
                .title
                .to_lowercase()
                .contains(&fragment.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Sort order for entry listings.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySorter {
    #[graphql(name = "id_ASC")]
    IdAsc,
    #[graphql(name = "id_DESC")]
    IdDesc,
    #[graphql(name = "title_ASC")]
    TitleAsc,
    #[graphql(name = "title_DESC")]
    TitleDesc,
    #[graphql(name = "savedOn_ASC")]
    SavedOnAsc,
    #[graphql(name = "savedOn_DESC")]
    SavedOnDesc,
}

impl EntrySorter {
    pub fn compare(&self, a: &ContentEntry, b: &ContentEntry) -> Ordering {
        match self {
            EntrySorter::IdAsc => a.id.as_str().cmp(b.id.as_str()),
            EntrySorter::IdDesc => b.id.as_str().cmp(a.id.as_str()),
            EntrySorter::TitleAsc => a.title.cmp(&b.title),
            EntrySorter::TitleDesc => b.title.cmp(&a.title),
            EntrySorter::SavedOnAsc => a.saved_on.cmp(&b.saved_on),
            EntrySorter::SavedOnDesc => b.saved_on.cmp(&a.saved_on),
        }
    }
}

#[derive(InputObject, Debug, Clone)]
pub struct EntryCreateInput {
    pub title: String,
    pub values: Option<Json<serde_json::Value>>,
}

#[derive(InputObject, Debug, Clone, Default)]
pub struct EntryUpdateInput {
    pub title: Option<String>,
    pub values: Option<Json<serde_json::Value>>,
}

/// Listing request handed to the collaborator after the resolver has
/// validated limits and decoded the cursor.
#[derive(Debug, Clone)]
pub struct EntryListQuery {
    pub model: String,
    pub filter: Option<EntryWhereInput>,
    pub sort: Option<Vec<EntrySorter>>,
    pub limit: i32,
    pub offset: usize,
}

/// CRUD collaborator backing the CMS service.
///
/// `list_entries` returns the page plus the total match count; the resolver
/// derives the cursor metadata from those.
#[async_trait]
pub trait ContentCrud: Send + Sync {
    async fn get_entry(
        &self,
        model: &str,
        filter: EntryWhereInput,
    ) -> CrudResult<Option<ContentEntry>>;
    async fn get_entry_by_id(&self, id: &str) -> CrudResult<Option<ContentEntry>>;
    async fn list_entries(&self, query: EntryListQuery) -> CrudResult<(Vec<ContentEntry>, i64)>;
    async fn create_entry(&self, model: &str, data: EntryCreateInput) -> CrudResult<ContentEntry>;
    async fn update_entry(&self, id: &str, data: EntryUpdateInput) -> CrudResult<ContentEntry>;
    async fn delete_entry(&self, id: &str) -> CrudResult<bool>;
}

fn id_not_found(id: &str) -> String {
    format!(r#"Entry with id:"{}" not found!"#, id)
}

fn entry_not_found(filter: &EntryWhereInput) -> String {
    match &filter.id {
        Some(id) => id_not_found(id.as_str()),
        None => "Entry not found!".to_string(),
    }
}

pub struct CmsQuery;

#[Object]
impl CmsQuery {
    async fn get_entry(
        &self,
        ctx: &Context<'_>,
        model: String,
        #[graphql(name = "where")] filter: EntryWhereInput,
    ) -> Response<ContentEntry> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::CMS_ENTRY, 'r').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        match api.cms.get_entry(&model, filter.clone()).await {
            Ok(Some(entry)) => Response::ok(entry),
            Ok(None) => Response::not_found(entry_not_found(&filter)),
            Err(err) => Response::from_error(err),
        }
    }

    async fn list_entries(
        &self,
        ctx: &Context<'_>,
        model: String,
        #[graphql(name = "where")] filter: Option<EntryWhereInput>,
        sort: Option<Vec<EntrySorter>>,
        limit: Option<i32>,
        after: Option<String>,
    ) -> ListResponse<ContentEntry> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return ListResponse::from_error(err),
        };
        match api.authorize(resources::CMS_ENTRY, 'r').await {
            Ok(true) => {}
            Ok(false) => return ListResponse::not_authorized(),
            Err(err) => return ListResponse::from_error(err),
        }

        let params = ListParams::new(limit, after);
        if let Err(err) = params.validate() {
            return ListResponse::from_error(err);
        }
        let offset = match params.offset() {
            Ok(offset) => offset,
            Err(err) => return ListResponse::from_error(err),
        };

        let query = EntryListQuery {
            model,
            filter,
            sort,
            limit: params.limit(),
            offset,
        };
        match api.cms.list_entries(query).await {
            Ok((entries, total_count)) => {
                let has_more_items = offset + entries.len() < total_count as usize;
                let cursor = has_more_items
                    .then(|| ListParams::next_cursor(offset, entries.len()));
                let meta = ListMeta {
                    cursor,
                    has_more_items,
                    total_count,
                };
                ListResponse::ok(entries, meta)
            }
            Err(err) => ListResponse::from_error(err),
        }
    }
}

pub struct CmsMutation;

#[Object]
impl CmsMutation {
    async fn create_entry(
        &self,
        ctx: &Context<'_>,
        model: String,
        data: EntryCreateInput,
    ) -> Response<ContentEntry> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::CMS_ENTRY, 'w').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        match api.cms.create_entry(&model, data).await {
            Ok(entry) => Response::ok(entry),
            Err(err) => Response::from_error(err),
        }
    }

    async fn update_entry(
        &self,
        ctx: &Context<'_>,
        id: ID,
        data: EntryUpdateInput,
    ) -> Response<ContentEntry> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::CMS_ENTRY, 'w').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        let existing = match api.cms.get_entry_by_id(&id).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return Response::not_found(id_not_found(&id)),
            Err(err) => return Response::from_error(err),
        };

        if let Err(err) = api.cms.update_entry(&existing.id, data).await {
            return Response::from_error(err);
        }

        match api.cms.get_entry_by_id(&id).await {
            Ok(Some(entry)) => Response::ok(entry),
            Ok(None) => Response::not_found(id_not_found(&id)),
            Err(err) => Response::from_error(err),
        }
    }

    async fn delete_entry(&self, ctx: &Context<'_>, id: ID) -> Response<bool> {
        let api = match api_context(ctx) {
            Ok(api) => api,
            Err(err) => return Response::from_error(err),
        };
        match api.authorize(resources::CMS_ENTRY, 'd').await {
            Ok(true) => {}
            Ok(false) => return Response::not_authorized(),
            Err(err) => return Response::from_error(err),
        }

        let existing = match api.cms.get_entry_by_id(&id).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return Response::not_found(id_not_found(&id)),
            Err(err) => return Response::from_error(err),
        };

        match api.cms.delete_entry(&existing.id).await {
            Ok(deleted) => Response::ok(deleted),
            Err(err) => Response::from_error(err),
        }
    }
}
