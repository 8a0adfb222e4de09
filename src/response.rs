//! Uniform response envelopes
//!
//! Every resolver returns one of these shapes; failures never escape as
//! GraphQL field errors. Exactly one of `data`/`error` is populated on any
//! terminal outcome.

use async_graphql::{Json, OutputType, SimpleObject};

use crate::{CrudError, NOT_FOUND};

/// Error code used when the caller lacks the required permission flag.
pub const NOT_AUTHORIZED: &str = "SECURITY_NOT_AUTHORIZED";

/// Error portion of the envelope, mirroring [`CrudError`](crate::CrudError).
#[derive(SimpleObject, Debug, Clone)]
pub struct ResponseError {
    pub code: String,
    pub message: String,
    pub data: Option<Json<serde_json::Value>>,
}

impl From<CrudError> for ResponseError {
    fn from(err: CrudError) -> Self {
        Self {
            code: err.code,
            message: err.message,
            data: err.data.map(Json),
        }
    }
}

/// Single-entity response envelope
#[derive(SimpleObject, Debug, Clone)]
#[graphql(concrete(name = "UserResponse", params(crate::users::User)))]
#[graphql(concrete(name = "GroupResponse", params(crate::users::Group)))]
#[graphql(concrete(name = "FormResponse", params(crate::forms::Form)))]
#[graphql(concrete(name = "EntryResponse", params(crate::cms::ContentEntry)))]
#[graphql(concrete(name = "BooleanResponse", params(bool)))]
pub struct Response<T: OutputType> {
    pub data: Option<T>,
    pub error: Option<ResponseError>,
}

impl<T: OutputType> Response<T> {
    /// Success envelope
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// Entity lookup came back empty. The message must carry the requested
    /// identifier verbatim.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(ResponseError {
                code: NOT_FOUND.to_string(),
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Caller is missing the required permission flag.
    pub fn not_authorized() -> Self {
        Self {
            data: None,
            error: Some(ResponseError {
                code: NOT_AUTHORIZED.to_string(),
                message: "Not authorized!".to_string(),
                data: None,
            }),
        }
    }

    /// Collaborator failure, surfaced with its code/message/data unchanged.
    pub fn from_error(err: CrudError) -> Self {
        Self {
            data: None,
            error: Some(err.into()),
        }
    }
}

impl<T: OutputType> From<CrudError> for Response<T> {
    fn from(err: CrudError) -> Self {
        Self::from_error(err)
    }
}

/// Cursor and count metadata attached to list responses.
#[derive(SimpleObject, Debug, Clone)]
pub struct ListMeta {
    pub cursor: Option<String>,
    pub has_more_items: bool,
    pub total_count: i64,
}

/// List response envelope, adds `meta` to the single-entity shape.
#[derive(SimpleObject, Debug, Clone)]
#[graphql(concrete(name = "UserListResponse", params(crate::users::User)))]
#[graphql(concrete(name = "FormListResponse", params(crate::forms::Form)))]
#[graphql(concrete(name = "EntryListResponse", params(crate::cms::ContentEntry)))]
pub struct ListResponse<T: OutputType> {
    pub data: Option<Vec<T>>,
    pub meta: Option<ListMeta>,
    pub error: Option<ResponseError>,
}

impl<T: OutputType> ListResponse<T> {
    /// Success envelope with metadata.
    pub fn ok(data: Vec<T>, meta: ListMeta) -> Self {
        Self {
            data: Some(data),
            meta: Some(meta),
            error: None,
        }
    }

    pub fn not_authorized() -> Self {
        Self {
            data: None,
            meta: None,
            error: Some(ResponseError {
                code: NOT_AUTHORIZED.to_string(),
                message: "Not authorized!".to_string(),
                data: None,
            }),
        }
    }

    pub fn from_error(err: CrudError) -> Self {
        Self {
            data: None,
            meta: None,
            error: Some(err.into()),
        }
    }
}

impl<T: OutputType> From<CrudError> for ListResponse<T> {
    fn from(err: CrudError) -> Self {
        Self::from_error(err)
    }
}
