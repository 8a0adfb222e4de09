//! List parameters and cursor encoding

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{CrudError, CrudResult};

/// Cursor encoding/decoding
pub struct CursorCodec;

impl CursorCodec {
    /// Encode cursor to base64
    pub fn encode(value: &str) -> String {
        BASE64.encode(value.as_bytes())
    }

    /// Decode cursor from base64
    pub fn decode(cursor: &str) -> CrudResult<String> {
        let bytes = BASE64
            .decode(cursor.as_bytes())
            .map_err(|e| CrudError::new("INVALID_CURSOR", e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| CrudError::new("INVALID_CURSOR", e.to_string()))
    }
}

/// Limit/cursor parameters accepted by list queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    pub limit: Option<i32>,
    pub after: Option<String>,
}

impl ListParams {
    pub fn new(limit: Option<i32>, after: Option<String>) -> Self {
        Self { limit, after }
    }

    /// Validate list parameters.
    pub fn validate(&self) -> CrudResult<()> {
        if let Some(limit) = self.limit {
            if limit < 0 {
                return Err(CrudError::new(
                    "INVALID_LIST_PARAMS",
                    "'limit' must be non-negative",
                ));
            }
            if limit > 100 {
                return Err(CrudError::new(
                    "INVALID_LIST_PARAMS",
                    "'limit' cannot exceed 100",
                ));
            }
        }
        Ok(())
    }

    /// Effective page size, capped at 100.
    pub fn limit(&self) -> i32 {
        self.limit.unwrap_or(20).min(100)
    }

    /// Offset encoded in the `after` cursor, 0 when absent.
    pub fn offset(&self) -> CrudResult<usize> {
        match &self.after {
            None => Ok(0),
            Some(cursor) => {
                let decoded = CursorCodec::decode(cursor)?;
                decoded
                    .parse::<usize>()
                    .map_err(|e| CrudError::new("INVALID_CURSOR", e.to_string()))
            }
        }
    }

    /// Cursor pointing at the item after the returned page.
    pub fn next_cursor(offset: usize, returned: usize) -> String {
        CursorCodec::encode(&(offset + returned).to_string())
    }
}
