//! Cursor-based pagination parameters.
//!
//! Every field is optional and only caller-supplied values are encoded into
//! an outgoing request — omitted parameters are never sent with defaults, so
//! each backend keeps its own default behavior. Ids are opaque cursors copied
//! unmodified from previously returned entities.

/// Pagination window for list-returning operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Maximum number of entities to return.
    pub limit: Option<u32>,
    /// Return entities strictly older than this id.
    pub max_id: Option<String>,
    /// Return entities strictly newer than this id.
    pub since_id: Option<String>,
    /// Return entities newer than or equal to this id.
    pub min_id: Option<String>,
}

impl Pagination {
    /// A window with only `limit` set.
    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// True if no parameter was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.limit.is_none()
            && self.max_id.is_none()
            && self.since_id.is_none()
            && self.min_id.is_none()
    }
}
