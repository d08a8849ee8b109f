//! Pagination over cloud list endpoints.
//!
//! List endpoints return a page of items plus an optional cursor for the
//! next page; an absent cursor means the result set is complete. The
//! helpers here drive that loop to completion. Termination is guaranteed
//! by surfacing a repeated cursor as [`Error::PaginationProtocol`] rather
//! than looping on it.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque cursor returned by a list endpoint. Transient per-call state;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for PageToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// One page of a list result.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<PageToken>,
}

impl<T> Page<T> {
    /// A terminal page with no items.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next: None,
        }
    }

    /// A terminal page holding the given items.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Invoke `fetch` with the previous cursor until no cursor is returned,
/// concatenating all items.
///
/// Any fetch error aborts immediately; no partial results are returned,
/// since callers rely on completeness for deduplication and counting.
pub async fn collect<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<PageToken>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<PageToken> = None;

    loop {
        let page = fetch(cursor.clone()).await?;
        items.extend(page.items);

        match page.next {
            None => return Ok(items),
            Some(next) => {
                if cursor.as_ref() == Some(&next) {
                    return Err(Error::PaginationProtocol {
                        cursor: next.into_inner(),
                    });
                }
                cursor = Some(next);
            }
        }
    }
}

/// Page through results until `pred` matches an item, returning it and
/// stopping the fetch loop early. `Ok(None)` if no page contains a match.
pub async fn find<T, F, Fut, P>(mut fetch: F, mut pred: P) -> Result<Option<T>>
where
    F: FnMut(Option<PageToken>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
    P: FnMut(&T) -> bool,
{
    let mut cursor: Option<PageToken> = None;

    loop {
        let page = fetch(cursor.clone()).await?;
        if let Some(item) = page.items.into_iter().find(&mut pred) {
            return Ok(Some(item));
        }

        match page.next {
            None => return Ok(None),
            Some(next) => {
                if cursor.as_ref() == Some(&next) {
                    return Err(Error::PaginationProtocol {
                        cursor: next.into_inner(),
                    });
                }
                cursor = Some(next);
            }
        }
    }
}
