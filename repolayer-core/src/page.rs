//! Paging contract: bounded, optionally counted slices of a result set.
//!
//! A [`PageRequest`] carries the caller's skip/take wishes plus whether a
//! total count is wanted; the repository resolves them against its
//! configured maximum page size before touching the store. A [`Page`] is
//! what comes back: the data slice and, only when asked for, the total.

use serde::{Deserialize, Serialize};

/// Default upper bound for `take` when no configuration overrides it.
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 100;

/// Caller-side paging parameters.
///
/// The fields are signed on purpose: a negative `skip` is defined to
/// behave exactly like an absent one, and a non-positive `take` falls back
/// to the configured maximum. `take` can never exceed that maximum, no
/// matter what the caller requests.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Documents to skip before the first returned one.
    pub skip: Option<i64>,
    /// Upper bound on returned documents.
    pub take: Option<i64>,
    /// Whether to also count all matching documents.
    pub want_total: bool,
}

impl PageRequest {
    /// A request for the first page with defaults: no skip, maximum take,
    /// no total.
    pub fn new() -> Self {
        PageRequest::default()
    }

    /// Sets the skip.
    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the take.
    pub fn take(mut self, take: i64) -> Self {
        self.take = Some(take);
        self
    }

    /// Requests a total count alongside the data.
    pub fn with_total(mut self) -> Self {
        self.want_total = true;
        self
    }

    /// The skip actually sent to the store: `None` when absent or negative.
    pub fn effective_skip(&self) -> Option<u64> {
        self.skip.filter(|skip| *skip >= 0).map(|skip| skip as u64)
    }

    /// The limit actually sent to the store.
    ///
    /// Absent or non-positive `take` resolves to `max`; anything else is
    /// clamped to `max`.
    pub fn effective_take(&self, max: i64) -> i64 {
        match self.take {
            Some(take) if take > 0 => take.min(max),
            _ => max,
        }
    }
}

/// One page of results.
///
/// `total` is `Some` iff the request asked for it; when it is absent no
/// count query was issued at all. The total and the data come from two
/// separate store round trips and may disagree under concurrent writes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The documents of this page, in store result order.
    pub data: Vec<T>,
    /// Count of all matching documents, when requested.
    pub total: Option<u64>,
}

impl<T> Page<T> {
    /// A page holding `data` with no total.
    pub fn new(data: Vec<T>) -> Self {
        Page { data, total: None }
    }

    /// Attaches a total count.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page { data: Vec::new(), total: None }
    }
}

/// Repository construction-time configuration.
///
/// The only recognized knob is the maximum page size bounding `take` in
/// every paging call; it is fixed per repository instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Upper bound for `take`, and the default when `take` is absent.
    pub max_page_size: i64,
}

impl RepositoryConfig {
    /// Configuration with the given maximum page size.
    pub fn with_max_page_size(max_page_size: i64) -> Self {
        RepositoryConfig { max_page_size }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig { max_page_size: DEFAULT_MAX_PAGE_SIZE }
    }
}
