//! Views: the finite set of cached projections of the item collection.
//!
//! A view is a named, deterministic query over the `items` table, ordered by
//! id descending. Each view owns one cache key. The set of views is static
//! and exhaustive, which is what makes write-side invalidation simple: a
//! mutation invalidates [`View::ALL`] rather than computing which predicates
//! a given row intersects. Views unaffected by a write get invalidated too;
//! that trade of extra misses for a trivial consistency argument is
//! deliberate.

use std::fmt;
use std::time::Duration;

/// Fixed TTL applied to every cached view.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A cached projection of the item collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    /// Every item, newest first.
    All,
    /// Items with `valid_service = TRUE`, newest first.
    ValidOnly,
}

impl View {
    /// The complete set of views, used for exhaustive invalidation.
    pub const ALL: [View; 2] = [View::All, View::ValidOnly];

    /// Cache key identifying this view.
    pub fn cache_key(&self) -> &'static str {
        match self {
            View::All => "items_list",
            View::ValidOnly => "items_list_valid",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::All => write!(f, "all"),
            View::ValidOnly => write!(f, "valid_only"),
        }
    }
}
