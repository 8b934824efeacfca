//! Search lifecycle state machine.
//!
//! Every query change bumps a monotonic [`QueryTag`]. A search may only
//! start, and its results may only land, while its tag is still the latest;
//! anything else is a stale response and is dropped.

use crate::conversation::entities::Conversation;

/// Generation tag identifying one scheduled search
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct QueryTag(u64);

impl QueryTag {
    fn bump(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Tri-state search status
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    /// No query, cleared, or waiting out the quiet interval
    #[default]
    Idle,
    Searching {
        tag: QueryTag,
    },
    /// Results for the tagged query (possibly empty)
    Settled {
        tag: QueryTag,
        results: Vec<Conversation>,
    },
}

/// What the debouncer must do after a query change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTransition {
    /// Query is blank: nothing to schedule
    Cleared,
    /// Schedule a search for `query` after the quiet interval
    Schedule { tag: QueryTag, query: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    query: String,
    latest: QueryTag,
    status: SearchStatus,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record new input. Any previous results are discarded.
    pub fn query_changed(&mut self, text: &str) -> QueryTransition {
        self.latest = self.latest.bump();
        self.query = text.to_string();
        self.status = SearchStatus::Idle;

        let trimmed = text.trim();
        if trimmed.is_empty() {
            QueryTransition::Cleared
        } else {
            QueryTransition::Schedule {
                tag: self.latest,
                query: trimmed.to_string(),
            }
        }
    }

    /// Enter `Searching` if `tag` is still current
    pub fn begin(&mut self, tag: QueryTag) -> bool {
        if tag != self.latest {
            return false;
        }
        self.status = SearchStatus::Searching { tag };
        true
    }

    /// Land results if `tag` is still current and searching
    pub fn settle(&mut self, tag: QueryTag, results: Vec<Conversation>) -> bool {
        if self.status != (SearchStatus::Searching { tag }) {
            return false;
        }
        let results = results.into_iter().map(Conversation::into_summary).collect();
        self.status = SearchStatus::Settled { tag, results };
        true
    }

    /// Drop back to `Idle` without results if `tag` is still searching
    pub fn abandon(&mut self, tag: QueryTag) -> bool {
        if self.status != (SearchStatus::Searching { tag }) {
            return false;
        }
        self.status = SearchStatus::Idle;
        true
    }

    /// Fresh surface: empty query, `Idle`, and every outstanding tag invalidated
    pub fn reset(&mut self) {
        self.latest = self.latest.bump();
        self.query.clear();
        self.status = SearchStatus::Idle;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn latest(&self) -> QueryTag {
        self.latest
    }

    /// Results of the settled query, empty in every other state
    pub fn results(&self) -> &[Conversation] {
        match &self.status {
            SearchStatus::Settled { results, .. } => results,
            SearchStatus::Idle | SearchStatus::Searching { .. } => &[],
        }
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.status, SearchStatus::Searching { .. })
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.status, SearchStatus::Settled { .. })
    }
}
