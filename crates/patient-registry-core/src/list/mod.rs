//! Patient list view-model.
//!
//! Pipeline: user intent → [`ListViewModel`] transition → [`FetchCommand`]
//! → collection → [`FetchOutcome`] → [`ListViewModel::apply`]
//!
//! Every transition bumps a sequence number and returns the command to run.
//! Only the outcome carrying the highest issued sequence is applied; earlier
//! ones are dropped, errors included. The model itself never awaits, so it
//! can be driven by [`ListController`] or by any other executor.

mod controller;
mod pagination;

pub use controller::*;
pub use pagination::*;

use tracing::{debug, warn};

use crate::client::{ClientResult, PatientCollection};
use crate::models::{Patient, QueryState, ResultPage, SortField, SortOrder};

/// A sequence-numbered list request produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCommand {
    pub seq: u64,
    pub query: QueryState,
}

impl FetchCommand {
    /// Run this command against a collection.
    pub async fn run<C: PatientCollection + ?Sized>(self, collection: &C) -> FetchOutcome {
        let result = collection.list(&self.query).await;
        FetchOutcome {
            seq: self.seq,
            result,
        }
    }
}

/// Response to a [`FetchCommand`], tagged with the command's sequence.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub seq: u64,
    pub result: ClientResult<ResultPage>,
}

/// What [`ListViewModel::apply`] did with an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The outcome became the displayed state (page or error)
    Applied,
    /// A newer fetch was issued since; the outcome was discarded
    Stale,
    /// The requested page was past the end; run this clamped fetch instead
    Refetch(FetchCommand),
}

/// What the list area should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListDisplay<'a> {
    /// First load still in flight
    Loading,
    /// Latest fetch failed and nothing was ever loaded
    Failed(&'a str),
    /// Loaded, zero rows
    Empty,
    Rows(&'a [Patient]),
}

/// State machine mapping the current [`QueryState`] to its latest [`ResultPage`].
#[derive(Debug, Clone, Default)]
pub struct ListViewModel {
    query: QueryState,
    issued_seq: u64,
    applied_seq: u64,
    page: Option<ResultPage>,
    /// Whether `page` answered a query with a search term
    page_filtered: bool,
    error: Option<String>,
}

impl ListViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a custom query, e.g. one restored from the command line.
    pub fn with_query(query: QueryState) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Replace the search text and go back to page 1.
    pub fn set_search(&mut self, text: impl Into<String>) -> FetchCommand {
        self.query.search = text.into();
        self.query.page = 1;
        self.issue()
    }

    /// Sort by `field`. Toggles the order when `field` is already active,
    /// otherwise switches to it ascending. Goes back to page 1.
    pub fn set_sort(&mut self, field: SortField) -> FetchCommand {
        if self.query.sort_field == field {
            self.query.sort_order = self.query.sort_order.toggled();
        } else {
            self.query.sort_field = field;
            self.query.sort_order = SortOrder::Asc;
        }
        self.query.page = 1;
        self.issue()
    }

    /// Go to page `n`, clamped to the known page range.
    ///
    /// Before anything is loaded the range is unknown; `n` is then taken as
    /// is (at least 1) and corrected when the response arrives.
    pub fn set_page(&mut self, n: u32) -> FetchCommand {
        let mut page = n.max(1);
        let total_pages = self.total_pages();
        if total_pages > 0 {
            page = page.min(total_pages);
        }
        self.query.page = page;
        self.issue()
    }

    pub fn next_page(&mut self) -> FetchCommand {
        self.set_page(self.query.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> FetchCommand {
        self.set_page(self.query.page.saturating_sub(1))
    }

    /// Re-fetch the current query.
    pub fn refresh(&mut self) -> FetchCommand {
        self.issue()
    }

    fn issue(&mut self) -> FetchCommand {
        self.issued_seq += 1;
        debug!(seq = self.issued_seq, query = ?self.query, "issuing patient list fetch");
        FetchCommand {
            seq: self.issued_seq,
            query: self.query.clone(),
        }
    }

    // =========================================================================
    // Responses
    // =========================================================================

    /// Apply a fetch outcome if it answers the most recent command.
    pub fn apply(&mut self, outcome: FetchOutcome) -> ApplyOutcome {
        if outcome.seq != self.issued_seq {
            debug!(
                seq = outcome.seq,
                latest = self.issued_seq,
                "dropping stale patient list response"
            );
            return ApplyOutcome::Stale;
        }
        self.applied_seq = outcome.seq;

        match outcome.result {
            Ok(page) => {
                self.error = None;

                if page.total_pages > 0 && self.query.page > page.total_pages {
                    debug!(
                        requested = self.query.page,
                        total_pages = page.total_pages,
                        "requested page past the end, clamping"
                    );
                    self.query.page = page.total_pages;
                    return ApplyOutcome::Refetch(self.issue());
                }
                if page.total == 0 {
                    self.query.page = 1;
                }

                self.page_filtered = self.query.search_term().is_some();
                self.page = Some(page);
            }
            Err(e) => {
                warn!(seq = outcome.seq, error = %e, "patient list fetch failed");
                self.error = Some(e.to_string());
            }
        }

        ApplyOutcome::Applied
    }

    // =========================================================================
    // Projection
    // =========================================================================

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Last successfully applied page.
    pub fn result(&self) -> Option<&ResultPage> {
        self.page.as_ref()
    }

    pub fn items(&self) -> &[Patient] {
        self.page
            .as_ref()
            .map(|p| p.items.as_slice())
            .unwrap_or_default()
    }

    /// Error of the latest fetch, shown as a banner over any kept data.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn issued_seq(&self) -> u64 {
        self.issued_seq
    }

    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }

    /// True while the most recent command has not been answered.
    pub fn is_fetching(&self) -> bool {
        self.issued_seq > self.applied_seq
    }

    pub fn has_loaded(&self) -> bool {
        self.page.is_some()
    }

    /// Loading only covers the first load; later fetches update in place.
    pub fn is_loading(&self) -> bool {
        self.is_fetching() && !self.has_loaded()
    }

    pub fn display(&self) -> ListDisplay<'_> {
        if self.is_loading() {
            return ListDisplay::Loading;
        }
        match (&self.page, &self.error) {
            (None, Some(error)) => ListDisplay::Failed(error),
            (None, None) => ListDisplay::Empty,
            (Some(page), _) if page.is_empty() => ListDisplay::Empty,
            (Some(page), _) => ListDisplay::Rows(&page.items),
        }
    }

    pub fn total(&self) -> u64 {
        self.page.as_ref().map_or(0, |p| p.total)
    }

    pub fn total_pages(&self) -> u32 {
        self.page.as_ref().map_or(0, |p| p.total_pages)
    }

    pub fn can_go_previous(&self) -> bool {
        self.query.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.query.page < self.total_pages()
    }

    /// Page buttons to render around the current page.
    pub fn page_numbers(&self) -> Vec<u32> {
        page_window(self.query.page, self.total_pages())
    }

    /// Arrow for a column header; `None` when not sorted by `field`.
    pub fn sort_indicator(&self, field: SortField) -> Option<&'static str> {
        if self.query.sort_field != field {
            return None;
        }
        Some(match self.query.sort_order {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        })
    }

    /// True when the displayed page is a search result.
    pub fn is_filtered(&self) -> bool {
        self.page.is_some() && self.page_filtered
    }

    /// e.g. `Showing 20 of 45 patient(s) (filtered)`.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Showing {} of {} patient(s)",
            self.items().len(),
            self.total()
        );
        if self.is_filtered() {
            line.push_str(" (filtered)");
        }
        line
    }
}
