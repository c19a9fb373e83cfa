use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::projector;
use crate::view_model::{AppViewModel, PageView};
use crate::{CandidateStatus, EntityStore, LiveStream, Resource, StreamStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Dashboard,
    Jobs,
    Candidates,
    Interviews,
    Pipeline,
    Analytics,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Dashboard,
        Page::Jobs,
        Page::Candidates,
        Page::Interviews,
        Page::Pipeline,
        Page::Analytics,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Jobs => "jobs",
            Page::Candidates => "candidates",
            Page::Interviews => "interviews",
            Page::Pipeline => "pipeline",
            Page::Analytics => "analytics",
        }
    }

    /// Collections this page shows that come from one-shot fetches.
    pub(crate) fn fetched_resources(self) -> &'static [Resource] {
        match self {
            Page::Dashboard => &[Resource::Jobs, Resource::Interviews],
            Page::Jobs => &[Resource::Jobs],
            Page::Interviews => &[Resource::Interviews],
            Page::Candidates | Page::Pipeline | Page::Analytics => &[],
        }
    }

    pub(crate) fn shows_candidates(self) -> bool {
        !matches!(self, Page::Interviews)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|page| page.name().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| format!("unknown page '{raw}'"))
    }
}

/// Transient UI selections. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub page: Page,
    pub status_filter: Option<CandidateStatus>,
    pub search_query: String,
    pub candidate_page: u32,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            page: Page::Dashboard,
            status_filter: None,
            search_query: String::new(),
            candidate_page: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct InitialLoad {
    requested: bool,
    pending: BTreeSet<Resource>,
    ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    store: EntityStore,
    ui: UiState,
    stream: LiveStream,
    initial_load: InitialLoad,
    in_flight: BTreeSet<Resource>,
    candidate_fetch_page: Option<u32>,
    stale: BTreeSet<Resource>,
    notifications: Vec<Notification>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn stream(&self) -> &LiveStream {
        &self.stream
    }

    pub fn stream_status(&self) -> StreamStatus {
        self.stream.status()
    }

    /// True once every initial fetch has settled, successfully or not.
    pub fn is_ready(&self) -> bool {
        self.initial_load.ready
    }

    pub fn is_stale(&self, resource: Resource) -> bool {
        self.stale.contains(&resource)
    }

    pub fn view(&self) -> AppViewModel {
        let store = &self.store;
        let body = match self.ui.page {
            Page::Dashboard => PageView::Dashboard {
                funnel: projector::hiring_funnel(store),
            },
            Page::Jobs => PageView::Jobs {
                rows: projector::job_rows(store),
            },
            Page::Candidates => {
                let visible = projector::filtered_candidates(store, self.ui.status_filter.as_ref());
                PageView::Candidates {
                    filter: self.ui.status_filter.clone(),
                    cards: projector::candidate_cards(&visible),
                    page_info: store.candidate_page(),
                    schedulable: projector::schedulable_candidates(store),
                }
            }
            Page::Interviews => PageView::Interviews {
                rows: projector::interview_rows(store),
            },
            Page::Pipeline => PageView::Pipeline {
                stages: projector::pipeline_stage_counts(store),
                feed: projector::pipeline_feed(store),
            },
            Page::Analytics => PageView::Analytics {
                funnel: projector::hiring_funnel(store),
                breakdown: projector::status_breakdown(store),
            },
        };

        let hits = projector::search_entities(store, &self.ui.search_query);
        AppViewModel {
            page: self.ui.page,
            ready: self.initial_load.ready,
            stream: self.stream.status(),
            stats: projector::dashboard_stats(store),
            search_query: self.ui.search_query.clone(),
            search_results: projector::search_rows(&hits),
            body,
            pending_notifications: self.notifications.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a repaint is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification {
            level,
            message: message.into(),
        });
        self.dirty = true;
    }

    pub(crate) fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub(crate) fn ui_mut(&mut self) -> &mut UiState {
        &mut self.ui
    }

    pub(crate) fn stream_and_store_mut(&mut self) -> (&mut LiveStream, &mut EntityStore) {
        (&mut self.stream, &mut self.store)
    }

    pub(crate) fn stream_mut(&mut self) -> &mut LiveStream {
        &mut self.stream
    }

    /// Arms the initial load. Returns false if it was already requested.
    pub(crate) fn begin_initial_load(&mut self) -> bool {
        if self.initial_load.requested {
            return false;
        }
        self.initial_load.requested = true;
        self.initial_load.pending = Resource::ALL.into_iter().collect();
        true
    }

    pub(crate) fn is_initial_pending(&self, resource: Resource) -> bool {
        self.initial_load.pending.contains(&resource)
    }

    /// Records that `resource` settled. Returns true when this completed the
    /// initial load.
    pub(crate) fn settle(&mut self, resource: Resource) -> bool {
        self.in_flight.remove(&resource);
        if self.initial_load.pending.remove(&resource) && self.initial_load.pending.is_empty() {
            self.initial_load.ready = true;
            return true;
        }
        false
    }

    /// Marks a fetch as started. Returns false if one is already running.
    pub(crate) fn try_begin_fetch(&mut self, resource: Resource) -> bool {
        self.in_flight.insert(resource)
    }

    /// Marks a fetch as started even if an older one is still running. The
    /// older result is discarded on arrival.
    pub(crate) fn supersede_fetch(&mut self, resource: Resource) {
        self.in_flight.insert(resource);
    }

    pub(crate) fn record_candidate_fetch(&mut self, page: u32) {
        self.candidate_fetch_page = Some(page);
    }

    /// False when a fetch for another page was issued after this one.
    pub(crate) fn is_latest_candidate_fetch(&self, page: u32) -> bool {
        self.candidate_fetch_page.is_none_or(|latest| latest == page)
    }

    pub(crate) fn mark_stale(&mut self, resource: Resource) {
        self.stale.insert(resource);
    }

    pub(crate) fn clear_stale(&mut self, resource: Resource) {
        self.stale.remove(&resource);
    }

    pub(crate) fn stale_resources(&self) -> Vec<Resource> {
        self.stale.iter().copied().collect()
    }
}
