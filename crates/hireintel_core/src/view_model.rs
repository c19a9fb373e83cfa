use crate::{
    CandidateStatus, EntityId, InterviewStatus, JobStatus, Notification, Page, PageInfo,
    StreamStatus,
};

/// Number of candidates shown in the pipeline activity feed.
pub const FEED_LENGTH: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub active_jobs: usize,
    pub total_candidates: usize,
    pub scheduled_interviews: usize,
    pub hired_candidates: usize,
}

/// Coarse pipeline buckets. A candidate may count toward several buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineStageCounts {
    pub xml: usize,
    pub extract: usize,
    pub scrape: usize,
    pub profile: usize,
    pub total: usize,
}

impl PipelineStageCounts {
    /// Share of all candidates in `count`, as a whole percentage capped at 100.
    pub fn percent_of_total(&self, count: usize) -> u8 {
        let percent = count.saturating_mul(100) / self.total.max(1);
        percent.min(100) as u8
    }

    pub fn buckets(&self) -> [(&'static str, usize); 4] {
        [
            ("xml", self.xml),
            ("extract", self.extract),
            ("scraping", self.scrape),
            ("profile", self.profile),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelStage {
    pub name: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCount {
    pub status: CandidateStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRow {
    pub job_id: EntityId,
    pub title: String,
    pub industry: String,
    pub location: String,
    pub status: JobStatus,
    pub applicants: usize,
    pub created: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateCard {
    pub candidate_id: EntityId,
    pub initials: String,
    pub name: String,
    pub position: String,
    pub email: String,
    pub experience: String,
    pub status: CandidateStatus,
    pub pipeline_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewRow {
    pub interview_id: EntityId,
    pub when: String,
    pub candidate: String,
    pub status: InterviewStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub candidate_id: EntityId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleOption {
    pub candidate_id: EntityId,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResultKind {
    Candidate,
    Job,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultRow {
    pub kind: SearchResultKind,
    pub id: EntityId,
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageView {
    Dashboard {
        funnel: Vec<FunnelStage>,
    },
    Jobs {
        rows: Vec<JobRow>,
    },
    Candidates {
        filter: Option<CandidateStatus>,
        cards: Vec<CandidateCard>,
        page_info: Option<PageInfo>,
        schedulable: Vec<ScheduleOption>,
    },
    Interviews {
        rows: Vec<InterviewRow>,
    },
    Pipeline {
        stages: PipelineStageCounts,
        feed: Vec<FeedItem>,
    },
    Analytics {
        funnel: Vec<FunnelStage>,
        breakdown: Vec<StatusCount>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub page: Page,
    pub ready: bool,
    pub stream: StreamStatus,
    pub stats: DashboardStats,
    pub search_query: String,
    pub search_results: Vec<SearchResultRow>,
    pub body: PageView,
    pub pending_notifications: Vec<Notification>,
    pub dirty: bool,
}
