//! HireIntel core: entity snapshot, live-stream state machine and pure view projections.
mod effect;
mod live;
mod model;
mod msg;
pub mod projector;
mod state;
mod store;
mod update;
mod view_model;

pub use effect::{Effect, Resource};
pub use live::{LiveStream, MessageOutcome, PayloadIssue, Restart, StreamStatus, SubscriptionId};
pub use model::{
    flag_is_set, Candidate, CandidatePage, CandidateStatus, EntityId, Interview, InterviewStatus,
    Job, JobDraft, JobStatus, PageInfo, ScheduleRequest,
};
pub use msg::{Failure, FailureClass, Msg};
pub use state::{AppState, Notification, NotificationLevel, Page, UiState};
pub use store::{decode_collection, EntityStore};
pub use update::update;
pub use view_model::{
    AppViewModel, CandidateCard, DashboardStats, FeedItem, FunnelStage, InterviewRow, JobRow,
    PageView, PipelineStageCounts, ScheduleOption, SearchResultKind, SearchResultRow, StatusCount,
    FEED_LENGTH,
};
