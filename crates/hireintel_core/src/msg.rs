use std::fmt;

use crate::{
    CandidatePage, CandidateStatus, EntityId, Interview, Job, JobDraft, Page, ScheduleRequest,
    SubscriptionId,
};

/// Coarse classification of a failed backend call, enough to pick between
/// retrying and telling the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The request never completed.
    Network,
    /// The backend answered with an error status or an error envelope.
    Application,
    /// The response could not be decoded.
    Decode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub class: FailureClass,
    pub message: String,
    pub retryable: bool,
}

impl Failure {
    pub fn new(class: FailureClass, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            class,
            message: message.into(),
            retryable,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = match self.class {
            FailureClass::Network => "network error",
            FailureClass::Application => "server error",
            FailureClass::Decode => "unreadable response",
        };
        write!(f, "{class}: {}", self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Dashboard opened: load everything and start live updates.
    Started,
    /// User navigated to another page.
    PageSelected(Page),
    /// User picked a candidate status filter; `None` clears it.
    StatusFilterChanged(Option<CandidateStatus>),
    /// User edited the search box.
    SearchChanged(String),
    /// Periodic refresh timer fired.
    RefreshTick,
    /// User asked for another page of the candidate stream.
    CandidatePageSelected(u32),

    JobsLoaded(Result<Vec<Job>, Failure>),
    /// Snapshot fetched for candidate page `page`.
    CandidatesLoaded {
        page: u32,
        result: Result<CandidatePage, Failure>,
    },
    InterviewsLoaded(Result<Vec<Interview>, Failure>),

    CreateJobSubmitted(JobDraft),
    JobCreated(Result<Job, Failure>),
    EditJobSubmitted { job_id: EntityId, draft: JobDraft },
    PublishJobClicked { job_id: EntityId },
    CloseJobClicked { job_id: EntityId },
    /// Completion of an edit, publish or close request.
    JobUpdated(Result<Job, Failure>),
    DeleteJobConfirmed { job_id: EntityId },
    JobDeleted {
        job_id: EntityId,
        result: Result<(), Failure>,
    },

    ScheduleSubmitted(ScheduleRequest),
    InterviewsScheduled(Result<(), Failure>),
    CancelInterviewClicked { interview_id: EntityId },
    CompleteInterviewClicked { interview_id: EntityId },
    InterviewUpdated(Result<Interview, Failure>),

    StreamStartRequested,
    StreamStopRequested,
    /// Raw `data` field of one server-sent event.
    StreamMessage {
        subscription: SubscriptionId,
        payload: String,
    },
    StreamTransportError {
        subscription: SubscriptionId,
        reason: String,
    },
    /// The transport stopped retrying.
    StreamGaveUp {
        subscription: SubscriptionId,
        reason: String,
    },
}
