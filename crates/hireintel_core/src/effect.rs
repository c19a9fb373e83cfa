use crate::{EntityId, JobDraft, ScheduleRequest, SubscriptionId};

/// Entity collections that can be fetched from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Jobs,
    Candidates,
    Interviews,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Jobs, Resource::Candidates, Resource::Interviews];

    pub fn label(self) -> &'static str {
        match self {
            Resource::Jobs => "jobs",
            Resource::Candidates => "candidates",
            Resource::Interviews => "interviews",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchJobs,
    FetchCandidates { page: u32 },
    FetchInterviews,
    CreateJob(JobDraft),
    UpdateJob { job_id: EntityId, draft: JobDraft },
    DeleteJob { job_id: EntityId },
    PublishJob { job_id: EntityId },
    CloseJob { job_id: EntityId },
    ScheduleInterviews(ScheduleRequest),
    CancelInterview { interview_id: EntityId },
    CompleteInterview { interview_id: EntityId },
    OpenStream { subscription: SubscriptionId, page: u32 },
    CloseStream { subscription: SubscriptionId },
}
