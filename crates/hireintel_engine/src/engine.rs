use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use hireintel_core::{EntityId, JobDraft, ScheduleRequest, SubscriptionId};
use hireintel_logging::{hi_debug, hi_info};
use tokio_util::sync::CancellationToken;

use crate::gateway::{FetchSettings, Gateway, ReqwestGateway};
use crate::stream::{run_subscription, ChannelEventSink, EventSink, ReconnectPolicy};
use crate::{EngineError, EngineEvent};

enum EngineCommand {
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

/// Sending half of the engine. Dropping it stops the worker thread and
/// cancels any live subscription.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Completions and stream events, in the order the worker produced them.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    /// Block until the next event. `None` once the engine has shut down.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl EngineHandle {
    pub fn new(
        settings: FetchSettings,
        policy: ReconnectPolicy,
    ) -> Result<(Self, EngineEvents), EngineError> {
        let gateway = Arc::new(ReqwestGateway::new(settings)?);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("hireintel-engine")
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("hireintel-dispatch".to_string())
            .spawn(move || {
                let policy = Arc::new(policy);
                let mut active: Option<(SubscriptionId, CancellationToken)> = None;
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::OpenStream { subscription, page } => {
                            if let Some((previous, token)) = active.take() {
                                hi_debug!("Replacing subscription {}", previous);
                                token.cancel();
                            }
                            let token = CancellationToken::new();
                            active = Some((subscription, token.clone()));
                            let gateway = gateway.clone();
                            let policy = policy.clone();
                            let sink = ChannelEventSink::new(event_tx.clone());
                            runtime.spawn(async move {
                                run_subscription(&gateway, subscription, page, &policy, &sink, token)
                                    .await;
                            });
                        }
                        EngineCommand::CloseStream { subscription } => {
                            if active.as_ref().is_some_and(|(id, _)| *id == subscription) {
                                if let Some((_, token)) = active.take() {
                                    token.cancel();
                                }
                            }
                        }
                        command => {
                            let gateway = gateway.clone();
                            let sink = ChannelEventSink::new(event_tx.clone());
                            runtime.spawn(async move {
                                handle_command(gateway.as_ref(), command, &sink).await;
                            });
                        }
                    }
                }
                if let Some((_, token)) = active.take() {
                    token.cancel();
                }
                hi_info!("Engine stopped");
            })?;

        Ok((Self { cmd_tx }, EngineEvents { event_rx }))
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn fetch_jobs(&self) {
        self.send(EngineCommand::FetchJobs);
    }

    pub fn fetch_candidates(&self, page: u32) {
        self.send(EngineCommand::FetchCandidates { page });
    }

    pub fn fetch_interviews(&self) {
        self.send(EngineCommand::FetchInterviews);
    }

    pub fn create_job(&self, draft: JobDraft) {
        self.send(EngineCommand::CreateJob(draft));
    }

    pub fn update_job(&self, job_id: EntityId, draft: JobDraft) {
        self.send(EngineCommand::UpdateJob { job_id, draft });
    }

    pub fn delete_job(&self, job_id: EntityId) {
        self.send(EngineCommand::DeleteJob { job_id });
    }

    pub fn publish_job(&self, job_id: EntityId) {
        self.send(EngineCommand::PublishJob { job_id });
    }

    pub fn close_job(&self, job_id: EntityId) {
        self.send(EngineCommand::CloseJob { job_id });
    }

    pub fn schedule_interviews(&self, request: ScheduleRequest) {
        self.send(EngineCommand::ScheduleInterviews(request));
    }

    pub fn cancel_interview(&self, interview_id: EntityId) {
        self.send(EngineCommand::CancelInterview { interview_id });
    }

    pub fn complete_interview(&self, interview_id: EntityId) {
        self.send(EngineCommand::CompleteInterview { interview_id });
    }

    /// Start subscription `subscription`, replacing whichever one is live.
    pub fn open_stream(&self, subscription: SubscriptionId, page: u32) {
        self.send(EngineCommand::OpenStream { subscription, page });
    }

    /// Stop `subscription` if it is still the live one.
    pub fn close_stream(&self, subscription: SubscriptionId) {
        self.send(EngineCommand::CloseStream { subscription });
    }
}

async fn handle_command(gateway: &dyn Gateway, command: EngineCommand, sink: &dyn EventSink) {
    let event = match command {
        EngineCommand::FetchJobs => EngineEvent::JobsFetched(gateway.list_jobs().await),
        EngineCommand::FetchCandidates { page } => {
            let result = gateway.candidates_snapshot(page).await;
            EngineEvent::CandidatesFetched { page, result }
        }
        EngineCommand::FetchInterviews => {
            EngineEvent::InterviewsFetched(gateway.list_interviews().await)
        }
        EngineCommand::CreateJob(draft) => EngineEvent::JobCreated(gateway.create_job(&draft).await),
        EngineCommand::UpdateJob { job_id, draft } => {
            EngineEvent::JobUpdated(gateway.update_job(&job_id, &draft).await)
        }
        EngineCommand::DeleteJob { job_id } => {
            let result = gateway.delete_job(&job_id).await;
            EngineEvent::JobDeleted { job_id, result }
        }
        EngineCommand::PublishJob { job_id } => {
            EngineEvent::JobUpdated(gateway.publish_job(&job_id).await)
        }
        EngineCommand::CloseJob { job_id } => EngineEvent::JobUpdated(gateway.close_job(&job_id).await),
        EngineCommand::ScheduleInterviews(request) => {
            EngineEvent::InterviewsScheduled(gateway.schedule_interviews(&request).await)
        }
        EngineCommand::CancelInterview { interview_id } => {
            EngineEvent::InterviewUpdated(gateway.cancel_interview(&interview_id).await)
        }
        EngineCommand::CompleteInterview { interview_id } => {
            EngineEvent::InterviewUpdated(gateway.complete_interview(&interview_id).await)
        }
        EngineCommand::OpenStream { .. } | EngineCommand::CloseStream { .. } => return,
    };
    sink.emit(event);
}
