use std::sync::mpsc;
use std::thread;

use hireintel_core::{Effect, Failure, FailureClass, Msg};
use hireintel_engine::{
    EngineEvent, EngineEvents, EngineHandle, FailureKind, FetchSettings, GatewayError,
    ReconnectPolicy, StreamEvent, StreamEventKind,
};
use hireintel_logging::{hi_debug, hi_info};

use super::app::Input;

/// Executes effects on the engine and feeds its completions back as messages.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub(crate) fn new(
        settings: FetchSettings,
        policy: ReconnectPolicy,
        input_tx: mpsc::Sender<Input>,
    ) -> anyhow::Result<Self> {
        hi_info!(
            "Backend {}{} ({} candidates per page)",
            settings.base_url,
            settings.api_prefix,
            settings.per_page
        );
        let (engine, events) = EngineHandle::new(settings, policy)?;
        spawn_event_loop(events, input_tx)?;
        Ok(Self { engine })
    }

    pub(crate) fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            hi_debug!("Effect {:?}", effect);
            match effect {
                Effect::FetchJobs => self.engine.fetch_jobs(),
                Effect::FetchCandidates { page } => self.engine.fetch_candidates(page),
                Effect::FetchInterviews => self.engine.fetch_interviews(),
                Effect::CreateJob(draft) => self.engine.create_job(draft),
                Effect::UpdateJob { job_id, draft } => self.engine.update_job(job_id, draft),
                Effect::DeleteJob { job_id } => self.engine.delete_job(job_id),
                Effect::PublishJob { job_id } => self.engine.publish_job(job_id),
                Effect::CloseJob { job_id } => self.engine.close_job(job_id),
                Effect::ScheduleInterviews(request) => self.engine.schedule_interviews(request),
                Effect::CancelInterview { interview_id } => {
                    self.engine.cancel_interview(interview_id)
                }
                Effect::CompleteInterview { interview_id } => {
                    self.engine.complete_interview(interview_id)
                }
                Effect::OpenStream { subscription, page } => {
                    self.engine.open_stream(subscription, page)
                }
                Effect::CloseStream { subscription } => self.engine.close_stream(subscription),
            }
        }
    }
}

fn spawn_event_loop(events: EngineEvents, input_tx: mpsc::Sender<Input>) -> std::io::Result<()> {
    thread::Builder::new()
        .name("hireintel-events".to_string())
        .spawn(move || {
            while let Some(event) = events.recv() {
                let Some(msg) = to_msg(event) else {
                    continue;
                };
                if input_tx.send(Input::Msg(msg)).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}

fn to_msg(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::JobsFetched(result) => Msg::JobsLoaded(result.map_err(map_failure)),
        EngineEvent::CandidatesFetched { page, result } => Msg::CandidatesLoaded {
            page,
            result: result.map_err(map_failure),
        },
        EngineEvent::InterviewsFetched(result) => {
            Msg::InterviewsLoaded(result.map_err(map_failure))
        }
        EngineEvent::JobCreated(result) => Msg::JobCreated(result.map_err(map_failure)),
        EngineEvent::JobUpdated(result) => Msg::JobUpdated(result.map_err(map_failure)),
        EngineEvent::JobDeleted { job_id, result } => Msg::JobDeleted {
            job_id,
            result: result.map_err(map_failure),
        },
        EngineEvent::InterviewsScheduled(result) => {
            Msg::InterviewsScheduled(result.map_err(map_failure))
        }
        EngineEvent::InterviewUpdated(result) => {
            Msg::InterviewUpdated(result.map_err(map_failure))
        }
        EngineEvent::Stream(StreamEvent { subscription, kind }) => match kind {
            StreamEventKind::Connected => {
                hi_debug!("Subscription {} connected", subscription);
                return None;
            }
            StreamEventKind::Message(payload) => Msg::StreamMessage {
                subscription,
                payload,
            },
            StreamEventKind::TransportError { reason, .. } => Msg::StreamTransportError {
                subscription,
                reason,
            },
            StreamEventKind::GaveUp { reason } => Msg::StreamGaveUp {
                subscription,
                reason,
            },
        },
    };
    Some(msg)
}

/// Classify a gateway error for the core. Anything the backend answered is
/// an application failure, whatever the status code.
pub fn map_failure(err: GatewayError) -> Failure {
    let retryable = err.kind.is_retryable();
    match err.kind {
        FailureKind::Application => Failure::new(FailureClass::Application, err.message, retryable),
        FailureKind::HttpStatus(_) => {
            Failure::new(FailureClass::Application, err.to_string(), retryable)
        }
        FailureKind::Decode => Failure::new(FailureClass::Decode, err.to_string(), retryable),
        FailureKind::InvalidUrl | FailureKind::Network | FailureKind::Timeout => {
            Failure::new(FailureClass::Network, err.to_string(), retryable)
        }
    }
}
