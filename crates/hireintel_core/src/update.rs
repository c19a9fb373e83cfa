use hireintel_logging::{hi_debug, hi_info, hi_warn};

use crate::{
    AppState, Effect, Failure, MessageOutcome, Msg, NotificationLevel, Resource, StreamStatus,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects: Vec<Effect> = match msg {
        Msg::Started => {
            if !state.begin_initial_load() {
                return (state, Vec::new());
            }
            hi_info!("Initial load requested");
            let mut effects: Vec<Effect> = Resource::ALL
                .into_iter()
                .filter_map(|resource| begin_fetch(&mut state, resource))
                .collect();
            effects.extend(restart_stream(&mut state));
            state.mark_dirty();
            effects
        }
        Msg::PageSelected(page) => {
            state.ui_mut().page = page;
            state.mark_dirty();
            page.fetched_resources()
                .iter()
                .filter_map(|resource| begin_fetch(&mut state, *resource))
                .collect()
        }
        Msg::StatusFilterChanged(filter) => {
            if state.ui().status_filter != filter {
                state.ui_mut().status_filter = filter;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SearchChanged(query) => {
            if state.ui().search_query != query {
                state.ui_mut().search_query = query;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::RefreshTick => refresh_effects(&mut state),
        Msg::CandidatePageSelected(page) => {
            let page = page.max(1);
            if state.ui().candidate_page == page {
                return (state, Vec::new());
            }
            state.ui_mut().candidate_page = page;
            state.mark_dirty();
            if state.stream_status() == StreamStatus::Closed {
                state.supersede_fetch(Resource::Candidates);
                vec![fetch_effect(&mut state, Resource::Candidates)]
            } else {
                restart_stream(&mut state)
            }
        }

        Msg::JobsLoaded(result) => {
            match result {
                Ok(jobs) => {
                    state.store_mut().replace_jobs(jobs);
                    state.clear_stale(Resource::Jobs);
                }
                Err(failure) => load_failed(&mut state, Resource::Jobs, &failure),
            }
            finish_load(&mut state, Resource::Jobs);
            Vec::new()
        }
        Msg::CandidatesLoaded { page, result } => {
            if !state.is_latest_candidate_fetch(page) {
                hi_debug!("Discarding candidates for page {}, superseded", page);
                return (state, Vec::new());
            }
            match result {
                Ok(_) if page != state.ui().candidate_page => {
                    hi_debug!("Candidates for page {} arrived after a page change", page);
                }
                Ok(snapshot) => {
                    state
                        .store_mut()
                        .replace_candidates(snapshot.candidates)
                        .set_candidate_page(snapshot.pagination);
                    state.clear_stale(Resource::Candidates);
                }
                Err(failure) => load_failed(&mut state, Resource::Candidates, &failure),
            }
            finish_load(&mut state, Resource::Candidates);
            Vec::new()
        }
        Msg::InterviewsLoaded(result) => {
            match result {
                Ok(interviews) => {
                    state.store_mut().replace_interviews(interviews);
                    state.clear_stale(Resource::Interviews);
                }
                Err(failure) => load_failed(&mut state, Resource::Interviews, &failure),
            }
            finish_load(&mut state, Resource::Interviews);
            Vec::new()
        }

        Msg::CreateJobSubmitted(draft) => {
            let has_title = draft
                .title
                .as_deref()
                .is_some_and(|title| !title.trim().is_empty());
            if !has_title {
                state.notify(NotificationLevel::Error, "A job needs a title");
                return (state, Vec::new());
            }
            vec![Effect::CreateJob(draft)]
        }
        Msg::JobCreated(result) => {
            match result {
                Ok(job) => {
                    hi_info!("Job {} created", job.id);
                    state.store_mut().append_job(job);
                    state.notify(NotificationLevel::Success, "Job created successfully!");
                }
                Err(failure) => report(&mut state, "Error creating job", &failure),
            }
            Vec::new()
        }
        Msg::EditJobSubmitted { job_id, draft } => vec![Effect::UpdateJob { job_id, draft }],
        Msg::PublishJobClicked { job_id } => vec![Effect::PublishJob { job_id }],
        Msg::CloseJobClicked { job_id } => vec![Effect::CloseJob { job_id }],
        Msg::JobUpdated(result) => {
            match result {
                Ok(job) => {
                    state.store_mut().upsert_job(job);
                    state.notify(NotificationLevel::Success, "Job updated");
                }
                Err(failure) => report(&mut state, "Error updating job", &failure),
            }
            Vec::new()
        }
        Msg::DeleteJobConfirmed { job_id } => vec![Effect::DeleteJob { job_id }],
        Msg::JobDeleted { job_id, result } => {
            match result {
                Ok(()) => {
                    if !state.store_mut().remove_job(&job_id) {
                        hi_debug!("Deleted job {} was not in the local snapshot", job_id);
                    }
                    state.notify(NotificationLevel::Success, "Job deleted");
                }
                Err(failure) => report(&mut state, "Error deleting job", &failure),
            }
            Vec::new()
        }

        Msg::ScheduleSubmitted(request) => {
            if request.candidates.is_empty() {
                state.notify(
                    NotificationLevel::Error,
                    "Select at least one candidate to schedule",
                );
                return (state, Vec::new());
            }
            vec![Effect::ScheduleInterviews(request)]
        }
        Msg::InterviewsScheduled(result) => match result {
            Ok(()) => {
                state.notify(
                    NotificationLevel::Success,
                    "Interviews scheduled successfully!",
                );
                begin_fetch(&mut state, Resource::Interviews)
                    .into_iter()
                    .collect()
            }
            Err(failure) => {
                report(&mut state, "Error scheduling interviews", &failure);
                Vec::new()
            }
        },
        Msg::CancelInterviewClicked { interview_id } => {
            vec![Effect::CancelInterview { interview_id }]
        }
        Msg::CompleteInterviewClicked { interview_id } => {
            vec![Effect::CompleteInterview { interview_id }]
        }
        Msg::InterviewUpdated(result) => {
            match result {
                Ok(interview) => {
                    state.store_mut().upsert_interview(interview);
                    state.notify(NotificationLevel::Success, "Interview updated");
                }
                Err(failure) => report(&mut state, "Error updating interview", &failure),
            }
            Vec::new()
        }

        Msg::StreamStartRequested => {
            state.mark_dirty();
            restart_stream(&mut state)
        }
        Msg::StreamStopRequested => {
            let released = state.stream_mut().stop();
            state.mark_dirty();
            released
                .map(|subscription| Effect::CloseStream { subscription })
                .into_iter()
                .collect()
        }
        Msg::StreamMessage {
            subscription,
            payload,
        } => {
            let (stream, store) = state.stream_and_store_mut();
            match stream.on_message(subscription, &payload, store) {
                MessageOutcome::Applied { recovered, .. } => {
                    state.clear_stale(Resource::Candidates);
                    state.mark_dirty();
                    if recovered {
                        state.notify(NotificationLevel::Info, "Live updates restored");
                    }
                }
                MessageOutcome::Dropped(_) => {}
                MessageOutcome::Stale => {
                    hi_debug!("Ignoring message from closed subscription {}", subscription);
                }
            }
            Vec::new()
        }
        Msg::StreamTransportError {
            subscription,
            reason,
        } => {
            if state.stream_mut().on_transport_error(subscription) {
                hi_warn!("Live stream degraded: {}", reason);
                state.notify(
                    NotificationLevel::Warning,
                    "Connection lost. Attempting to reconnect...",
                );
            }
            Vec::new()
        }
        Msg::StreamGaveUp {
            subscription,
            reason,
        } => {
            if state.stream_mut().on_gave_up(subscription) {
                state.mark_stale(Resource::Candidates);
                state.notify(
                    NotificationLevel::Error,
                    format!("Live updates stopped: {reason}"),
                );
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn fetch_effect(state: &mut AppState, resource: Resource) -> Effect {
    match resource {
        Resource::Jobs => Effect::FetchJobs,
        Resource::Candidates => {
            let page = state.ui().candidate_page;
            state.record_candidate_fetch(page);
            Effect::FetchCandidates { page }
        }
        Resource::Interviews => Effect::FetchInterviews,
    }
}

/// Fetch effect for `resource`, unless a fetch for it is already running.
fn begin_fetch(state: &mut AppState, resource: Resource) -> Option<Effect> {
    if !state.try_begin_fetch(resource) {
        return None;
    }
    Some(fetch_effect(state, resource))
}

fn restart_stream(state: &mut AppState) -> Vec<Effect> {
    let restart = state.stream_mut().start();
    let page = state.ui().candidate_page;
    let mut effects = Vec::with_capacity(2);
    if let Some(subscription) = restart.closed {
        effects.push(Effect::CloseStream { subscription });
    }
    effects.push(Effect::OpenStream {
        subscription: restart.opened,
        page,
    });
    effects
}

/// Timer policy: refresh what the current page shows, retry stale collections
/// and poll candidates while the stream is not delivering.
fn refresh_effects(state: &mut AppState) -> Vec<Effect> {
    if !state.is_ready() {
        return Vec::new();
    }
    let page = state.ui().page;
    let mut wanted: Vec<Resource> = page.fetched_resources().to_vec();
    wanted.extend(state.stale_resources());
    if page.shows_candidates() && state.stream_status() != StreamStatus::Open {
        wanted.push(Resource::Candidates);
    }
    wanted.sort();
    wanted.dedup();
    wanted
        .into_iter()
        .filter_map(|resource| begin_fetch(state, resource))
        .collect()
}

fn load_failed(state: &mut AppState, resource: Resource, failure: &Failure) {
    hi_warn!("Fetching {} failed: {}", resource.label(), failure);
    let streamed = resource == Resource::Candidates && state.stream().messages_applied() > 0;
    if state.is_initial_pending(resource) && !streamed {
        // An initial failure leaves the collection empty rather than blocking.
        match resource {
            Resource::Jobs => {
                state.store_mut().replace_jobs(Vec::new());
            }
            Resource::Candidates => {
                state.store_mut().replace_candidates(Vec::new());
            }
            Resource::Interviews => {
                state.store_mut().replace_interviews(Vec::new());
            }
        }
    }
    let stream_covers =
        resource == Resource::Candidates && state.stream_status() == StreamStatus::Open;
    if failure.retryable && !stream_covers {
        state.mark_stale(resource);
    }
    state.notify(
        NotificationLevel::Error,
        format!("Error loading {}", resource.label()),
    );
}

fn finish_load(state: &mut AppState, resource: Resource) {
    if state.settle(resource) {
        hi_info!("Initial load settled");
    }
    state.mark_dirty();
}

fn report(state: &mut AppState, context: &str, failure: &Failure) {
    hi_warn!("{}: {}", context, failure);
    state.notify(NotificationLevel::Error, format!("{context}: {}", failure.message));
}
