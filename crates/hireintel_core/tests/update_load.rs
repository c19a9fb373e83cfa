use std::sync::Once;

use hireintel_core::{
    update, AppState, Candidate, CandidatePage, Effect, Failure, FailureClass, Interview, Job,
    JobDraft, JobStatus, Msg, NotificationLevel, Page, PageView, Resource, ScheduleRequest,
    StreamStatus,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(hireintel_logging::initialize_for_tests);
}

fn job(id: &str, status: JobStatus) -> Job {
    Job {
        id: id.to_string(),
        title: format!("Job {id}"),
        description: None,
        industry: None,
        department: None,
        location: Some("Remote".to_string()),
        status,
        created_at: None,
    }
}

fn candidate(id: &str) -> Candidate {
    Candidate {
        id: id.to_string(),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: "grace@example.com".to_string(),
        current_position: None,
        years_of_experience: Some(12),
        status: Default::default(),
        pipeline_status: "xml".to_string(),
        job_id: None,
    }
}

/// Completion of the page-1 fetch issued by `Msg::Started`.
fn candidates_loaded(result: Result<CandidatePage, Failure>) -> Msg {
    Msg::CandidatesLoaded { page: 1, result }
}

fn network_failure() -> Failure {
    Failure::new(FailureClass::Network, "connection refused", true)
}

fn started() -> AppState {
    let (state, _) = update(AppState::new(), Msg::Started);
    state
}

#[test]
fn started_issues_three_fetches_and_opens_stream() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::Started);

    assert_eq!(
        effects,
        vec![
            Effect::FetchJobs,
            Effect::FetchCandidates { page: 1 },
            Effect::FetchInterviews,
            Effect::OpenStream {
                subscription: 1,
                page: 1
            },
        ]
    );
    assert!(!state.is_ready());

    let (_, again) = update(state, Msg::Started);
    assert!(again.is_empty());
}

#[test]
fn failed_interviews_fetch_settles_to_empty_without_blocking() {
    init_logging();
    let state = started();

    let (state, _) = update(state, Msg::JobsLoaded(Ok(vec![job("j1", JobStatus::Active)])));
    let (state, _) = update(
        state,
        Msg::InterviewsLoaded(Err(Failure::new(
            FailureClass::Application,
            "http status 500",
            true,
        ))),
    );
    assert!(!state.is_ready());
    let (mut state, _) = update(
        state,
        candidates_loaded(Ok(CandidatePage {
            candidates: vec![candidate("c1")],
            pagination: None,
        })),
    );

    assert!(state.is_ready());
    assert_eq!(state.store().jobs().len(), 1);
    assert_eq!(state.store().candidates().len(), 1);
    assert!(state.store().interviews().is_empty());
    assert!(state.is_stale(Resource::Interviews));

    let notes = state.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert!(state.view().ready);
}

#[test]
fn later_refresh_failure_keeps_existing_snapshot() {
    init_logging();
    let state = started();
    let (state, _) = update(state, Msg::JobsLoaded(Ok(vec![job("j1", JobStatus::Active)])));
    let (state, _) = update(state, candidates_loaded(Ok(CandidatePage::default())));
    let (state, _) = update(state, Msg::InterviewsLoaded(Ok(Vec::new())));
    assert!(state.is_ready());

    let (state, effects) = update(state, Msg::PageSelected(Page::Jobs));
    assert_eq!(effects, vec![Effect::FetchJobs]);
    let (state, _) = update(state, Msg::JobsLoaded(Err(network_failure())));

    assert_eq!(state.store().jobs().len(), 1);
    assert!(state.is_stale(Resource::Jobs));

    // Non-retryable failures are not queued for the refresh timer.
    let (state, _) = update(state, Msg::PageSelected(Page::Interviews));
    let (state, _) = update(
        state,
        Msg::InterviewsLoaded(Err(Failure::new(FailureClass::Decode, "bad json", false))),
    );
    assert!(!state.is_stale(Resource::Interviews));
}

#[test]
fn refresh_tick_refetches_page_data_and_stale_collections() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::Started);
    let sub = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::OpenStream { subscription, .. } => Some(*subscription),
            _ => None,
        })
        .expect("stream opened");

    // Ticks before the initial load settles are ignored.
    let (state, effects) = update(state, Msg::RefreshTick);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::JobsLoaded(Err(network_failure())));
    let (state, _) = update(state, candidates_loaded(Ok(CandidatePage::default())));
    let (state, _) = update(state, Msg::InterviewsLoaded(Ok(Vec::new())));
    let (state, _) = update(
        state,
        Msg::StreamMessage {
            subscription: sub,
            payload: r#"{"error": false, "data": {"candidates": []}}"#.to_string(),
        },
    );

    let (state, effects) = update(state, Msg::PageSelected(Page::Candidates));
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::RefreshTick);
    assert_eq!(effects, vec![Effect::FetchJobs]);

    // Already in flight: a second tick does not duplicate the request.
    let (_, effects) = update(state, Msg::RefreshTick);
    assert!(effects.is_empty());
}

#[test]
fn refresh_polls_candidates_while_stream_is_down() {
    init_logging();
    let state = started();
    let (state, _) = update(state, Msg::JobsLoaded(Ok(Vec::new())));
    let (state, _) = update(state, candidates_loaded(Ok(CandidatePage::default())));
    let (state, _) = update(state, Msg::InterviewsLoaded(Ok(Vec::new())));
    let (state, _) = update(state, Msg::PageSelected(Page::Pipeline));

    let (_, effects) = update(state, Msg::RefreshTick);
    assert_eq!(effects, vec![Effect::FetchCandidates { page: 1 }]);
}

#[test]
fn filter_and_search_are_view_only() {
    init_logging();
    let state = started();
    let mut hired = candidate("c2");
    hired.status = "hired".into();
    let (state, _) = update(
        state,
        candidates_loaded(Ok(CandidatePage {
            candidates: vec![candidate("c1"), hired],
            pagination: None,
        })),
    );
    let before = state.store().clone();

    let (state, _) = update(state, Msg::PageSelected(Page::Candidates));
    let (state, effects) = update(state, Msg::StatusFilterChanged(Some("hired".into())));
    assert!(effects.is_empty());
    let (state, _) = update(state, Msg::SearchChanged("grace".to_string()));

    let view = state.view();
    match view.body {
        PageView::Candidates { cards, .. } => {
            assert_eq!(cards.len(), 1);
            assert_eq!(cards[0].candidate_id, "c2");
            assert_eq!(cards[0].initials, "GH");
            assert_eq!(cards[0].experience, "12 years");
        }
        other => panic!("unexpected page {other:?}"),
    }
    assert_eq!(view.search_results.len(), 2);
    assert_eq!(state.store(), &before);
}

#[test]
fn create_job_appends_on_success_and_reports_failure() {
    init_logging();
    let draft = JobDraft {
        title: Some("Platform Engineer".to_string()),
        location: Some("Berlin".to_string()),
        ..JobDraft::default()
    };
    let (state, effects) = update(AppState::new(), Msg::CreateJobSubmitted(draft.clone()));
    assert_eq!(effects, vec![Effect::CreateJob(draft)]);

    let (mut state, _) = update(state, Msg::JobCreated(Ok(job("j9", JobStatus::Draft))));
    assert_eq!(state.store().jobs().len(), 1);
    assert_eq!(state.take_notifications()[0].level, NotificationLevel::Success);

    let (mut state, _) = update(
        state,
        Msg::JobCreated(Err(Failure::new(
            FailureClass::Application,
            "title missing",
            false,
        ))),
    );
    assert_eq!(state.store().jobs().len(), 1);
    let notes = state.take_notifications();
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert!(notes[0].message.contains("title missing"));
}

#[test]
fn create_job_without_title_is_rejected_locally() {
    let (mut state, effects) = update(AppState::new(), Msg::CreateJobSubmitted(JobDraft::default()));
    assert!(effects.is_empty());
    assert_eq!(state.take_notifications()[0].level, NotificationLevel::Error);
}

#[test]
fn edit_and_delete_follow_server_outcome() {
    init_logging();
    let state = started();
    let (state, _) = update(
        state,
        Msg::JobsLoaded(Ok(vec![job("j1", JobStatus::Draft), job("j2", JobStatus::Active)])),
    );

    let (state, effects) = update(
        state,
        Msg::PublishJobClicked {
            job_id: "j1".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::PublishJob {
            job_id: "j1".to_string()
        }]
    );
    let (state, _) = update(state, Msg::JobUpdated(Ok(job("j1", JobStatus::Active))));
    assert_eq!(state.store().jobs()[0].status, JobStatus::Active);

    let (state, _) = update(
        state,
        Msg::JobDeleted {
            job_id: "j2".to_string(),
            result: Err(network_failure()),
        },
    );
    assert_eq!(state.store().jobs().len(), 2);

    let (state, _) = update(
        state,
        Msg::JobDeleted {
            job_id: "j2".to_string(),
            result: Ok(()),
        },
    );
    let ids: Vec<_> = state.store().jobs().iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["j1"]);
}

#[test]
fn scheduling_refreshes_interviews_on_success() {
    init_logging();
    let empty = ScheduleRequest {
        candidates: Vec::new(),
        start_date: "2025-05-01".to_string(),
        end_date: "2025-05-02".to_string(),
    };
    let (mut state, effects) = update(AppState::new(), Msg::ScheduleSubmitted(empty));
    assert!(effects.is_empty());
    assert_eq!(state.take_notifications()[0].level, NotificationLevel::Error);

    let request = ScheduleRequest {
        candidates: vec!["c1".to_string(), "c2".to_string()],
        start_date: "2025-05-01".to_string(),
        end_date: "2025-05-02".to_string(),
    };
    let (state, effects) = update(state, Msg::ScheduleSubmitted(request.clone()));
    assert_eq!(effects, vec![Effect::ScheduleInterviews(request)]);

    let (state, effects) = update(state, Msg::InterviewsScheduled(Ok(())));
    assert_eq!(effects, vec![Effect::FetchInterviews]);

    let scheduled = Interview {
        id: "i1".to_string(),
        candidate_id: "c1".to_string(),
        candidate_name: None,
        job_id: None,
        scheduled_date: None,
        status: "scheduled".into(),
    };
    let (state, _) = update(state, Msg::InterviewsLoaded(Ok(vec![scheduled.clone()])));
    let mut cancelled = scheduled;
    cancelled.status = "cancelled".into();
    let (state, _) = update(state, Msg::InterviewUpdated(Ok(cancelled.clone())));
    assert_eq!(state.store().interviews(), &[cancelled]);
}

#[test]
fn candidate_page_change_restarts_open_stream() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::StreamStartRequested);
    let (state, effects) = update(state, Msg::CandidatePageSelected(3));

    assert_eq!(
        effects,
        vec![
            Effect::CloseStream { subscription: 1 },
            Effect::OpenStream {
                subscription: 2,
                page: 3
            },
        ]
    );
    assert_eq!(state.ui().candidate_page, 3);

    let (_, effects) = update(state, Msg::CandidatePageSelected(3));
    assert!(effects.is_empty());
}

fn settled_with_stream_stopped() -> AppState {
    let state = started();
    let (state, _) = update(state, Msg::JobsLoaded(Ok(Vec::new())));
    let (state, _) = update(state, candidates_loaded(Ok(CandidatePage::default())));
    let (state, _) = update(state, Msg::InterviewsLoaded(Ok(Vec::new())));
    let (state, _) = update(state, Msg::StreamStopRequested);
    assert!(state.is_ready());
    state
}

#[test]
fn page_change_while_polling_supersedes_the_running_fetch() {
    init_logging();
    let state = settled_with_stream_stopped();
    let (state, _) = update(state, Msg::PageSelected(Page::Candidates));

    let (state, effects) = update(state, Msg::RefreshTick);
    assert_eq!(effects, vec![Effect::FetchCandidates { page: 1 }]);

    let (state, effects) = update(state, Msg::CandidatePageSelected(2));
    assert_eq!(effects, vec![Effect::FetchCandidates { page: 2 }]);
    assert_eq!(state.ui().candidate_page, 2);

    // The page-1 result lands late and must not be shown as page 2.
    let (state, _) = update(
        state,
        candidates_loaded(Ok(CandidatePage {
            candidates: vec![candidate("c1")],
            pagination: None,
        })),
    );
    assert!(state.store().candidates().is_empty());

    let (state, _) = update(
        state,
        Msg::CandidatesLoaded {
            page: 2,
            result: Ok(CandidatePage {
                candidates: vec![candidate("c11"), candidate("c12")],
                pagination: None,
            }),
        },
    );
    let ids: Vec<_> = state
        .store()
        .candidates()
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(ids, vec!["c11", "c12"]);

    // The page-2 fetch settled, so the next tick may poll again.
    let (_, effects) = update(state, Msg::RefreshTick);
    assert_eq!(effects, vec![Effect::FetchCandidates { page: 2 }]);
}

#[test]
fn failed_initial_snapshot_keeps_streamed_candidates() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::Started);
    let sub = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::OpenStream { subscription, .. } => Some(*subscription),
            _ => None,
        })
        .expect("stream opened");

    let (state, _) = update(
        state,
        Msg::StreamMessage {
            subscription: sub,
            payload: r#"{"error": false, "data": {"candidates": [
                {"id": "c1", "first_name": "Ada", "last_name": "Lovelace", "email": "ada@example.com"},
                {"id": "c2", "first_name": "Alan", "last_name": "Turing", "email": "alan@example.com"}
            ]}}"#
                .to_string(),
        },
    );
    assert_eq!(state.store().candidates().len(), 2);

    let (state, _) = update(state, candidates_loaded(Err(network_failure())));

    assert_eq!(state.store().candidates().len(), 2);
    assert_eq!(state.stream_status(), StreamStatus::Open);
    assert!(!state.is_stale(Resource::Candidates));
}
