use hireintel_app::platform::commands::{parse_command, Command, CommandError};
use hireintel_core::{CandidateStatus, JobDraft, JobStatus, Msg, Page, ScheduleRequest};
use pretty_assertions::assert_eq;

fn dispatched(line: &str) -> Msg {
    match parse_command(line) {
        Ok(Some(Command::Dispatch(msg))) => msg,
        other => panic!("expected a message for '{line}', got {other:?}"),
    }
}

#[test]
fn blank_lines_are_ignored() {
    assert_eq!(parse_command("   "), Ok(None));
}

#[test]
fn navigation_commands() {
    assert_eq!(dispatched("page Jobs"), Msg::PageSelected(Page::Jobs));
    assert_eq!(dispatched("candidates-page 3"), Msg::CandidatePageSelected(3));
    assert_eq!(dispatched("refresh"), Msg::RefreshTick);
    assert!(matches!(
        parse_command("page reports"),
        Err(CommandError::Invalid(_))
    ));
}

#[test]
fn filter_and_search_set_and_clear() {
    assert_eq!(
        dispatched("filter hired"),
        Msg::StatusFilterChanged(Some(CandidateStatus::Hired))
    );
    assert_eq!(
        dispatched("filter on_call"),
        Msg::StatusFilterChanged(Some(CandidateStatus::Other("on_call".to_string())))
    );
    assert_eq!(dispatched("filter"), Msg::StatusFilterChanged(None));
    assert_eq!(
        dispatched("search  ada lovelace "),
        Msg::SearchChanged("ada lovelace".to_string())
    );
    assert_eq!(dispatched("search"), Msg::SearchChanged(String::new()));
}

#[test]
fn job_fields_become_a_draft() {
    let expected = JobDraft {
        title: Some("Backend Engineer".to_string()),
        location: Some("Remote".to_string()),
        min_experience_years: Some(3),
        status: Some(JobStatus::Active),
        ..JobDraft::default()
    };
    assert_eq!(
        dispatched("job title=Backend Engineer; location=Remote;min_experience_years=3;status=active"),
        Msg::CreateJobSubmitted(expected)
    );
    assert!(matches!(
        parse_command("job title=X;salary=lots"),
        Err(CommandError::Invalid(_))
    ));
    assert!(matches!(
        parse_command("job candidates_needed=many"),
        Err(CommandError::Invalid(_))
    ));
}

#[test]
fn job_lifecycle_commands_take_one_id() {
    assert_eq!(
        dispatched("edit j1 title=Staff Engineer"),
        Msg::EditJobSubmitted {
            job_id: "j1".to_string(),
            draft: JobDraft {
                title: Some("Staff Engineer".to_string()),
                ..JobDraft::default()
            },
        }
    );
    assert_eq!(
        dispatched("delete j1"),
        Msg::DeleteJobConfirmed {
            job_id: "j1".to_string()
        }
    );
    assert_eq!(
        dispatched("publish j1"),
        Msg::PublishJobClicked {
            job_id: "j1".to_string()
        }
    );
    assert_eq!(
        parse_command("close"),
        Err(CommandError::Usage("close <id>"))
    );
}

#[test]
fn schedule_and_interview_commands() {
    assert_eq!(
        dispatched("schedule c1,c2 2024-06-01 2024-06-07"),
        Msg::ScheduleSubmitted(ScheduleRequest {
            candidates: vec!["c1".to_string(), "c2".to_string()],
            start_date: "2024-06-01".to_string(),
            end_date: "2024-06-07".to_string(),
        })
    );
    assert!(matches!(
        parse_command("schedule c1 2024-06-01"),
        Err(CommandError::Usage(_))
    ));
    assert_eq!(
        dispatched("complete i4"),
        Msg::CompleteInterviewClicked {
            interview_id: "i4".to_string()
        }
    );
}

#[test]
fn stream_control_and_session_commands() {
    assert_eq!(dispatched("stream start"), Msg::StreamStartRequested);
    assert_eq!(dispatched("stream stop"), Msg::StreamStopRequested);
    assert!(matches!(
        parse_command("stream pause"),
        Err(CommandError::Usage(_))
    ));
    assert_eq!(parse_command("quit"), Ok(Some(Command::Quit)));
    assert_eq!(parse_command("help"), Ok(Some(Command::Help)));
    assert_eq!(
        parse_command("launch"),
        Err(CommandError::Unknown("launch".to_string()))
    );
}
