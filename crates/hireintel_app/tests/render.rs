use hireintel_app::platform::ui::render::{render, render_notification};
use hireintel_core::{update, AppState, Msg, Notification, NotificationLevel, Page};
use serde_json::json;

fn state_with_candidates() -> AppState {
    let (state, _) = update(AppState::new(), Msg::Started);
    let subscription = state.stream().active().expect("subscription");
    let payload = json!({
        "error": false,
        "data": {
            "candidates": [
                {"id": "c1", "first_name": "Ada", "last_name": "Lovelace", "email": "ada@example.com",
                 "status": "hired", "pipeline_status": "profile_creation"},
                {"id": "c2", "first_name": "Alan", "last_name": "Turing", "email": "alan@example.com",
                 "status": "applied", "pipeline_status": "xml"}
            ],
            "pagination": {"total": 2, "page": 1, "per_page": 10, "total_pages": 1}
        }
    })
    .to_string();
    let (state, _) = update(
        state,
        Msg::StreamMessage {
            subscription,
            payload,
        },
    );
    state
}

#[test]
fn header_shows_stats_and_stream_state() {
    let text = render(&state_with_candidates().view());

    assert!(text.contains("live updates: live"), "{text}");
    assert!(text.contains("Candidates: 2"), "{text}");
    assert!(text.contains("Hired: 1"), "{text}");
    assert!(text.contains("loading..."), "{text}");
}

#[test]
fn candidates_page_lists_cards_and_pagination() {
    let (state, _) = update(state_with_candidates(), Msg::PageSelected(Page::Candidates));
    let text = render(&state.view());

    assert!(text.contains("[AL] Ada Lovelace <ada@example.com>"), "{text}");
    assert!(text.contains("Page 1 of 1 (2 total)"), "{text}");
    assert!(text.contains("Schedulable:"), "{text}");
}

#[test]
fn search_results_are_listed_under_the_header() {
    let (state, _) = update(state_with_candidates(), Msg::SearchChanged("turing".to_string()));
    let text = render(&state.view());

    assert!(text.contains("Search 'turing': 1 result(s)"), "{text}");
    assert!(text.contains("[candidate] Alan Turing - alan@example.com (c2)"), "{text}");
}

#[test]
fn notifications_are_tagged_by_level() {
    let line = render_notification(&Notification {
        level: NotificationLevel::Warning,
        message: "Connection lost".to_string(),
    });
    assert_eq!(line, "[warn] Connection lost");
}
