use pretty_assertions::assert_eq;
use taskdeck_core::{
    update, AppState, Effect, LogTail, LogViewport, Msg, ViewChange, LOG_BUFFER_CAP,
    LOG_BUFFER_KEEP,
};

fn connected() -> AppState {
    let (state, _) = update(AppState::new(), Msg::ConnectRequested);
    let (state, _) = update(state, Msg::StreamOpened { generation: 1 });
    state
}

fn log_event(task_id: &str, line: &str) -> Msg {
    Msg::StreamEventReceived {
        generation: 1,
        name: "task.log".to_string(),
        data: serde_json::json!({ "task_id": task_id, "line": line }).to_string(),
    }
}

fn open_with_tail(state: AppState, task_id: &str, lines: &[&str], truncated: bool) -> AppState {
    let (state, effects) = update(
        state,
        Msg::LogOpened {
            task_id: task_id.to_string(),
        },
    );
    let request = match effects.as_slice() {
        [Effect::FetchLogTail {
            task_id: fetched,
            tail,
            request,
        }] => {
            assert_eq!(fetched, task_id);
            assert_eq!(*tail, 600);
            *request
        }
        other => panic!("unexpected effects {other:?}"),
    };
    let (mut state, _) = update(
        state,
        Msg::LogTailLoaded {
            task_id: task_id.to_string(),
            request,
            result: Ok(LogTail {
                lines: lines.iter().map(|line| line.to_string()).collect(),
                truncated,
            }),
        },
    );
    state.take_view_changes();
    state
}

#[test]
fn open_shows_loading_then_replaces_with_tail() {
    let (mut state, _) = update(
        connected(),
        Msg::LogOpened {
            task_id: "t1".to_string(),
        },
    );
    let log = state.view().log.expect("log open");
    assert_eq!(log.text, "Loading…\n");
    assert_eq!(log.title, "Logs: t1");
    state.take_view_changes();

    let (mut state, _) = update(
        state,
        Msg::LogTailLoaded {
            task_id: "t1".to_string(),
            request: 1,
            result: Ok(LogTail {
                lines: vec!["one".to_string(), "two".to_string()],
                truncated: true,
            }),
        },
    );
    let log = state.view().log.expect("log open");
    assert_eq!(log.text, "one\ntwo\n");
    assert_eq!(log.title, "Logs: t1 (truncated)");
    assert_eq!(
        state.take_view_changes(),
        vec![
            ViewChange::LogTitle("Logs: t1 (truncated)".to_string()),
            ViewChange::ReplaceLog("one\ntwo\n".to_string()),
            ViewChange::ScrollLogToBottom,
        ]
    );
}

#[test]
fn reopening_discards_previously_streamed_lines() {
    let state = open_with_tail(connected(), "t1", &["a"], false);
    let (state, _) = update(state, log_event("t1", "streamed"));
    assert_eq!(state.view().log.unwrap().text, "a\nstreamed\n");

    let state = open_with_tail(state, "t1", &["b"], false);
    assert_eq!(state.view().log.unwrap().text, "b\n");
}

#[test]
fn streamed_lines_only_reach_the_open_target() {
    let state = open_with_tail(connected(), "t1", &[], false);
    let (mut state, _) = update(state, log_event("t2", "other task"));
    assert!(state.take_view_changes().is_empty());

    let (mut state, _) = update(state, log_event("t1", "hello"));
    assert_eq!(state.view().log.unwrap().text, "hello\n");
    assert_eq!(
        state.take_view_changes(),
        vec![
            ViewChange::AppendLog("hello\n".to_string()),
            ViewChange::ScrollLogToBottom,
        ]
    );
}

#[test]
fn closed_viewer_ignores_its_former_task() {
    let state = open_with_tail(connected(), "t1", &["a"], false);
    let (mut state, _) = update(state, Msg::LogClosed);
    assert_eq!(state.take_view_changes(), vec![ViewChange::CloseLog]);
    state.consume_dirty();

    let (mut state, _) = update(state, log_event("t1", "late line"));
    assert!(state.view().log.is_none());
    assert!(state.take_view_changes().is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn append_over_cap_drops_oldest_content() {
    let filler = "y".repeat(9_999);
    let lines: Vec<&str> = std::iter::repeat(filler.as_str()).take(30).collect();
    let state = open_with_tail(connected(), "t1", &lines, false);
    assert_eq!(
        state.view().log.as_ref().unwrap().text.chars().count(),
        LOG_BUFFER_CAP
    );

    let (mut state, _) = update(state, log_event("t1", "latest"));
    let text = state.view().log.unwrap().text;
    assert!(text.chars().count() <= LOG_BUFFER_CAP);
    assert_eq!(text.chars().count(), LOG_BUFFER_KEEP);
    assert!(text.ends_with("latest\n"));
    // Trimmed buffer is pushed whole instead of as an append.
    assert!(matches!(
        state.take_view_changes().first(),
        Some(ViewChange::ReplaceLog(_))
    ));
}

#[test]
fn scrolled_up_viewer_is_not_dragged_to_bottom() {
    let lines: Vec<String> = (0..100).map(|n| format!("line {n}")).collect();
    let line_refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let state = open_with_tail(connected(), "t1", &line_refs, false);

    let (state, _) = update(
        state,
        Msg::LogViewportChanged(LogViewport {
            top_line: 10,
            visible_lines: 20,
        }),
    );
    let (mut state, _) = update(state, log_event("t1", "new"));
    assert_eq!(
        state.take_view_changes(),
        vec![ViewChange::AppendLog("new\n".to_string())]
    );

    // Back near the bottom: appends follow again.
    let (state, _) = update(
        state,
        Msg::LogViewportChanged(LogViewport {
            top_line: 80,
            visible_lines: 20,
        }),
    );
    let (mut state, _) = update(state, log_event("t1", "newer"));
    assert_eq!(
        state.take_view_changes(),
        vec![
            ViewChange::AppendLog("newer\n".to_string()),
            ViewChange::ScrollLogToBottom,
        ]
    );
}

#[test]
fn failed_tail_shows_error_line() {
    let (state, _) = update(
        connected(),
        Msg::LogOpened {
            task_id: "t1".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::LogTailLoaded {
            task_id: "t1".to_string(),
            request: 1,
            result: Err("request failed: 404 task not found".to_string()),
        },
    );
    assert_eq!(
        state.view().log.unwrap().text,
        "Failed to load logs: request failed: 404 task not found\n"
    );
}

#[test]
fn refresh_refetches_and_stale_tail_is_dropped() {
    let state = open_with_tail(connected(), "t1", &["a"], false);
    let (state, effects) = update(state, Msg::LogRefreshRequested);
    assert_eq!(
        effects,
        vec![Effect::FetchLogTail {
            task_id: "t1".to_string(),
            tail: 600,
            request: 2,
        }]
    );
    let (state, effects) = update(state, Msg::LogRefreshRequested);
    assert_eq!(effects.len(), 1);

    // Answer to the superseded request 2 arrives after request 3 was issued.
    let (state, _) = update(
        state,
        Msg::LogTailLoaded {
            task_id: "t1".to_string(),
            request: 2,
            result: Ok(LogTail {
                lines: vec!["old".to_string()],
                truncated: false,
            }),
        },
    );
    assert_eq!(state.view().log.unwrap().text, "Loading…\n");

    let (state, _) = update(
        state,
        Msg::LogTailLoaded {
            task_id: "t1".to_string(),
            request: 3,
            result: Ok(LogTail {
                lines: vec!["fresh".to_string()],
                truncated: false,
            }),
        },
    );
    assert_eq!(state.view().log.unwrap().text, "fresh\n");
}

#[test]
fn refresh_without_open_viewer_does_nothing() {
    let (_state, effects) = update(connected(), Msg::LogRefreshRequested);
    assert!(effects.is_empty());
}

#[test]
fn raw_log_request_becomes_effect() {
    let (_state, effects) = update(
        AppState::new(),
        Msg::RawLogRequested {
            task_id: "t1".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::OpenRawLog {
            task_id: "t1".to_string()
        }]
    );
}
