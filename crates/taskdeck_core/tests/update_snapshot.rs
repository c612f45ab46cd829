use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use taskdeck_core::{
    update, AppState, Effect, Msg, StatusStyle, Task, TaskAction, TaskListView, TaskStatus,
    TimerKind, ViewChange,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(sync_logging::initialize_for_tests);
}

fn task(id: &str, status: TaskStatus) -> Task {
    let mut task = Task::new(id, format!("{id}.bin"));
    task.status = status;
    task
}

fn fetch_epoch(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchSnapshot { epoch } => Some(*epoch),
            _ => None,
        })
        .expect("snapshot effect")
}

fn row_ids(state: &AppState) -> Vec<String> {
    state
        .view()
        .list
        .rows()
        .iter()
        .map(|row| row.task_id.clone())
        .collect()
}

#[test]
fn late_older_snapshot_never_overwrites_newer_one() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RefreshRequested);
    let epoch_a = fetch_epoch(&effects);
    let (state, effects) = update(state, Msg::RefreshRequested);
    let epoch_b = fetch_epoch(&effects);
    assert!(epoch_b > epoch_a);

    // B resolves first, A arrives late.
    let (state, _) = update(
        state,
        Msg::SnapshotLoaded {
            epoch: epoch_b,
            result: Ok(vec![task("fresh", TaskStatus::Running)]),
        },
    );
    let (mut state, _) = update(
        state,
        Msg::SnapshotLoaded {
            epoch: epoch_a,
            result: Ok(vec![task("stale", TaskStatus::Pending)]),
        },
    );

    assert_eq!(row_ids(&state), vec!["fresh".to_string()]);
    assert_eq!(state.view().stale_snapshots_dropped, 1);
    let changes = state.take_view_changes();
    assert_eq!(changes.len(), 1);
}

#[test]
fn stale_failure_does_not_clobber_newer_success() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RefreshRequested);
    let epoch_a = fetch_epoch(&effects);
    let (state, effects) = update(state, Msg::RefreshRequested);
    let epoch_b = fetch_epoch(&effects);

    let (state, _) = update(
        state,
        Msg::SnapshotLoaded {
            epoch: epoch_b,
            result: Ok(vec![task("t1", TaskStatus::Completed)]),
        },
    );
    let (state, _) = update(
        state,
        Msg::SnapshotLoaded {
            epoch: epoch_a,
            result: Err("request failed: 500 boom".to_string()),
        },
    );

    assert_eq!(row_ids(&state), vec!["t1".to_string()]);
}

#[test]
fn empty_collection_renders_placeholder_and_failure_renders_error() {
    let (state, effects) = update(AppState::new(), Msg::RefreshRequested);
    let (state, _) = update(
        state,
        Msg::SnapshotLoaded {
            epoch: fetch_epoch(&effects),
            result: Ok(Vec::new()),
        },
    );
    assert_eq!(state.view().list, TaskListView::Empty);

    let (state, effects) = update(state, Msg::RefreshRequested);
    let (state, _) = update(
        state,
        Msg::SnapshotLoaded {
            epoch: fetch_epoch(&effects),
            result: Err("timeout".to_string()),
        },
    );
    assert_eq!(state.view().list, TaskListView::Error("timeout".to_string()));
}

#[test]
fn server_order_is_kept_and_duplicate_ids_collapse() {
    let (state, effects) = update(AppState::new(), Msg::RefreshRequested);
    let (state, _) = update(
        state,
        Msg::SnapshotLoaded {
            epoch: fetch_epoch(&effects),
            result: Ok(vec![
                task("b", TaskStatus::Running),
                task("a", TaskStatus::Pending),
                task("b", TaskStatus::Failed),
            ]),
        },
    );

    let view = state.view();
    let rows = view.list.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].task_id, "b");
    assert_eq!(rows[0].status_style, StatusStyle::Running);
    assert_eq!(rows[1].task_id, "a");
}

#[test]
fn schedule_burst_collapses_into_one_refresh() {
    init_logging();
    let mut state = AppState::new();
    let mut timers = Vec::new();
    for _ in 0..5 {
        let (next, effects) = update(state, Msg::RefreshScheduled);
        state = next;
        timers.extend(effects);
    }
    assert_eq!(
        timers,
        vec![Effect::StartTimer {
            timer: TimerKind::Refresh,
            delay: Duration::from_millis(120),
        }]
    );
    assert!(state.view().refresh_pending);

    let (state, effects) = update(state, Msg::TimerFired(TimerKind::Refresh));
    assert!(!state.view().refresh_pending);
    assert_eq!(effects, vec![Effect::FetchSnapshot { epoch: 1 }]);

    // Once fired, the next signal arms a new timer.
    let (_state, effects) = update(state, Msg::RefreshScheduled);
    assert_eq!(effects.len(), 1);
}

#[test]
fn task_failed_event_refreshes_and_renders_failed_state() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::Started);
    let generation = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::OpenStream { generation } => Some(*generation),
            _ => None,
        })
        .expect("open stream");
    let (state, _) = update(state, Msg::StreamOpened { generation });

    let (state, effects) = update(
        state,
        Msg::StreamEventReceived {
            generation,
            name: "task.failed".to_string(),
            data: r#"{"task_id":"t1"}"#.to_string(),
        },
    );
    assert!(matches!(
        effects.as_slice(),
        [Effect::StartTimer {
            timer: TimerKind::Refresh,
            ..
        }]
    ));

    let (state, effects) = update(state, Msg::TimerFired(TimerKind::Refresh));
    let mut failed = task("t1", TaskStatus::Failed);
    failed.error = Some("HTTP 404".to_string());
    let (mut state, _) = update(
        state,
        Msg::SnapshotLoaded {
            epoch: fetch_epoch(&effects),
            result: Ok(vec![failed]),
        },
    );

    let view = state.view();
    let row = &view.list.rows()[0];
    assert_eq!(row.status_label, "Failed");
    assert_eq!(row.status_style, StatusStyle::Failed);
    assert_eq!(row.error.as_deref(), Some("HTTP 404"));
    assert!(state
        .take_view_changes()
        .iter()
        .any(|change| matches!(change, ViewChange::ReplaceList(_))));
}

#[test]
fn action_failure_reports_status_and_still_refreshes() {
    let (state, effects) = update(
        AppState::new(),
        Msg::TaskActionRequested {
            task_id: "t9".to_string(),
            action: TaskAction::Pause,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::RunTaskAction {
            task_id: "t9".to_string(),
            action: TaskAction::Pause,
        }]
    );

    let (state, effects) = update(
        state,
        Msg::TaskActionFinished {
            task_id: "t9".to_string(),
            action: TaskAction::Pause,
            result: Err("request failed: 404 not found".to_string()),
        },
    );
    assert_eq!(
        state.view().status_line,
        "Action failed: request failed: 404 not found"
    );
    assert_eq!(effects, vec![Effect::FetchSnapshot { epoch: 1 }]);

    let (_state, effects) = update(
        state,
        Msg::TaskActionFinished {
            task_id: "t9".to_string(),
            action: TaskAction::Start,
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::FetchSnapshot { epoch: 2 }]);
}

#[test]
fn create_requires_url_and_name() {
    let (state, effects) = update(
        AppState::new(),
        Msg::CreateSubmitted {
            url: "  ".to_string(),
            name: "file".to_string(),
        },
    );
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::CreateSubmitted {
            url: " https://example.com/a.iso ".to_string(),
            name: " a.iso".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::CreateTask {
            url: "https://example.com/a.iso".to_string(),
            name: "a.iso".to_string(),
        }]
    );

    let (state, effects) = update(
        state,
        Msg::CreateFinished {
            result: Err("request failed: 400 duplicate".to_string()),
        },
    );
    assert_eq!(state.view().status_line, "Create failed: request failed: 400 duplicate");
    assert_eq!(effects, vec![Effect::FetchSnapshot { epoch: 1 }]);
}
