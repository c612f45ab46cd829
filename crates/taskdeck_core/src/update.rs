use crate::stream_event::{decode_stream_event, Decoded, StreamEvent};
use crate::{AppState, Effect, Msg, TimerKind};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => {
            let mut effects = refresh_now(&mut state);
            effects.extend(connect(&mut state));
            effects
        }
        Msg::RefreshRequested => refresh_now(&mut state),
        Msg::RefreshScheduled => schedule_refresh(&mut state),
        Msg::SnapshotLoaded { epoch, result } => {
            // Stale results (success or failure) are dropped without a trace on screen.
            state.apply_snapshot(epoch, result);
            Vec::new()
        }
        Msg::TimerFired(TimerKind::Refresh) => {
            state.disarm_refresh();
            refresh_now(&mut state)
        }
        Msg::TimerFired(TimerKind::Reconnect) => {
            if state.fire_reconnect() {
                connect(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::ConnectRequested => connect(&mut state),
        Msg::StreamOpened { generation } => {
            if state.is_current_stream(generation) {
                state.mark_connected(generation);
                state.set_status("Connected (SSE)");
            }
            Vec::new()
        }
        Msg::StreamEventReceived {
            generation,
            name,
            data,
        } => {
            if !state.is_current_stream(generation) {
                return (state, Vec::new());
            }
            dispatch_stream_event(&mut state, &name, &data)
        }
        Msg::StreamFailed { generation, .. } => {
            if !state.is_current_stream(generation) {
                return (state, Vec::new());
            }
            state.mark_disconnected();
            state.set_status("Disconnected, reconnecting…");
            if state.arm_reconnect() {
                vec![
                    Effect::CloseStream,
                    Effect::StartTimer {
                        timer: TimerKind::Reconnect,
                        delay: state.settings().reconnect_interval,
                    },
                ]
            } else {
                Vec::new()
            }
        }
        Msg::LogOpened { task_id } => {
            let request = state.open_log(&task_id);
            vec![Effect::FetchLogTail {
                task_id,
                tail: state.settings().log_tail_lines,
                request,
            }]
        }
        Msg::LogTailLoaded {
            task_id,
            request,
            result,
        } => {
            state.apply_log_tail(&task_id, request, result);
            Vec::new()
        }
        Msg::LogRefreshRequested => {
            let Some(task_id) = state.log_target().map(ToOwned::to_owned) else {
                return (state, Vec::new());
            };
            match state.begin_log_request() {
                Some(request) => vec![Effect::FetchLogTail {
                    task_id,
                    tail: state.settings().log_tail_lines,
                    request,
                }],
                None => Vec::new(),
            }
        }
        Msg::LogClosed => {
            state.close_log();
            Vec::new()
        }
        Msg::LogViewportChanged(viewport) => {
            state.set_log_viewport(viewport);
            Vec::new()
        }
        Msg::RawLogRequested { task_id } => vec![Effect::OpenRawLog { task_id }],
        Msg::TaskActionRequested { task_id, action } => {
            vec![Effect::RunTaskAction { task_id, action }]
        }
        Msg::TaskActionFinished { result, .. } => {
            if let Err(message) = result {
                state.set_status(format!("Action failed: {message}"));
            }
            refresh_now(&mut state)
        }
        Msg::CreateSubmitted { url, name } => {
            let url = url.trim();
            let name = name.trim();
            if url.is_empty() || name.is_empty() {
                return (state, Vec::new());
            }
            vec![Effect::CreateTask {
                url: url.to_string(),
                name: name.to_string(),
            }]
        }
        Msg::CreateFinished { result } => {
            if let Err(message) = result {
                state.set_status(format!("Create failed: {message}"));
            }
            refresh_now(&mut state)
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn refresh_now(state: &mut AppState) -> Vec<Effect> {
    let epoch = state.begin_snapshot();
    vec![Effect::FetchSnapshot { epoch }]
}

fn schedule_refresh(state: &mut AppState) -> Vec<Effect> {
    if !state.arm_refresh() {
        return Vec::new();
    }
    vec![Effect::StartTimer {
        timer: TimerKind::Refresh,
        delay: state.settings().refresh_debounce,
    }]
}

fn connect(state: &mut AppState) -> Vec<Effect> {
    state.cancel_reconnect();
    let generation = state.begin_connect();
    state.set_status("Connecting…");
    vec![Effect::CloseStream, Effect::OpenStream { generation }]
}

fn dispatch_stream_event(state: &mut AppState, name: &str, data: &str) -> Vec<Effect> {
    match decode_stream_event(name, data) {
        Decoded::Event(StreamEvent::TaskCreated)
        | Decoded::Event(StreamEvent::TaskCompleted)
        | Decoded::Event(StreamEvent::TaskFailed) => schedule_refresh(state),
        Decoded::Event(StreamEvent::Progress(progress)) => {
            state.patch_progress(
                &progress.task_id,
                progress.percent.unwrap_or(0.0),
                progress.speed.as_deref(),
                progress.eta.as_deref(),
            );
            Vec::new()
        }
        Decoded::Event(StreamEvent::Log(log)) => {
            state.append_log_line(&log.task_id, &log.line);
            Vec::new()
        }
        Decoded::Malformed => {
            state.note_malformed_event();
            Vec::new()
        }
        Decoded::Event(StreamEvent::Ping) | Decoded::Ignored => Vec::new(),
    }
}
