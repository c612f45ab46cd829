use sync_logging::{sync_debug, sync_info, sync_warn};
use taskdeck_core::{Effect, LogTail, Msg, Task, TaskAction, TaskStatus, TimerKind};
use taskdeck_engine::{ApiAction, EngineEvent, EngineHandle, StreamSignal, TaskRecord, TimerToken};

const REFRESH_TIMER: TimerToken = TimerToken(1);
const RECONNECT_TIMER: TimerToken = TimerToken(2);

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Runs one effect. Returns the URL to hand to an external viewer, if any.
    pub fn run(&self, effect: Effect) -> Option<String> {
        match effect {
            Effect::FetchSnapshot { epoch } => {
                sync_debug!("FetchSnapshot epoch={epoch}");
                self.engine.fetch_snapshot(epoch);
            }
            Effect::StartTimer { timer, delay } => {
                self.engine.start_timer(timer_token(timer), delay);
            }
            Effect::CloseStream => self.engine.close_stream(),
            Effect::OpenStream { generation } => self.engine.open_stream(generation),
            Effect::FetchLogTail {
                task_id,
                tail,
                request,
            } => {
                sync_debug!("FetchLogTail task_id={task_id} tail={tail} request={request}");
                self.engine.fetch_log_tail(task_id, tail, request);
            }
            Effect::OpenRawLog { task_id } => {
                return Some(self.engine.raw_log_url(&task_id));
            }
            Effect::RunTaskAction { task_id, action } => {
                sync_info!("RunTaskAction task_id={task_id} action={}", action.as_str());
                self.engine.run_action(task_id, map_action(action));
            }
            Effect::CreateTask { url, name } => {
                sync_info!("CreateTask name={name} url_len={}", url.len());
                self.engine.create_task(url, name);
            }
        }
        None
    }

    /// Next message from the engine; `None` once the engine is gone.
    pub async fn next_msg(&mut self) -> Option<Msg> {
        self.engine.recv().await.map(map_event)
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SnapshotFetched { epoch, result } => Msg::SnapshotLoaded {
            epoch,
            result: result
                .map(|records| records.into_iter().map(map_task).collect())
                .map_err(|err| err.to_string()),
        },
        EngineEvent::ActionFinished {
            task_id,
            action,
            result,
        } => {
            if let Err(err) = &result {
                sync_warn!("Task {task_id} {action:?} failed: {err}");
            }
            Msg::TaskActionFinished {
                task_id,
                action: map_api_action(action),
                result: result.map_err(|err| err.to_string()),
            }
        }
        EngineEvent::TaskCreated { result } => {
            if let Err(err) = &result {
                sync_warn!("Create failed: {err}");
            }
            Msg::CreateFinished {
                result: result.map_err(|err| err.to_string()),
            }
        }
        EngineEvent::LogTailFetched {
            task_id,
            request,
            result,
        } => Msg::LogTailLoaded {
            task_id,
            request,
            result: result
                .map(|record| LogTail {
                    lines: record.lines,
                    truncated: record.truncated,
                })
                .map_err(|err| err.to_string()),
        },
        EngineEvent::Stream { generation, signal } => match signal {
            StreamSignal::Opened => Msg::StreamOpened { generation },
            StreamSignal::Event { name, data } => Msg::StreamEventReceived {
                generation,
                name,
                data,
            },
            StreamSignal::Failed(reason) => Msg::StreamFailed { generation, reason },
        },
        EngineEvent::TimerFired { token } => match timer_kind(token) {
            Some(kind) => Msg::TimerFired(kind),
            None => Msg::NoOp,
        },
    }
}

fn map_task(record: TaskRecord) -> Task {
    Task {
        id: record.id,
        name: record.name,
        url: record.url,
        status: TaskStatus::parse(&record.status),
        progress: record.progress.unwrap_or(0.0),
        speed: record.speed,
        eta: record.eta,
        error: record.error,
    }
}

fn map_action(action: TaskAction) -> ApiAction {
    match action {
        TaskAction::Start => ApiAction::Start,
        TaskAction::Pause => ApiAction::Pause,
        TaskAction::Delete => ApiAction::Delete,
    }
}

fn map_api_action(action: ApiAction) -> TaskAction {
    match action {
        ApiAction::Start => TaskAction::Start,
        ApiAction::Pause => TaskAction::Pause,
        ApiAction::Delete => TaskAction::Delete,
    }
}

fn timer_token(kind: TimerKind) -> TimerToken {
    match kind {
        TimerKind::Refresh => REFRESH_TIMER,
        TimerKind::Reconnect => RECONNECT_TIMER,
    }
}

fn timer_kind(token: TimerToken) -> Option<TimerKind> {
    match token {
        REFRESH_TIMER => Some(TimerKind::Refresh),
        RECONNECT_TIMER => Some(TimerKind::Reconnect),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use taskdeck_engine::{FailureKind, TransportError};

    use super::*;

    #[test]
    fn timer_tokens_round_trip_and_unknown_tokens_are_ignored() {
        assert_eq!(timer_kind(timer_token(TimerKind::Refresh)), Some(TimerKind::Refresh));
        assert_eq!(
            timer_kind(timer_token(TimerKind::Reconnect)),
            Some(TimerKind::Reconnect)
        );
        assert_eq!(
            map_event(EngineEvent::TimerFired {
                token: TimerToken(99)
            }),
            Msg::NoOp
        );
    }

    #[test]
    fn snapshot_failure_becomes_message_text() {
        let msg = map_event(EngineEvent::SnapshotFetched {
            epoch: 4,
            result: Err(TransportError {
                kind: FailureKind::HttpStatus(500),
                message: "request failed: 500 boom".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Msg::SnapshotLoaded {
                epoch: 4,
                result: Err("request failed: 500 boom".to_string()),
            }
        );
    }

    #[test]
    fn records_map_onto_tasks() {
        let record = TaskRecord {
            id: "t1".to_string(),
            url: "https://example.com/a.iso".to_string(),
            name: "a.iso".to_string(),
            status: "archived".to_string(),
            progress: None,
            speed: None,
            eta: Some("00:10".to_string()),
            error: None,
        };
        let task = map_task(record);
        assert_eq!(task.status, TaskStatus::Other("archived".to_string()));
        assert_eq!(task.progress, 0.0);
        assert_eq!(task.eta.as_deref(), Some("00:10"));
    }
}
