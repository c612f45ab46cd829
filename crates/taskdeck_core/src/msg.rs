use crate::{LogTail, LogViewport, Task, TaskAction, TaskId, TimerKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// App finished booting: load the list, then open the push stream.
    Started,
    /// User clicked Refresh, or an action wants a fresh snapshot.
    RefreshRequested,
    /// Coarse change signal; coalesced into one delayed refresh.
    RefreshScheduled,
    /// Result of the snapshot fetch started under `epoch`.
    SnapshotLoaded {
        epoch: u64,
        result: Result<Vec<Task>, String>,
    },
    /// A timer started through `Effect::StartTimer` elapsed.
    TimerFired(TimerKind),
    /// (Re)open the push stream now.
    ConnectRequested,
    /// The stream for `generation` answered and is delivering events.
    StreamOpened { generation: u64 },
    /// One named event from the stream for `generation`.
    StreamEventReceived {
        generation: u64,
        name: String,
        data: String,
    },
    /// The stream for `generation` failed or ended.
    StreamFailed { generation: u64, reason: String },
    /// User opened the log viewer for a task.
    LogOpened { task_id: TaskId },
    /// Result of a log tail fetch.
    LogTailLoaded {
        task_id: TaskId,
        request: u64,
        result: Result<LogTail, String>,
    },
    /// User asked to reload the tail of the open log.
    LogRefreshRequested,
    /// User closed the log viewer.
    LogClosed,
    /// Renderer reports where the log pane is scrolled.
    LogViewportChanged(LogViewport),
    /// User asked for the full raw log in an external viewer.
    RawLogRequested { task_id: TaskId },
    /// User clicked start/pause/delete on a task.
    TaskActionRequested { task_id: TaskId, action: TaskAction },
    TaskActionFinished {
        task_id: TaskId,
        action: TaskAction,
        result: Result<(), String>,
    },
    /// User submitted the create form.
    CreateSubmitted { url: String, name: String },
    CreateFinished { result: Result<(), String> },
    /// Fallback for placeholder wiring.
    NoOp,
}
