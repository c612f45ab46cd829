use std::time::Duration;

use crate::TaskId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchSnapshot { epoch: u64 },
    StartTimer { timer: TimerKind, delay: Duration },
    /// Tear down the live push connection, if any. Safe to repeat.
    CloseStream,
    OpenStream { generation: u64 },
    FetchLogTail { task_id: TaskId, tail: u32, request: u64 },
    OpenRawLog { task_id: TaskId },
    RunTaskAction { task_id: TaskId, action: TaskAction },
    CreateTask { url: String, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Refresh,
    Reconnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Start,
    Pause,
    Delete,
}

impl TaskAction {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskAction::Start => "start",
            TaskAction::Pause => "pause",
            TaskAction::Delete => "delete",
        }
    }
}
