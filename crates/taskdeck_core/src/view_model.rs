use crate::{clamp_percent, display_or_missing, StatusStyle, Task, TaskId};

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRowView {
    pub task_id: TaskId,
    pub name: String,
    pub url: String,
    pub status_label: String,
    pub status_style: StatusStyle,
    pub percent: f64,
    pub speed: String,
    pub eta: String,
    pub error: Option<String>,
}

impl TaskRowView {
    pub fn from_task(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            name: task.name.clone(),
            url: task.url.clone(),
            status_label: task.status.label().to_string(),
            status_style: task.status.style(),
            percent: clamp_percent(task.progress),
            speed: display_or_missing(task.speed.as_deref()).to_string(),
            eta: display_or_missing(task.eta.as_deref()).to_string(),
            error: task.error.clone().filter(|message| !message.is_empty()),
        }
    }
}

/// Content of the task list pane. Exactly one of these is on screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TaskListView {
    /// Nothing loaded yet.
    #[default]
    Loading,
    /// Server returned an empty collection.
    Empty,
    /// Last snapshot failed.
    Error(String),
    Tasks(Vec<TaskRowView>),
}

impl TaskListView {
    pub fn rows(&self) -> &[TaskRowView] {
        match self {
            TaskListView::Tasks(rows) => rows,
            _ => &[],
        }
    }
}

/// The only fields the incremental patcher may change on a rendered row.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPatch {
    pub percent: f64,
    pub speed: String,
    pub eta: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionView {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaneView {
    pub task_id: TaskId,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub list: TaskListView,
    pub status_line: String,
    pub connection: ConnectionView,
    pub log: Option<LogPaneView>,
    pub refresh_pending: bool,
    pub reconnect_pending: bool,
    pub stale_snapshots_dropped: u64,
    pub malformed_events: u64,
    pub dirty: bool,
}

/// Incremental instruction for the rendering adapter, drained after each update.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange {
    ReplaceList(TaskListView),
    PatchTask { task_id: TaskId, patch: ProgressPatch },
    Status(String),
    LogTitle(String),
    ReplaceLog(String),
    AppendLog(String),
    ScrollLogToBottom,
    CloseLog,
}
