use std::fmt;

pub type TaskId = String;

/// Client-side projection of a server task. Never mutated except by the
/// progress patcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub url: String,
    pub status: TaskStatus,
    pub progress: f64,
    pub speed: Option<String>,
    pub eta: Option<String>,
    pub error: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: String::new(),
            status: TaskStatus::Pending,
            progress: 0.0,
            speed: None,
            eta: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    /// Anything the server sends that this client does not know; shown verbatim.
    Other(String),
}

impl TaskStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => TaskStatus::Pending,
            "running" => TaskStatus::Running,
            "paused" => TaskStatus::Paused,
            "completed" => TaskStatus::Completed,
            "failed" => TaskStatus::Failed,
            other => TaskStatus::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Running => "Running",
            TaskStatus::Paused => "Paused",
            TaskStatus::Completed => "Completed",
            TaskStatus::Failed => "Failed",
            TaskStatus::Other(text) if text.is_empty() => "Unknown",
            TaskStatus::Other(text) => text,
        }
    }

    pub fn style(&self) -> StatusStyle {
        match self {
            TaskStatus::Running => StatusStyle::Running,
            TaskStatus::Paused => StatusStyle::Paused,
            TaskStatus::Completed => StatusStyle::Completed,
            TaskStatus::Failed => StatusStyle::Failed,
            TaskStatus::Pending | TaskStatus::Other(_) => StatusStyle::Plain,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Visual class of a status pill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusStyle {
    Plain,
    Running,
    Paused,
    Completed,
    Failed,
}

/// Display rule for progress: clamp to `[0, 100]`, non-finite values read as 0.
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Placeholder used for absent speed/eta values.
pub const MISSING_FIELD: &str = "—";

pub fn display_or_missing(value: Option<&str>) -> &str {
    match value {
        Some(text) if !text.is_empty() => text,
        _ => MISSING_FIELD,
    }
}
