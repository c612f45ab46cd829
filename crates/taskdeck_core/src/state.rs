use std::collections::HashSet;
use std::time::Duration;

use crate::log_buffer::{LogBuffer, LogTail, LogViewport};
use crate::view_model::{
    AppViewModel, ConnectionView, LogPaneView, ProgressPatch, TaskListView, TaskRowView,
    ViewChange,
};
use crate::{clamp_percent, display_or_missing, Task, TaskId};

/// Timing and sizing knobs of the sync protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub refresh_debounce: Duration,
    pub reconnect_interval: Duration,
    pub log_tail_lines: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            refresh_debounce: Duration::from_millis(120),
            reconnect_interval: Duration::from_millis(3000),
            log_tail_lines: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting { generation: u64 },
    Connected { generation: u64 },
}

impl ConnectionState {
    fn generation(self) -> Option<u64> {
        match self {
            ConnectionState::Disconnected => None,
            ConnectionState::Connecting { generation }
            | ConnectionState::Connected { generation } => Some(generation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogViewer {
    task_id: TaskId,
    label: String,
    truncated: bool,
    buffer: LogBuffer,
    viewport: Option<LogViewport>,
    request: u64,
}

impl LogViewer {
    fn title(&self) -> String {
        if self.truncated {
            format!("Logs: {} (truncated)", self.label)
        } else {
            format!("Logs: {}", self.label)
        }
    }

    fn is_pinned(&self) -> bool {
        self.viewport
            .map_or(true, |viewport| viewport.is_pinned(self.buffer.line_count()))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    settings: SyncSettings,
    epoch: u64,
    list: TaskListView,
    refresh_pending: bool,
    connection: ConnectionState,
    generation: u64,
    reconnect_pending: bool,
    /// Reconnect timers still running whose connect already happened by hand.
    reconnect_timers_cancelled: u32,
    log: Option<LogViewer>,
    log_requests: u64,
    status_line: String,
    stale_snapshots_dropped: u64,
    malformed_events: u64,
    changes: Vec<ViewChange>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: SyncSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            list: self.list.clone(),
            status_line: self.status_line.clone(),
            connection: match self.connection {
                ConnectionState::Disconnected => ConnectionView::Disconnected,
                ConnectionState::Connecting { .. } => ConnectionView::Connecting,
                ConnectionState::Connected { .. } => ConnectionView::Connected,
            },
            log: self.log.as_ref().map(|viewer| LogPaneView {
                task_id: viewer.task_id.clone(),
                title: viewer.title(),
                text: viewer.buffer.text().to_string(),
            }),
            refresh_pending: self.refresh_pending,
            reconnect_pending: self.reconnect_pending,
            stale_snapshots_dropped: self.stale_snapshots_dropped,
            malformed_events: self.malformed_events,
            dirty: self.dirty,
        }
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Stream payloads dropped because they could not be decoded.
    pub fn malformed_events(&self) -> u64 {
        self.malformed_events
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Drains the render instructions accumulated by `update`.
    pub fn take_view_changes(&mut self) -> Vec<ViewChange> {
        std::mem::take(&mut self.changes)
    }

    fn push_change(&mut self, change: ViewChange) {
        self.changes.push(change);
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.status_line == text {
            return;
        }
        self.status_line = text.clone();
        self.push_change(ViewChange::Status(text));
    }

    // --- snapshot synchronizer -------------------------------------------

    /// Starts a new snapshot epoch and returns it.
    pub(crate) fn begin_snapshot(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Applies a snapshot result if `epoch` is still current. Returns false when dropped.
    pub(crate) fn apply_snapshot(&mut self, epoch: u64, result: Result<Vec<Task>, String>) -> bool {
        if epoch != self.epoch {
            self.stale_snapshots_dropped += 1;
            return false;
        }
        self.list = match result {
            Ok(tasks) if tasks.is_empty() => TaskListView::Empty,
            Ok(tasks) => {
                let mut seen = HashSet::with_capacity(tasks.len());
                TaskListView::Tasks(
                    tasks
                        .iter()
                        .filter(|task| seen.insert(task.id.as_str()))
                        .map(TaskRowView::from_task)
                        .collect(),
                )
            }
            Err(message) => TaskListView::Error(message),
        };
        self.push_change(ViewChange::ReplaceList(self.list.clone()));
        true
    }

    // --- refresh scheduler -----------------------------------------------

    /// Marks a refresh pending. Returns false if one already was.
    pub(crate) fn arm_refresh(&mut self) -> bool {
        if self.refresh_pending {
            return false;
        }
        self.refresh_pending = true;
        true
    }

    pub(crate) fn disarm_refresh(&mut self) {
        self.refresh_pending = false;
    }

    // --- stream consumer -------------------------------------------------

    /// Moves to `Connecting` under a fresh generation and returns it.
    pub(crate) fn begin_connect(&mut self) -> u64 {
        self.generation += 1;
        self.connection = ConnectionState::Connecting {
            generation: self.generation,
        };
        self.generation
    }

    pub(crate) fn is_current_stream(&self, generation: u64) -> bool {
        self.connection.generation() == Some(generation)
    }

    pub(crate) fn mark_connected(&mut self, generation: u64) {
        self.connection = ConnectionState::Connected { generation };
    }

    pub(crate) fn mark_disconnected(&mut self) {
        self.connection = ConnectionState::Disconnected;
    }

    /// Marks a reconnect pending. Returns false if one already was.
    pub(crate) fn arm_reconnect(&mut self) -> bool {
        if self.reconnect_pending {
            return false;
        }
        self.reconnect_pending = true;
        true
    }

    /// Consumes a reconnect timer firing. Returns true if it should connect.
    /// Timers cancelled by a manual connect share the one delay, so their
    /// firings arrive first and are swallowed here.
    pub(crate) fn fire_reconnect(&mut self) -> bool {
        if self.reconnect_timers_cancelled > 0 {
            self.reconnect_timers_cancelled -= 1;
            return false;
        }
        std::mem::take(&mut self.reconnect_pending)
    }

    /// Forgets a pending reconnect because a connect is starting anyway.
    pub(crate) fn cancel_reconnect(&mut self) {
        if std::mem::take(&mut self.reconnect_pending) {
            self.reconnect_timers_cancelled += 1;
        }
    }

    pub(crate) fn note_malformed_event(&mut self) {
        self.malformed_events += 1;
    }

    // --- incremental patcher ---------------------------------------------

    /// Patches the progress fields of one rendered row. Unrendered ids are ignored.
    pub(crate) fn patch_progress(
        &mut self,
        task_id: &str,
        percent: f64,
        speed: Option<&str>,
        eta: Option<&str>,
    ) -> bool {
        let TaskListView::Tasks(rows) = &mut self.list else {
            return false;
        };
        let Some(row) = rows.iter_mut().find(|row| row.task_id == task_id) else {
            return false;
        };
        let patch = ProgressPatch {
            percent: clamp_percent(percent),
            speed: display_or_missing(speed).to_string(),
            eta: display_or_missing(eta).to_string(),
        };
        row.percent = patch.percent;
        row.speed = patch.speed.clone();
        row.eta = patch.eta.clone();
        self.push_change(ViewChange::PatchTask {
            task_id: task_id.to_string(),
            patch,
        });
        true
    }

    // --- log viewer ------------------------------------------------------

    pub fn log_target(&self) -> Option<&str> {
        self.log.as_ref().map(|viewer| viewer.task_id.as_str())
    }

    /// Opens (or re-targets) the viewer and returns the tail request token.
    pub(crate) fn open_log(&mut self, task_id: &str) -> u64 {
        let label = self
            .list
            .rows()
            .iter()
            .find(|row| row.task_id == task_id)
            .map_or_else(|| task_id.to_string(), |row| row.name.clone());
        self.log = Some(LogViewer {
            task_id: task_id.to_string(),
            label,
            truncated: false,
            buffer: LogBuffer::new(),
            viewport: None,
            request: 0,
        });
        self.begin_log_request().unwrap_or_default()
    }

    /// Shows the loading placeholder and issues a new request token for the open viewer.
    pub(crate) fn begin_log_request(&mut self) -> Option<u64> {
        self.log_requests += 1;
        let request = self.log_requests;
        let viewer = self.log.as_mut()?;
        viewer.request = request;
        viewer.truncated = false;
        viewer.buffer.replace_lines(["Loading…"]);
        let title = viewer.title();
        let text = viewer.buffer.text().to_string();
        self.push_change(ViewChange::LogTitle(title));
        self.push_change(ViewChange::ReplaceLog(text));
        Some(request)
    }

    /// Replaces the buffer with a tail result if it answers the latest request.
    pub(crate) fn apply_log_tail(
        &mut self,
        task_id: &str,
        request: u64,
        result: Result<LogTail, String>,
    ) -> bool {
        let Some(viewer) = self.log.as_mut() else {
            return false;
        };
        if viewer.task_id != task_id || viewer.request != request {
            return false;
        }
        match result {
            Ok(tail) => {
                viewer.truncated = tail.truncated;
                viewer.buffer.replace_lines(&tail.lines);
            }
            Err(message) => {
                viewer.truncated = false;
                viewer.buffer.replace_lines([format!("Failed to load logs: {message}")]);
            }
        }
        let title = viewer.title();
        let text = viewer.buffer.text().to_string();
        let total_lines = viewer.buffer.line_count();
        viewer.viewport = viewer
            .viewport
            .map(|viewport| viewport.scrolled_to_bottom(total_lines));
        self.push_change(ViewChange::LogTitle(title));
        self.push_change(ViewChange::ReplaceLog(text));
        self.push_change(ViewChange::ScrollLogToBottom);
        true
    }

    /// Appends a streamed line when `task_id` is the open viewer's target.
    pub(crate) fn append_log_line(&mut self, task_id: &str, line: &str) -> bool {
        let Some(viewer) = self.log.as_mut() else {
            return false;
        };
        if viewer.task_id != task_id {
            return false;
        }
        let pinned = viewer.is_pinned();
        let dropped = viewer.buffer.append_line(line);
        let change = if dropped {
            ViewChange::ReplaceLog(viewer.buffer.text().to_string())
        } else {
            ViewChange::AppendLog(format!("{line}\n"))
        };
        if pinned {
            let total_lines = viewer.buffer.line_count();
            viewer.viewport = viewer
                .viewport
                .map(|viewport| viewport.scrolled_to_bottom(total_lines));
        }
        self.push_change(change);
        if pinned {
            self.push_change(ViewChange::ScrollLogToBottom);
        }
        true
    }

    pub(crate) fn set_log_viewport(&mut self, viewport: LogViewport) {
        if let Some(viewer) = self.log.as_mut() {
            viewer.viewport = Some(viewport);
        }
    }

    pub(crate) fn close_log(&mut self) -> bool {
        if self.log.take().is_none() {
            return false;
        }
        self.push_change(ViewChange::CloseLog);
        true
    }
}
