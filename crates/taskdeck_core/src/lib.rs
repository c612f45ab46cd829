//! Taskdeck core: pure sync state machine, view model and rendering seam.
mod effect;
mod log_buffer;
mod msg;
mod render;
mod state;
mod stream_event;
mod task;
mod update;
mod view_model;

pub use effect::{Effect, TaskAction, TimerKind};
pub use log_buffer::{
    LogBuffer, LogTail, LogViewport, LOG_BUFFER_CAP, LOG_BUFFER_KEEP, PIN_THRESHOLD_LINES,
};
pub use msg::Msg;
pub use render::{apply_view_changes, Renderer};
pub use state::{AppState, ConnectionState, SyncSettings};
pub use stream_event::{decode_stream_event, Decoded, LogLine, ProgressUpdate, StreamEvent};
pub use task::{
    clamp_percent, display_or_missing, StatusStyle, Task, TaskId, TaskStatus, MISSING_FIELD,
};
pub use update::update;
pub use view_model::{
    AppViewModel, ConnectionView, LogPaneView, ProgressPatch, TaskListView, TaskRowView,
    ViewChange,
};
