//! Taskdeck engine: HTTP transport, push stream and effect execution.
mod api;
mod engine;
mod stream;
mod transport;
mod types;

pub use api::{TaskApi, STREAM_PATH, TASKS_PATH};
pub use engine::EngineHandle;
pub use stream::{run_task_stream, SignalSink};
pub use transport::{ReqwestTransport, RequestOptions, Transport, TransportSettings};
pub use types::{
    ApiAction, EngineEvent, FailureKind, LogTailRecord, StreamError, StreamSignal, TaskRecord,
    TimerToken, TransportError,
};
