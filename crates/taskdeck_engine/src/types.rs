use serde::Deserialize;
use thiserror::Error;

/// Wire shape of one task as served by `GET /api/tasks`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub eta: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Wire shape of `GET /api/tasks/{id}/logs?tail=N`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct LogTailRecord {
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiAction {
    Start,
    Pause,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidRequest,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

/// The single error kind of the transport layer; `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("stream connect failed: {0}")]
    Connect(String),
    #[error("stream rejected with status {0}")]
    Status(u16),
    #[error("stream read failed: {0}")]
    Read(String),
    #[error("stream closed by server")]
    Closed,
}

/// What a push connection reports back, tagged by the engine with its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSignal {
    Opened,
    Event { name: String, data: String },
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    SnapshotFetched {
        epoch: u64,
        result: Result<Vec<TaskRecord>, TransportError>,
    },
    ActionFinished {
        task_id: String,
        action: ApiAction,
        result: Result<(), TransportError>,
    },
    TaskCreated {
        result: Result<(), TransportError>,
    },
    LogTailFetched {
        task_id: String,
        request: u64,
        result: Result<LogTailRecord, TransportError>,
    },
    Stream {
        generation: u64,
        signal: StreamSignal,
    },
    TimerFired {
        token: TimerToken,
    },
}
