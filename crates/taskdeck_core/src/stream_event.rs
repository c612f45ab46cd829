//! Decoding of named push-stream events into typed values.
//!
//! Payload-carrying events are best effort: a payload that does not decode
//! yields [`Decoded::Malformed`] and the caller drops it.

use serde::Deserialize;

use crate::TaskId;

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    TaskCreated,
    TaskCompleted,
    TaskFailed,
    Progress(ProgressUpdate),
    Log(LogLine),
    Ping,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgressUpdate {
    pub task_id: TaskId,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub eta: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogLine {
    pub task_id: TaskId,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Event(StreamEvent),
    /// Known event name, undecodable payload.
    Malformed,
    /// Event name this client does not handle.
    Ignored,
}

pub fn decode_stream_event(name: &str, data: &str) -> Decoded {
    match name {
        "task.created" => Decoded::Event(StreamEvent::TaskCreated),
        "task.completed" => Decoded::Event(StreamEvent::TaskCompleted),
        "task.failed" => Decoded::Event(StreamEvent::TaskFailed),
        "ping" => Decoded::Event(StreamEvent::Ping),
        "task.progress" => match serde_json::from_str::<ProgressUpdate>(data) {
            Ok(update) => Decoded::Event(StreamEvent::Progress(update)),
            Err(_) => Decoded::Malformed,
        },
        "task.log" => match serde_json::from_str::<LogLine>(data) {
            Ok(line) => Decoded::Event(StreamEvent::Log(line)),
            Err(_) => Decoded::Malformed,
        },
        _ => Decoded::Ignored,
    }
}
