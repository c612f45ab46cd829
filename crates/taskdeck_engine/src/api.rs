use std::sync::Arc;

use serde_json::{json, Value};

use crate::transport::{RequestOptions, Transport};
use crate::{ApiAction, FailureKind, LogTailRecord, TaskRecord, TransportError};

pub const TASKS_PATH: &str = "/api/tasks";
pub const STREAM_PATH: &str = "/api/stream/tasks";

/// Typed view of the task REST surface.
#[derive(Clone)]
pub struct TaskApi {
    transport: Arc<dyn Transport>,
}

impl TaskApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Anything other than a JSON array reads as an empty collection.
    pub async fn list_tasks(&self) -> Result<Vec<TaskRecord>, TransportError> {
        match self.transport.request(TASKS_PATH, RequestOptions::get()).await? {
            Some(value @ Value::Array(_)) => decode(value),
            _ => Ok(Vec::new()),
        }
    }

    pub async fn create_task(&self, url: &str, name: &str) -> Result<(), TransportError> {
        let body = json!({ "url": url, "name": name }).to_string();
        self.transport
            .request(TASKS_PATH, RequestOptions::post_json(body))
            .await?;
        Ok(())
    }

    pub async fn run_action(&self, task_id: &str, action: ApiAction) -> Result<(), TransportError> {
        let (path, options) = match action {
            ApiAction::Start => (task_path(task_id, Some("start")), RequestOptions::post_json("{}")),
            ApiAction::Pause => (task_path(task_id, Some("pause")), RequestOptions::post_json("{}")),
            ApiAction::Delete => (task_path(task_id, None), RequestOptions::delete()),
        };
        self.transport.request(&path, options).await?;
        Ok(())
    }

    pub async fn log_tail(&self, task_id: &str, tail: u32) -> Result<LogTailRecord, TransportError> {
        let path = format!("{}?tail={tail}", task_path(task_id, Some("logs")));
        match self.transport.request(&path, RequestOptions::get()).await? {
            Some(value) => decode(value),
            None => Ok(LogTailRecord::default()),
        }
    }

    /// Address of the full log, meant for an external viewer rather than this client.
    pub fn raw_log_url(&self, task_id: &str) -> String {
        format!(
            "{}{}/raw",
            self.transport.base_url(),
            task_path(task_id, Some("logs"))
        )
    }
}

fn task_path(task_id: &str, suffix: Option<&str>) -> String {
    let id = urlencoding::encode(task_id);
    match suffix {
        Some(suffix) => format!("{TASKS_PATH}/{id}/{suffix}"),
        None => format!("{TASKS_PATH}/{id}"),
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, TransportError> {
    serde_json::from_value(value).map_err(|err| {
        TransportError::new(FailureKind::Decode, format!("unexpected response shape: {err}"))
    })
}
