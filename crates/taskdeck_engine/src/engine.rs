use std::sync::Arc;
use std::time::Duration;

use sync_logging::{sync_debug, sync_info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{TaskApi, STREAM_PATH};
use crate::stream::{run_task_stream, SignalSink};
use crate::transport::{ReqwestTransport, Transport, TransportSettings};
use crate::{ApiAction, EngineEvent, FailureKind, StreamSignal, TimerToken, TransportError};

enum EngineCommand {
    FetchSnapshot { epoch: u64 },
    RunAction { task_id: String, action: ApiAction },
    CreateTask { url: String, name: String },
    FetchLogTail { task_id: String, tail: u32, request: u64 },
    OpenStream { generation: u64 },
    CloseStream,
    StartTimer { token: TimerToken, delay: Duration },
}

/// Front door to the IO side. Commands go in, `EngineEvent`s come back out in
/// completion order; nothing here touches application state.
pub struct EngineHandle {
    cmd_tx: mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::UnboundedReceiver<EngineEvent>,
    api: TaskApi,
}

impl EngineHandle {
    /// Spawns the engine onto the current tokio runtime.
    pub fn spawn(settings: TransportSettings) -> Result<Self, TransportError> {
        let stream_client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))?;
        let stream_url = format!("{}{}", settings.base_url, STREAM_PATH);
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(settings)?);
        Ok(Self::spawn_with(transport, stream_client, stream_url))
    }

    /// Spawns the engine over an arbitrary transport.
    pub fn spawn_with(
        transport: Arc<dyn Transport>,
        stream_client: reqwest::Client,
        stream_url: String,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let api = TaskApi::new(transport);

        let worker = Worker {
            api: api.clone(),
            stream_client,
            stream_url,
            event_tx,
            live_stream: None,
        };
        tokio::spawn(worker.run(cmd_rx));

        Self {
            cmd_tx,
            event_rx,
            api,
        }
    }

    pub fn fetch_snapshot(&self, epoch: u64) {
        self.send(EngineCommand::FetchSnapshot { epoch });
    }

    pub fn run_action(&self, task_id: impl Into<String>, action: ApiAction) {
        self.send(EngineCommand::RunAction {
            task_id: task_id.into(),
            action,
        });
    }

    pub fn create_task(&self, url: impl Into<String>, name: impl Into<String>) {
        self.send(EngineCommand::CreateTask {
            url: url.into(),
            name: name.into(),
        });
    }

    pub fn fetch_log_tail(&self, task_id: impl Into<String>, tail: u32, request: u64) {
        self.send(EngineCommand::FetchLogTail {
            task_id: task_id.into(),
            tail,
            request,
        });
    }

    /// Opens a push connection, tearing down any live one first.
    pub fn open_stream(&self, generation: u64) {
        self.send(EngineCommand::OpenStream { generation });
    }

    pub fn close_stream(&self) {
        self.send(EngineCommand::CloseStream);
    }

    pub fn start_timer(&self, token: TimerToken, delay: Duration) {
        self.send(EngineCommand::StartTimer { token, delay });
    }

    pub fn raw_log_url(&self, task_id: &str) -> String {
        self.api.raw_log_url(task_id)
    }

    pub async fn recv(&mut self) -> Option<EngineEvent> {
        self.event_rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

struct ChannelSignalSink {
    generation: u64,
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl SignalSink for ChannelSignalSink {
    fn emit(&self, signal: StreamSignal) {
        let _ = self.tx.send(EngineEvent::Stream {
            generation: self.generation,
            signal,
        });
    }
}

struct Worker {
    api: TaskApi,
    stream_client: reqwest::Client,
    stream_url: String,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
    live_stream: Option<(u64, JoinHandle<()>)>,
}

impl Worker {
    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<EngineCommand>) {
        while let Some(command) = cmd_rx.recv().await {
            self.handle_command(command);
        }
        self.close_stream();
    }

    fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::FetchSnapshot { epoch } => {
                let api = self.api.clone();
                self.spawn_reply(async move {
                    let result = api.list_tasks().await;
                    EngineEvent::SnapshotFetched { epoch, result }
                });
            }
            EngineCommand::RunAction { task_id, action } => {
                let api = self.api.clone();
                self.spawn_reply(async move {
                    let result = api.run_action(&task_id, action).await;
                    EngineEvent::ActionFinished {
                        task_id,
                        action,
                        result,
                    }
                });
            }
            EngineCommand::CreateTask { url, name } => {
                let api = self.api.clone();
                self.spawn_reply(async move {
                    let result = api.create_task(&url, &name).await;
                    EngineEvent::TaskCreated { result }
                });
            }
            EngineCommand::FetchLogTail {
                task_id,
                tail,
                request,
            } => {
                let api = self.api.clone();
                self.spawn_reply(async move {
                    let result = api.log_tail(&task_id, tail).await;
                    EngineEvent::LogTailFetched {
                        task_id,
                        request,
                        result,
                    }
                });
            }
            EngineCommand::OpenStream { generation } => {
                self.close_stream();
                sync_info!("opening task stream generation={generation}");
                let client = self.stream_client.clone();
                let url = self.stream_url.clone();
                let sink = ChannelSignalSink {
                    generation,
                    tx: self.event_tx.clone(),
                };
                let handle = tokio::spawn(async move {
                    run_task_stream(&client, &url, &sink).await;
                });
                self.live_stream = Some((generation, handle));
            }
            EngineCommand::CloseStream => self.close_stream(),
            EngineCommand::StartTimer { token, delay } => {
                self.spawn_reply(async move {
                    tokio::time::sleep(delay).await;
                    EngineEvent::TimerFired { token }
                });
            }
        }
    }

    fn spawn_reply<F>(&self, work: F)
    where
        F: std::future::Future<Output = EngineEvent> + Send + 'static,
    {
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(work.await);
        });
    }

    fn close_stream(&mut self) {
        if let Some((generation, handle)) = self.live_stream.take() {
            sync_debug!("closing task stream generation={generation}");
            handle.abort();
        }
    }
}
