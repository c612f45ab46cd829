use std::fmt::Display;

use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use sync_logging::{sync_info, sync_trace, sync_warn};

use crate::{StreamError, StreamSignal};

pub trait SignalSink: Send + Sync {
    fn emit(&self, signal: StreamSignal);
}

/// Runs one push connection to completion. Every exit path ends with exactly
/// one `StreamSignal::Failed`; the caller decides whether to reconnect.
pub async fn run_task_stream(client: &reqwest::Client, url: &str, sink: &dyn SignalSink) {
    let reason = match consume(client, url, sink).await {
        Ok(()) => StreamError::Closed,
        Err(err) => err,
    };
    sync_warn!("task stream {url} ended: {reason}");
    sink.emit(StreamSignal::Failed(reason.to_string()));
}

async fn consume(
    client: &reqwest::Client,
    url: &str,
    sink: &dyn SignalSink,
) -> Result<(), StreamError> {
    let response = client
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(|err| StreamError::Connect(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(StreamError::Status(status.as_u16()));
    }

    sync_info!("task stream connected: {url}");
    sink.emit(StreamSignal::Opened);
    pump_events(response.bytes_stream(), sink).await
}

/// Splits an SSE byte stream into named events and forwards them in order.
pub(crate) async fn pump_events<S, E>(stream: S, sink: &dyn SignalSink) -> Result<(), StreamError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    let mut events = stream.eventsource();
    while let Some(event) = events.next().await {
        let event = event.map_err(|err| StreamError::Read(err.to_string()))?;
        sync_trace!("SSE event {}: {}", event.event, event.data);
        sink.emit(StreamSignal::Event {
            name: event.event,
            data: event.data,
        });
    }
    Ok(())
}
