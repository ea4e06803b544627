//! Server-Sent Events support

use crate::chat::Message;
use crate::store::StoreEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert the store broadcast into an SSE stream, preceded by a full
/// snapshot so late subscribers can render immediately
pub fn sse_stream(
    snapshot: Vec<Message>,
    broadcast_rx: tokio::sync::broadcast::Receiver<StoreEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move {
        Ok(Event::default()
            .event("init")
            .data(json!({ "type": "init", "messages": snapshot }).to_string()))
    });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(store_event_to_axum(&event))),
        Err(_) => None, // Skip lagged messages
    });

    let combined = init.chain(broadcasts);

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn store_event_to_axum(event: &StoreEvent) -> Event {
    let (event_type, data) = match event {
        StoreEvent::Appended(message) => (
            "message",
            json!({ "type": "message", "message": message }),
        ),
        StoreEvent::Reset(welcome) => (
            "reset",
            json!({ "type": "reset", "message": welcome }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}
