use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use dialectic_core::broadcast::{Broadcaster, ListenerId};
use futures::Stream;
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt as _;

use crate::state::{AppState, ChannelListener};

/// One SSE client's queue. Dropping it (when axum drops the response body on
/// disconnect) unregisters the listener.
struct Subscription {
    rx: UnboundedReceiverStream<String>,
    broadcaster: Arc<Broadcaster>,
    id: ListenerId,
}

impl Stream for Subscription {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.broadcaster.unregister(self.id);
    }
}

/// GET /api/events: SSE stream carrying every outbound message.
pub async fn sse_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let id = app.broadcaster.register(Arc::new(ChannelListener::new(tx)));
    let subscription = Subscription {
        rx: UnboundedReceiverStream::new(rx),
        broadcaster: Arc::clone(&app.broadcaster),
        id,
    };
    let stream = subscription
        .map(|payload| Ok::<Event, Infallible>(Event::default().event("message").data(payload)));
    Sse::new(stream).keep_alive(KeepAlive::default())
}
