use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::state::AppState;

/// GET /api/events - SSE stream that emits `update` with the container id
/// in `data` whenever that container's skills change, including promotions
/// made by the background pass.
pub async fn sse_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let rx = app.event_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| {
        msg.ok()
            .map(|id| Ok::<Event, Infallible>(Event::default().event("update").data(id.to_string())))
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}
