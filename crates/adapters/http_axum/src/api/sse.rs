//! Server-Sent Events (SSE) stream of published snapshots.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use clothesline_app::ports::{SensorSource, SharedStore};

use crate::state::AppState;

/// `GET /status/stream` — one `status` event per published snapshot.
///
/// The stream continues until the client disconnects or the publisher is
/// dropped. A client that falls behind skips the snapshots it missed.
pub async fn stream<Src, S>(
    State(state): State<AppState<Src, S>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    Src: SensorSource + 'static,
    S: SharedStore + 'static,
{
    let snapshots = BroadcastStream::new(state.publisher.subscribe()).filter_map(|result| {
        match result {
            Ok(snapshot) => match Event::default().event("status").json_data(&snapshot) {
                Ok(event) => Some(Ok(event)),
                Err(err) => {
                    tracing::warn!(%err, "failed to encode status for SSE stream");
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "SSE subscriber lagged, some snapshots were dropped");
                None
            }
        }
    });

    Sse::new(snapshots).keep_alive(KeepAlive::default())
}
