use crate::errors::IntoErrorResponse;
use crate::events::{EventBus, EventSubscription, RoomEvent};
use crate::rooms::RoomManager;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use warp::http;
use warp::reply::{self, Response};
use warp::sse;
use warp::Reply;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// GET /api/rooms/{code}/events?username= — the per-viewer event stream.
/// Subscribing as a seated username routes that seat's masked views here.
pub async fn stream_room_events(
    code: String,
    username: String,
    rooms: Arc<RoomManager>,
    event_bus: EventBus,
) -> Response {
    if let Err(err) = rooms.is_member(&code, &username) {
        return err.into_http_response();
    }
    let subscription = event_bus.subscribe(code, Some(username));
    sse_response(subscription)
}

/// GET /api/rooms/events — the lobby stream carrying room-list updates.
pub async fn stream_lobby_events(event_bus: EventBus) -> Response {
    let subscription = event_bus.subscribe_lobby();
    sse_response(subscription)
}

fn sse_response(mut subscription: EventSubscription) -> Response {
    let receiver = subscription.take_receiver();
    // the subscription must outlive the stream to keep the registration
    let guard = Arc::new(subscription);
    let stream = ReceiverStream::new(receiver).map(move |event| {
        let _keep_alive = Arc::clone(&guard);
        Ok::<_, Infallible>(render_event(event))
    });

    let keep_alive = sse::keep_alive()
        .interval(KEEP_ALIVE_INTERVAL)
        .text(":keep-alive\n");

    let reply = sse::reply(keep_alive.stream(stream));
    reply::with_header(reply, http::header::CACHE_CONTROL, "no-cache").into_response()
}

fn render_event(event: RoomEvent) -> sse::Event {
    match serde_json::to_string(&event) {
        Ok(json) => sse::Event::default().event("room_event").data(json),
        Err(err) => {
            let fallback = serde_json::json!({
                "type": "error",
                "message": format!("failed to serialize room event: {err}")
            })
            .to_string();
            sse::Event::default().event("room_event").data(fallback)
        }
    }
}
