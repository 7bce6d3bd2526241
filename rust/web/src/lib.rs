//! # jokerdraw_web: live room orchestration over the draw-poker engine
//!
//! Exposes the [`jokerdraw_engine`] rule engine to concurrently connected
//! clients: room lifecycle and seating, per-viewer masked projections,
//! timer-driven auto-advance, inactivity cleanup, and an HTTP + SSE
//! surface.
//!
//! - [`rooms`] - Room manager: codes, seats, readiness, action dispatch,
//!   auto-advance, inactivity sweep
//! - [`events`] - Event bus with per-room broadcast and per-seat delivery
//! - [`view`] - Stateless per-viewer projection with masking and
//!   capability flags
//! - [`handlers`] - Command endpoints, SSE streams, health/readiness
//! - [`server`] - Server assembly, routing, graceful shutdown
//! - [`errors`] - HTTP error envelope
//! - [`logging`] - tracing initialization

pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod rooms;
pub mod server;
pub mod view;

pub use errors::{ErrorResponse, IntoErrorResponse};
pub use events::{EventBus, MatchSummary, RoomEvent, RoomSummary};
pub use logging::init_logging;
pub use rooms::{PlayerConnection, Room, RoomError, RoomManager, RoomMode, RoomStatus};
pub use server::{AppContext, ServerConfig, ServerError, ServerHandle, WebServer};
pub use view::{CardView, Capabilities, GameView, SeatView};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_provides_shared_components() {
        let ctx = AppContext::new_for_tests();

        let event_bus = ctx.event_bus();
        let rooms = ctx.rooms();

        assert_eq!(event_bus.subscriber_count(), 0);
        assert_eq!(rooms.room_count(), 0);
    }
}
