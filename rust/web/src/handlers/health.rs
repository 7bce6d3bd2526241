use crate::rooms::RoomManager;
use serde::Serialize;
use std::sync::Arc;
use warp::reply::Json;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    rooms: usize,
    rooms_in_progress: usize,
}

pub fn health() -> Json {
    warp::reply::json(&HealthBody { status: "ok" })
}

/// Readiness reads only aggregate room counts; it never mutates.
pub fn ready(rooms: Arc<RoomManager>) -> Json {
    warp::reply::json(&ReadyBody {
        status: "ready",
        rooms: rooms.room_count(),
        rooms_in_progress: rooms.rooms_in_progress(),
    })
}
