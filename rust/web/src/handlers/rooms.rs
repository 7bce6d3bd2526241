use crate::errors::IntoErrorResponse;
use crate::rooms::{RoomManager, RoomMode};
use crate::view::GameView;
use jokerdraw_engine::player::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub username: String,
    #[serde(default)]
    pub mode: RoomMode,
}

#[derive(Debug, Serialize)]
pub struct RoomEntered {
    pub room_code: String,
    pub seat: usize,
    pub view: GameView,
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LeaveRoomRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadyRequest {
    pub username: String,
    pub ready: bool,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub username: String,
    pub action: Action,
}

#[derive(Debug, Deserialize)]
pub struct ViewerQuery {
    pub username: String,
}

#[derive(Debug, Serialize)]
struct Acknowledged {
    ok: bool,
}

/// POST /api/rooms — allocates a room and auto-joins the creator as seat 0.
pub async fn create_room(rooms: Arc<RoomManager>, request: CreateRoomRequest) -> Response {
    match rooms.create_room(&request.username, request.mode) {
        Ok((room_code, view)) => success(
            StatusCode::CREATED,
            &RoomEntered {
                room_code,
                seat: 0,
                view,
            },
        ),
        Err(err) => err.into_http_response(),
    }
}

/// POST /api/rooms/{code}/join — assigns the next free seat.
pub async fn join_room(
    code: String,
    rooms: Arc<RoomManager>,
    request: JoinRoomRequest,
) -> Response {
    match rooms.join_room(&code, &request.username) {
        Ok((seat, view)) => success(
            StatusCode::OK,
            &RoomEntered {
                room_code: code,
                seat,
                view,
            },
        ),
        Err(err) => err.into_http_response(),
    }
}

/// POST /api/rooms/{code}/leave — frees the seat; an empty room is deleted.
pub async fn leave_room(
    code: String,
    rooms: Arc<RoomManager>,
    request: LeaveRoomRequest,
) -> Response {
    match rooms.leave_room(&code, &request.username) {
        Ok(()) => success(StatusCode::OK, &Acknowledged { ok: true }),
        Err(err) => err.into_http_response(),
    }
}

/// POST /api/rooms/{code}/ready — flips readiness; both ready starts play.
pub async fn set_ready(code: String, rooms: Arc<RoomManager>, request: ReadyRequest) -> Response {
    match rooms.set_ready(&code, &request.username, request.ready) {
        Ok(()) => success(StatusCode::OK, &Acknowledged { ok: true }),
        Err(err) => err.into_http_response(),
    }
}

/// POST /api/rooms/{code}/actions — forwards a game action for the
/// caller's seat and returns the caller's refreshed view.
pub async fn submit_action(
    code: String,
    rooms: Arc<RoomManager>,
    request: ActionRequest,
) -> Response {
    match rooms.player_action(&code, &request.username, &request.action) {
        Ok(view) => success(StatusCode::OK, &view),
        Err(err) => err.into_http_response(),
    }
}

/// POST /api/rooms/{code}/advance/cancel — cancels the deferred next-hand.
pub async fn cancel_auto_advance(
    code: String,
    rooms: Arc<RoomManager>,
    request: LeaveRoomRequest,
) -> Response {
    match rooms.cancel_auto_advance(&code, &request.username) {
        Ok(()) => success(StatusCode::OK, &Acknowledged { ok: true }),
        Err(err) => err.into_http_response(),
    }
}

/// GET /api/rooms — snapshot of joinable/observable rooms.
pub async fn list_rooms(rooms: Arc<RoomManager>) -> Response {
    success(StatusCode::OK, &rooms.active_rooms())
}

/// GET /api/rooms/{code}/state?username= — the caller's masked view.
pub async fn get_state(code: String, rooms: Arc<RoomManager>, query: ViewerQuery) -> Response {
    match rooms.view_for(&code, &query.username) {
        Ok(view) => success(StatusCode::OK, &view),
        Err(err) => err.into_http_response(),
    }
}

fn success<T: Serialize>(status: StatusCode, body: &T) -> Response {
    reply::with_status(reply::json(body), status).into_response()
}
