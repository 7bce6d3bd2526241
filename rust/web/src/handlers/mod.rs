pub mod health;
pub mod rooms;
pub mod sse;

pub use rooms::{
    ActionRequest, CreateRoomRequest, JoinRoomRequest, LeaveRoomRequest, ReadyRequest,
    ViewerQuery,
};
