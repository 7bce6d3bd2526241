use crate::events::{EventBus, MatchSummary, RoomEvent, RoomSummary};
use crate::view::{project, GameView};
use jokerdraw_engine::errors::GameError;
use jokerdraw_engine::game::{GameState, MatchOutcome, Phase};
use jokerdraw_engine::player::Action;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Room-code alphabet: 32 symbols, visually ambiguous characters (0, O,
/// I, 1) excluded.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const ROOM_CODE_LEN: usize = 6;
// Sanity bound on the collision-retry loop; 32^6 codes make hitting this a
// sign of something badly wrong, not of a crowded server.
const CODE_GENERATION_ATTEMPTS: usize = 10_000;

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(3 * 60);
const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_secs(5);
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

const MAX_USERNAME_LEN: usize = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomMode {
    /// Two players over the network; the match starts when both are ready.
    #[default]
    Online,
    /// Pass-and-play on one device; both seats are taken at creation and
    /// the match starts immediately.
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    InProgress,
    Complete,
}

impl RoomStatus {
    fn label(self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::InProgress => "in_progress",
            RoomStatus::Complete => "complete",
        }
    }
}

/// Binds a participant to a transport connection and a seat.
#[derive(Debug, Clone)]
pub struct PlayerConnection {
    pub username: String,
    pub connection_id: Uuid,
    pub seat: usize,
    pub ready: bool,
    pub joined_at: Instant,
    pub last_seen: Instant,
}

/// One live room: a match plus its connected-player bookkeeping. All of a
/// room's mutable state sits behind a single mutex, so commands, the
/// auto-advance timer, and the sweeper serialize per room while distinct
/// rooms proceed in parallel.
pub struct Room {
    code: String,
    mode: RoomMode,
    created_at: chrono::DateTime<chrono::Utc>,
    inner: Mutex<RoomInner>,
    advance_task: Mutex<Option<JoinHandle<()>>>,
}

struct RoomInner {
    game: GameState,
    connections: HashMap<String, PlayerConnection>,
    status: RoomStatus,
    last_activity: Instant,
}

impl Room {
    fn new(code: String, mode: RoomMode) -> Self {
        let game = GameState::new(Uuid::new_v4().to_string(), None);
        Self {
            code,
            mode,
            created_at: chrono::Utc::now(),
            inner: Mutex::new(RoomInner {
                game,
                connections: HashMap::new(),
                status: RoomStatus::Waiting,
                last_activity: Instant::now(),
            }),
            advance_task: Mutex::new(None),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
    pub fn mode(&self) -> RoomMode {
        self.mode
    }
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }

    fn lock(&self) -> MutexGuard<'_, RoomInner> {
        self.inner.lock().expect("room lock poisoned")
    }
}

impl RoomInner {
    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn seat_names(&self) -> [Option<String>; 2] {
        let mut names = [None, None];
        for conn in self.connections.values() {
            names[conn.seat] = Some(conn.username.clone());
        }
        names
    }

    fn seat_of(&self, username: &str) -> Result<usize, RoomError> {
        self.connections
            .get(username)
            .map(|c| c.seat)
            .ok_or_else(|| RoomError::NotInRoom(username.to_string()))
    }

    fn summary(&self, room: &Room) -> RoomSummary {
        let names = self.seat_names();
        RoomSummary {
            room_code: room.code.clone(),
            status: self.status.label().to_string(),
            players: names.into_iter().flatten().collect(),
            joinable: self.status == RoomStatus::Waiting && self.connections.len() < 2,
            created_at: room.created_at,
        }
    }

    /// One masked projection per connected seat, computed under the room
    /// lock so every viewer sees the same state version.
    fn projections(&self) -> Vec<(String, GameView)> {
        let names = self.seat_names();
        self.connections
            .values()
            .map(|c| (c.username.clone(), project(&self.game, c.seat, &names)))
            .collect()
    }

    fn match_summary(&self) -> Result<MatchSummary, RoomError> {
        let result = self.game.result().ok_or_else(|| {
            RoomError::Internal("match completed without a determinable result".into())
        })?;
        let names = self.seat_names();
        let winner_username = match result.outcome {
            MatchOutcome::Winner { seat } => names[seat].clone(),
            MatchOutcome::Draw => None,
        };
        Ok(MatchSummary {
            outcome: result.outcome,
            winner_username,
            chips: result.chips,
            hands_played: result.hands_played,
        })
    }
}

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("room `{0}` was not found")]
    RoomNotFound(String),
    #[error("room already has two players")]
    RoomFull,
    #[error("username `{0}` is already taken in this room")]
    DuplicateUsername(String),
    #[error("username `{0}` is not in this room")]
    NotInRoom(String),
    #[error("username must be 1-{MAX_USERNAME_LEN} characters")]
    InvalidUsername,
    #[error("room is not accepting players")]
    NotJoinable,
    #[error("the match has not started")]
    MatchNotStarted,
    #[error("could not allocate a unique room code")]
    CodeSpaceExhausted,
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Owns the concurrent room collection; every external command, the
/// auto-advance timer, and the inactivity sweep all go through here.
pub struct RoomManager {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
    event_bus: EventBus,
    idle_timeout: Duration,
    advance_delay: Duration,
}

impl RoomManager {
    pub fn new(event_bus: EventBus) -> Self {
        Self::with_timings(event_bus, DEFAULT_IDLE_TIMEOUT, DEFAULT_ADVANCE_DELAY)
    }

    pub fn with_timings(
        event_bus: EventBus,
        idle_timeout: Duration,
        advance_delay: Duration,
    ) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            event_bus,
            idle_timeout,
            advance_delay,
        }
    }

    pub fn event_bus(&self) -> EventBus {
        self.event_bus.clone()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.read().expect("room map poisoned").len()
    }

    pub fn rooms_in_progress(&self) -> usize {
        let rooms: Vec<Arc<Room>> = {
            let guard = self.rooms.read().expect("room map poisoned");
            guard.values().cloned().collect()
        };
        rooms
            .iter()
            .filter(|r| r.lock().status == RoomStatus::InProgress)
            .count()
    }

    /// Allocates a room and seats the creator at seat 0. A local-mode room
    /// seats both players from the same device and starts at once.
    pub fn create_room(
        &self,
        username: &str,
        mode: RoomMode,
    ) -> Result<(String, GameView), RoomError> {
        validate_username(username)?;

        let room = {
            let mut rooms = self.rooms.write().expect("room map poisoned");
            let code = generate_code(&rooms)?;
            let room = Arc::new(Room::new(code.clone(), mode));
            rooms.insert(code, Arc::clone(&room));
            room
        };

        let (view, summary) = {
            let mut inner = room.lock();
            seat_connection(&mut inner, username, 0);
            if mode == RoomMode::Local {
                let guest = format!("{username} #2");
                seat_connection(&mut inner, &guest, 1);
                for conn in inner.connections.values_mut() {
                    conn.ready = true;
                }
                inner.status = RoomStatus::InProgress;
                inner.game.start_hand()?;
            }
            inner.touch();
            let names = inner.seat_names();
            let view = project(&inner.game, 0, &names);
            (view, inner.summary(&room))
        };

        tracing::info!(
            room_code = %room.code,
            username = %username,
            mode = ?mode,
            "room created"
        );

        self.event_bus.broadcast(
            &room.code,
            RoomEvent::RoomCreated {
                room_code: room.code.clone(),
                username: username.to_string(),
                seat: 0,
            },
        );
        if mode == RoomMode::Local {
            self.event_bus.broadcast(
                &room.code,
                RoomEvent::GameStarted {
                    room_code: room.code.clone(),
                },
            );
        }
        self.publish_rooms_updated();

        Ok((summary.room_code, view))
    }

    /// Seats a player in the next free seat of a waiting room.
    pub fn join_room(&self, code: &str, username: &str) -> Result<(usize, GameView), RoomError> {
        validate_username(username)?;
        let room = self.get_room(code)?;

        let (seat, view) = {
            let mut inner = room.lock();
            if inner.connections.contains_key(username) {
                return Err(RoomError::DuplicateUsername(username.to_string()));
            }
            if inner.status != RoomStatus::Waiting {
                return Err(RoomError::NotJoinable);
            }
            if inner.connections.len() >= 2 {
                return Err(RoomError::RoomFull);
            }
            let taken: Vec<usize> = inner.connections.values().map(|c| c.seat).collect();
            let seat = if taken.contains(&0) { 1 } else { 0 };
            seat_connection(&mut inner, username, seat);
            inner.touch();
            // membership is applied before any notification is computed
            let names = inner.seat_names();
            (seat, project(&inner.game, seat, &names))
        };

        self.event_bus.send_to(
            code,
            username,
            RoomEvent::RoomJoined {
                room_code: code.to_string(),
                username: username.to_string(),
                seat,
            },
        );
        self.event_bus.broadcast(
            code,
            RoomEvent::PlayerJoined {
                room_code: code.to_string(),
                username: username.to_string(),
                seat,
            },
        );
        self.publish_rooms_updated();

        Ok((seat, view))
    }

    /// Frees the caller's seat. An emptied room is deleted; leaving a match
    /// in progress terminates the room for the remaining player.
    pub fn leave_room(&self, code: &str, username: &str) -> Result<(), RoomError> {
        let room = self.get_room(code)?;

        enum Aftermath {
            Empty,
            Abandoned { seat: usize },
            Waiting { seat: usize },
        }

        let aftermath = {
            let mut inner = room.lock();
            let conn = inner
                .connections
                .remove(username)
                .ok_or_else(|| RoomError::NotInRoom(username.to_string()))?;
            inner.touch();
            if inner.connections.is_empty() {
                Aftermath::Empty
            } else if inner.status == RoomStatus::InProgress {
                inner.status = RoomStatus::Complete;
                Aftermath::Abandoned { seat: conn.seat }
            } else {
                Aftermath::Waiting { seat: conn.seat }
            }
        };

        self.event_bus.send_to(
            code,
            username,
            RoomEvent::RoomLeft {
                room_code: code.to_string(),
                username: username.to_string(),
            },
        );

        match aftermath {
            Aftermath::Empty => {
                self.remove_room(code, &room);
            }
            Aftermath::Abandoned { seat } => {
                self.clear_advance(&room);
                self.event_bus.broadcast(
                    code,
                    RoomEvent::PlayerLeft {
                        room_code: code.to_string(),
                        username: username.to_string(),
                        seat,
                    },
                );
                self.event_bus.broadcast(
                    code,
                    RoomEvent::RoomTerminated {
                        room_code: code.to_string(),
                        reason: format!("{username} left the match"),
                    },
                );
            }
            Aftermath::Waiting { seat } => {
                self.event_bus.broadcast(
                    code,
                    RoomEvent::PlayerLeft {
                        room_code: code.to_string(),
                        username: username.to_string(),
                        seat,
                    },
                );
            }
        }
        self.publish_rooms_updated();
        Ok(())
    }

    /// Flips a ready flag; when both seats are filled and ready the match
    /// starts and the first masked views go out.
    pub fn set_ready(
        self: &Arc<Self>,
        code: &str,
        username: &str,
        ready: bool,
    ) -> Result<(), RoomError> {
        let room = self.get_room(code)?;

        let (started, updates) = {
            let mut inner = room.lock();
            if inner.status != RoomStatus::Waiting {
                return Err(RoomError::NotJoinable);
            }
            let conn = inner
                .connections
                .get_mut(username)
                .ok_or_else(|| RoomError::NotInRoom(username.to_string()))?;
            conn.ready = ready;
            conn.last_seen = Instant::now();
            inner.touch();

            let all_ready =
                inner.connections.len() == 2 && inner.connections.values().all(|c| c.ready);
            if all_ready {
                inner.status = RoomStatus::InProgress;
                inner.game.start_hand()?;
                (true, inner.projections())
            } else {
                (false, Vec::new())
            }
        };

        self.event_bus.broadcast(
            code,
            RoomEvent::PlayerReadyChanged {
                room_code: code.to_string(),
                username: username.to_string(),
                ready,
            },
        );
        if started {
            tracing::info!(room_code = %code, "both players ready; match started");
            self.event_bus.broadcast(
                code,
                RoomEvent::GameStarted {
                    room_code: code.to_string(),
                },
            );
            self.dispatch_views(code, updates);
            self.publish_rooms_updated();
        }
        Ok(())
    }

    /// Forwards a validated action to the caller's seat. On success every
    /// connected viewer receives a fresh masked view, and hand completion
    /// arms the deferred auto-advance.
    pub fn player_action(
        self: &Arc<Self>,
        code: &str,
        username: &str,
        action: &Action,
    ) -> Result<GameView, RoomError> {
        let room = self.get_room(code)?;

        let (phase, view, updates, match_event) = {
            let mut inner = room.lock();
            if inner.status != RoomStatus::InProgress {
                return Err(RoomError::MatchNotStarted);
            }
            let seat = inner.seat_of(username)?;
            inner.game.apply(seat, action)?;
            if let Some(conn) = inner.connections.get_mut(username) {
                conn.last_seen = Instant::now();
            }
            inner.touch();

            let phase = inner.game.phase();
            let match_event = if phase == Phase::MatchComplete {
                inner.status = RoomStatus::Complete;
                Some(inner.match_summary()?)
            } else {
                None
            };
            let names = inner.seat_names();
            let view = project(&inner.game, seat, &names);
            (phase, view, inner.projections(), match_event)
        };

        tracing::debug!(
            room_code = %code,
            username = %username,
            action = action.name(),
            phase = %phase,
            "action applied"
        );

        self.dispatch_views(code, updates);

        match phase {
            Phase::MatchComplete => {
                self.clear_advance(&room);
                if let Some(result) = match_event {
                    self.event_bus.broadcast(
                        code,
                        RoomEvent::MatchComplete {
                            room_code: code.to_string(),
                            result,
                        },
                    );
                }
                self.publish_rooms_updated();
            }
            Phase::HandComplete => self.arm_auto_advance(&room),
            _ => self.clear_advance(&room),
        }

        Ok(view)
    }

    /// Cancels the pending deferred next-hand, if any.
    pub fn cancel_auto_advance(&self, code: &str, username: &str) -> Result<(), RoomError> {
        let room = self.get_room(code)?;
        {
            let inner = room.lock();
            inner.seat_of(username)?;
        }
        let cancelled = {
            let mut task = room.advance_task.lock().expect("advance task poisoned");
            match task.take() {
                Some(handle) => {
                    handle.abort();
                    true
                }
                None => false,
            }
        };
        if cancelled {
            self.event_bus.broadcast(
                code,
                RoomEvent::AutoAdvanceCancelled {
                    room_code: code.to_string(),
                },
            );
        }
        Ok(())
    }

    /// Current masked view for a polling client.
    pub fn view_for(&self, code: &str, username: &str) -> Result<GameView, RoomError> {
        let room = self.get_room(code)?;
        let mut inner = room.lock();
        let seat = inner.seat_of(username)?;
        if let Some(conn) = inner.connections.get_mut(username) {
            conn.last_seen = Instant::now();
        }
        let names = inner.seat_names();
        Ok(project(&inner.game, seat, &names))
    }

    /// Snapshot of every room for the lobby list.
    pub fn active_rooms(&self) -> Vec<RoomSummary> {
        let rooms: Vec<Arc<Room>> = {
            let guard = self.rooms.read().expect("room map poisoned");
            guard.values().cloned().collect()
        };
        let mut summaries: Vec<RoomSummary> = rooms
            .iter()
            .map(|r| r.lock().summary(r))
            .collect();
        summaries.sort_by(|a, b| a.room_code.cmp(&b.room_code));
        summaries
    }

    /// Membership check for the SSE handshake.
    pub fn is_member(&self, code: &str, username: &str) -> Result<(), RoomError> {
        let room = self.get_room(code)?;
        let inner = room.lock();
        inner.seat_of(username).map(|_| ())
    }

    /// Removes rooms that sat inactive past the idle window while not in
    /// progress, notifying still-connected clients first.
    pub fn sweep(&self) {
        let rooms: Vec<Arc<Room>> = {
            let guard = self.rooms.read().expect("room map poisoned");
            guard.values().cloned().collect()
        };

        let mut removed = false;
        for room in rooms {
            let idle = {
                let inner = room.lock();
                inner.status != RoomStatus::InProgress
                    && inner.last_activity.elapsed() >= self.idle_timeout
            };
            if idle {
                tracing::info!(room_code = %room.code, "removing idle room");
                self.event_bus.broadcast(
                    &room.code,
                    RoomEvent::RoomTerminated {
                        room_code: room.code.clone(),
                        reason: "closed after inactivity".into(),
                    },
                );
                self.remove_room(&room.code, &room);
                removed = true;
            }
        }
        if removed {
            self.publish_rooms_updated();
        }
    }

    /// Runs [`RoomManager::sweep`] on an interval until aborted.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                manager.sweep();
            }
        })
    }

    fn get_room(&self, code: &str) -> Result<Arc<Room>, RoomError> {
        let guard = self.rooms.read().expect("room map poisoned");
        guard
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(code.to_string()))
    }

    fn remove_room(&self, code: &str, room: &Arc<Room>) {
        self.clear_advance(room);
        let mut guard = self.rooms.write().expect("room map poisoned");
        guard.remove(code);
        drop(guard);
        self.event_bus.drop_room(code);
    }

    fn dispatch_views(&self, code: &str, updates: Vec<(String, GameView)>) {
        // projections were computed under the room lock; deliveries are
        // independent and a failure to one viewer never affects the other
        for (username, view) in updates {
            self.event_bus.send_to(
                code,
                &username,
                RoomEvent::GameStateUpdated {
                    room_code: code.to_string(),
                    view,
                },
            );
        }
    }

    fn publish_rooms_updated(&self) {
        self.event_bus.broadcast_lobby(RoomEvent::RoomsUpdated {
            rooms: self.active_rooms(),
        });
    }

    /// Arms the single outstanding deferred next-hand for a room,
    /// atomically replacing any previous one.
    fn arm_auto_advance(self: &Arc<Self>, room: &Arc<Room>) {
        let manager = Arc::clone(self);
        let code = room.code.clone();
        let delay = self.advance_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            manager.advance_room(&code);
        });

        let mut task = room.advance_task.lock().expect("advance task poisoned");
        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }
    }

    fn clear_advance(&self, room: &Arc<Room>) {
        let mut task = room.advance_task.lock().expect("advance task poisoned");
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }

    /// Timer-driven next hand. Routed through the same per-room lock as
    /// client commands; a stale fire against a moved-on phase is a no-op.
    fn advance_room(self: &Arc<Self>, code: &str) {
        let room = match self.get_room(code) {
            Ok(room) => room,
            Err(_) => return,
        };

        let (phase, updates, match_event) = {
            let mut inner = room.lock();
            if inner.status != RoomStatus::InProgress
                || inner.game.phase() != Phase::HandComplete
            {
                return;
            }
            if let Err(err) = inner.game.start_hand() {
                tracing::warn!(room_code = %code, error = %err, "auto-advance rejected");
                return;
            }
            inner.touch();
            let phase = inner.game.phase();
            let match_event = if phase == Phase::MatchComplete {
                inner.status = RoomStatus::Complete;
                inner.match_summary().ok()
            } else {
                None
            };
            (phase, inner.projections(), match_event)
        };

        tracing::debug!(room_code = %code, phase = %phase, "auto-advanced to next hand");
        self.dispatch_views(code, updates);
        if phase == Phase::MatchComplete {
            if let Some(result) = match_event {
                self.event_bus.broadcast(
                    code,
                    RoomEvent::MatchComplete {
                        room_code: code.to_string(),
                        result,
                    },
                );
            }
            self.publish_rooms_updated();
        }
    }
}

#[cfg(test)]
impl RoomManager {
    fn hand_number(&self, code: &str) -> u32 {
        let room = self.get_room(code).expect("room");
        let inner = room.lock();
        inner.game.hand_number()
    }
}

fn validate_username(username: &str) -> Result<(), RoomError> {
    let trimmed = username.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_USERNAME_LEN || trimmed != username {
        return Err(RoomError::InvalidUsername);
    }
    Ok(())
}

fn seat_connection(inner: &mut RoomInner, username: &str, seat: usize) {
    let now = Instant::now();
    inner.connections.insert(
        username.to_string(),
        PlayerConnection {
            username: username.to_string(),
            connection_id: Uuid::new_v4(),
            seat,
            ready: false,
            joined_at: now,
            last_seen: now,
        },
    );
}

fn generate_code(existing: &HashMap<String, Arc<Room>>) -> Result<String, RoomError> {
    let mut rng = rand::rng();
    for _ in 0..CODE_GENERATION_ATTEMPTS {
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        if !existing.contains_key(&code) {
            return Ok(code);
        }
    }
    Err(RoomError::CodeSpaceExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RoomEvent;

    fn manager() -> Arc<RoomManager> {
        Arc::new(RoomManager::new(EventBus::new()))
    }

    fn quick_manager() -> Arc<RoomManager> {
        Arc::new(RoomManager::with_timings(
            EventBus::new(),
            Duration::from_secs(3 * 60),
            Duration::from_millis(30),
        ))
    }

    fn started_room(manager: &Arc<RoomManager>) -> String {
        let (code, _) = manager.create_room("alice", RoomMode::Online).unwrap();
        manager.join_room(&code, "bob").unwrap();
        manager.set_ready(&code, "alice", true).unwrap();
        manager.set_ready(&code, "bob", true).unwrap();
        code
    }

    /// Plays the current hand to completion via checked-down streets.
    fn check_hand_down(manager: &Arc<RoomManager>, code: &str) {
        let users = ["alice", "bob"];
        for _ in 0..2 {
            let view = manager.view_for(code, "alice").unwrap();
            let to_act = view.betting.expect("open street").to_act;
            manager
                .player_action(code, users[to_act], &Action::Check)
                .unwrap();
        }
        let first = manager.view_for(code, "alice").unwrap().draw_turn.unwrap();
        manager
            .player_action(code, users[first], &Action::Discard { card_indices: vec![] })
            .unwrap();
        manager
            .player_action(
                code,
                users[1 - first],
                &Action::Discard { card_indices: vec![] },
            )
            .unwrap();
        for _ in 0..2 {
            let view = manager.view_for(code, "alice").unwrap();
            let to_act = view.betting.expect("open street").to_act;
            manager
                .player_action(code, users[to_act], &Action::Check)
                .unwrap();
        }
    }

    #[tokio::test]
    async fn room_codes_use_the_unambiguous_alphabet() {
        let manager = manager();
        let (code, _) = manager.create_room("alice", RoomMode::Online).unwrap();
        assert_eq!(code.len(), ROOM_CODE_LEN);
        assert!(code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)));
    }

    #[tokio::test]
    async fn full_lobby_flow_starts_the_match_with_masked_views() {
        let manager = manager();
        let (code, _) = manager.create_room("alice", RoomMode::Online).unwrap();

        let bus = manager.event_bus();
        let mut bob_stream = bus.subscribe(code.clone(), Some("bob".into()));

        let (seat, view) = manager.join_room(&code, "bob").unwrap();
        assert_eq!(seat, 1);
        assert_eq!(view.phase, Phase::NewHand);

        manager.set_ready(&code, "alice", true).unwrap();
        manager.set_ready(&code, "bob", true).unwrap();

        let mut saw_started = false;
        let mut masked_view = None;
        while let Ok(event) = bob_stream.receiver.try_recv() {
            match event {
                RoomEvent::GameStarted { .. } => saw_started = true,
                RoomEvent::GameStateUpdated { view, .. } => masked_view = Some(view),
                _ => {}
            }
        }
        assert!(saw_started);
        let view = masked_view.expect("bob received a view");
        assert_eq!(view.viewer_seat, 1);
        assert!(view.seats[0].cards.iter().all(|c| c.is_masked()));
        assert!(view.seats[1].cards.iter().all(|c| !c.is_masked()));
    }

    #[tokio::test]
    async fn duplicate_username_and_third_seat_are_rejected() {
        let manager = manager();
        let (code, _) = manager.create_room("alice", RoomMode::Online).unwrap();

        assert!(matches!(
            manager.join_room(&code, "alice"),
            Err(RoomError::DuplicateUsername(_))
        ));

        manager.join_room(&code, "bob").unwrap();
        assert!(matches!(
            manager.join_room(&code, "carol"),
            Err(RoomError::RoomFull)
        ));
    }

    #[tokio::test]
    async fn actions_from_the_wrong_seat_surface_engine_errors() {
        let manager = manager();
        let code = started_room(&manager);

        let err = manager
            .player_action(&code, "bob", &Action::Check)
            .unwrap_err();
        assert!(matches!(
            err,
            RoomError::Game(GameError::NotPlayersTurn { .. })
        ));
    }

    #[tokio::test]
    async fn local_room_starts_immediately_with_both_seats() {
        let manager = manager();
        let (code, view) = manager.create_room("sam", RoomMode::Local).unwrap();
        assert_eq!(view.phase, Phase::PreDrawBetting);

        let rooms = manager.active_rooms();
        let summary = rooms.iter().find(|r| r.room_code == code).unwrap();
        assert_eq!(summary.status, "in_progress");
        assert!(!summary.joinable);
        assert_eq!(summary.players.len(), 2);

        // both seats are drivable from the same device
        manager.player_action(&code, "sam", &Action::Check).unwrap();
        manager
            .player_action(&code, "sam #2", &Action::Check)
            .unwrap();
        let view = manager.view_for(&code, "sam #2").unwrap();
        assert_eq!(view.phase, Phase::Draw);
    }

    #[tokio::test]
    async fn leaving_mid_match_terminates_and_emptying_deletes() {
        let manager = manager();
        let code = started_room(&manager);

        let bus = manager.event_bus();
        let mut alice_stream = bus.subscribe(code.clone(), Some("alice".into()));

        manager.leave_room(&code, "bob").unwrap();
        let mut terminated = false;
        while let Ok(event) = alice_stream.receiver.try_recv() {
            if matches!(event, RoomEvent::RoomTerminated { .. }) {
                terminated = true;
            }
        }
        assert!(terminated);

        manager.leave_room(&code, "alice").unwrap();
        assert_eq!(manager.room_count(), 0);
        assert!(matches!(
            manager.view_for(&code, "alice"),
            Err(RoomError::RoomNotFound(_))
        ));
    }

    #[tokio::test]
    async fn auto_advance_starts_the_next_hand() {
        let manager = quick_manager();
        let code = started_room(&manager);

        check_hand_down(&manager, &code);
        assert_eq!(manager.hand_number(&code), 1);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(manager.hand_number(&code), 2);
        let view = manager.view_for(&code, "alice").unwrap();
        assert_eq!(view.phase, Phase::PreDrawBetting);
    }

    #[tokio::test]
    async fn cancelled_auto_advance_waits_for_an_explicit_trigger() {
        let manager = quick_manager();
        let code = started_room(&manager);

        check_hand_down(&manager, &code);
        manager.cancel_auto_advance(&code, "alice").unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(manager.hand_number(&code), 1);
        let view = manager.view_for(&code, "bob").unwrap();
        assert_eq!(view.phase, Phase::HandComplete);
        assert!(view.capabilities.can_next_hand);

        manager
            .player_action(&code, "bob", &Action::NextHand)
            .unwrap();
        assert_eq!(manager.hand_number(&code), 2);
    }

    #[tokio::test]
    async fn sweep_removes_idle_rooms_but_spares_live_matches() {
        // zero idle window: anything not in progress is immediately stale
        let manager = Arc::new(RoomManager::with_timings(
            EventBus::new(),
            Duration::ZERO,
            Duration::from_secs(5),
        ));
        let (idle_code, _) = manager.create_room("idler", RoomMode::Online).unwrap();
        let live_code = started_room(&manager);

        let bus = manager.event_bus();
        let mut idle_stream = bus.subscribe(idle_code.clone(), Some("idler".into()));

        manager.sweep();

        assert!(matches!(
            manager.view_for(&idle_code, "idler"),
            Err(RoomError::RoomNotFound(_))
        ));
        assert!(manager.view_for(&live_code, "alice").is_ok());

        let mut terminated = false;
        while let Ok(event) = idle_stream.receiver.try_recv() {
            if matches!(event, RoomEvent::RoomTerminated { .. }) {
                terminated = true;
            }
        }
        assert!(terminated);
    }

    #[tokio::test]
    async fn rooms_are_isolated_from_each_other() {
        let manager = manager();
        let code_a = started_room(&manager);
        let (code_b, _) = manager.create_room("carol", RoomMode::Online).unwrap();

        manager
            .player_action(&code_a, "alice", &Action::Bet { amount: 5 })
            .unwrap();

        let view_b = manager.view_for(&code_b, "carol").unwrap();
        assert_eq!(view_b.phase, Phase::NewHand);
        assert_eq!(manager.room_count(), 2);
    }
}
