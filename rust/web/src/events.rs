use crate::view::GameView;
use jokerdraw_engine::game::MatchOutcome;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

// Bounded channels so a slow subscriber sheds events instead of exhausting
// memory; failed sends drop the subscriber.
const EVENT_CHANNEL_BUFFER: usize = 256;

pub type EventSender = mpsc::Sender<RoomEvent>;
pub type EventReceiver = mpsc::Receiver<RoomEvent>;

/// Where a subscription listens: one room's stream, or the lobby stream
/// that carries room-list updates.
#[derive(Debug, Clone, Eq, PartialEq)]
enum Target {
    Room(String),
    Lobby,
}

pub struct EventSubscription {
    bus: EventBus,
    target: Target,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    /// Detaches the receiver for stream adapters; the subscription itself
    /// must be kept alive to hold the registration.
    pub fn take_receiver(&mut self) -> EventReceiver {
        let (_tx, rx) = mpsc::channel(1);
        std::mem::replace(&mut self.receiver, rx)
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.target, self.subscriber_id);
    }
}

#[derive(Debug, Clone)]
struct Subscriber {
    id: usize,
    // username this subscription views as; None receives only untargeted
    // room events
    viewer: Option<String>,
    tx: EventSender,
}

/// Fan-out hub for room events. Per-viewer projections go through
/// [`EventBus::send_to`]; shared events through [`EventBus::broadcast`].
/// Delivery uses `try_send`, so one dead or slow receiver never blocks or
/// corrupts delivery to the others.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    rooms: RwLock<HashMap<String, Vec<Subscriber>>>,
    lobby: RwLock<Vec<Subscriber>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, room_code: impl Into<String>, viewer: Option<String>) -> EventSubscription {
        let room_code = room_code.into();
        let (tx, receiver) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        {
            let mut guard = self.inner.rooms.write().expect("subscriber lock poisoned");
            guard.entry(room_code.clone()).or_default().push(Subscriber {
                id,
                viewer: viewer.clone(),
                tx,
            });
        }
        tracing::debug!(
            room_code = %room_code,
            subscriber_id = id,
            viewer = viewer.as_deref().unwrap_or("-"),
            "client subscribed to room events"
        );
        EventSubscription {
            bus: self.clone(),
            target: Target::Room(room_code),
            subscriber_id: id,
            receiver,
        }
    }

    pub fn subscribe_lobby(&self) -> EventSubscription {
        let (tx, receiver) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.inner
            .lobby
            .write()
            .expect("subscriber lock poisoned")
            .push(Subscriber {
                id,
                viewer: None,
                tx,
            });
        EventSubscription {
            bus: self.clone(),
            target: Target::Lobby,
            subscriber_id: id,
            receiver,
        }
    }

    /// Delivers `event` to every subscriber of the room.
    pub fn broadcast(&self, room_code: &str, event: RoomEvent) {
        let subscribers = {
            let guard = self.inner.rooms.read().expect("subscriber lock poisoned");
            guard.get(room_code).cloned()
        };
        if let Some(list) = subscribers {
            self.deliver(&Target::Room(room_code.to_string()), &list, &event);
        }
    }

    /// Delivers `event` only to subscriptions viewing as `username` —
    /// the per-seat path for masked views and caller-only notifications.
    pub fn send_to(&self, room_code: &str, username: &str, event: RoomEvent) {
        let subscribers = {
            let guard = self.inner.rooms.read().expect("subscriber lock poisoned");
            guard.get(room_code).map(|list| {
                list.iter()
                    .filter(|s| s.viewer.as_deref() == Some(username))
                    .cloned()
                    .collect::<Vec<_>>()
            })
        };
        if let Some(list) = subscribers {
            self.deliver(&Target::Room(room_code.to_string()), &list, &event);
        }
    }

    pub fn broadcast_lobby(&self, event: RoomEvent) {
        let list = self
            .inner
            .lobby
            .read()
            .expect("subscriber lock poisoned")
            .clone();
        self.deliver(&Target::Lobby, &list, &event);
    }

    fn deliver(&self, target: &Target, list: &[Subscriber], event: &RoomEvent) {
        let mut failed = Vec::new();
        for sub in list {
            if let Err(err) = sub.tx.try_send(event.clone()) {
                tracing::warn!(
                    subscriber_id = sub.id,
                    error = ?err,
                    "failed to deliver event; dropping subscriber"
                );
                failed.push(sub.id);
            }
        }
        if !failed.is_empty() {
            for id in failed {
                self.unsubscribe(target, id);
            }
        }
    }

    fn unsubscribe(&self, target: &Target, subscriber_id: usize) {
        match target {
            Target::Room(code) => {
                let mut guard = self.inner.rooms.write().expect("subscriber lock poisoned");
                if let Some(list) = guard.get_mut(code) {
                    list.retain(|s| s.id != subscriber_id);
                    if list.is_empty() {
                        guard.remove(code);
                    }
                }
            }
            Target::Lobby => {
                let mut guard = self.inner.lobby.write().expect("subscriber lock poisoned");
                guard.retain(|s| s.id != subscriber_id);
            }
        }
    }

    /// Drops every subscription of a removed room.
    pub fn drop_room(&self, room_code: &str) {
        let mut guard = self.inner.rooms.write().expect("subscriber lock poisoned");
        guard.remove(room_code);
    }

    pub fn subscriber_count(&self) -> usize {
        let rooms = self.inner.rooms.read().expect("subscriber lock poisoned");
        let lobby = self.inner.lobby.read().expect("subscriber lock poisoned");
        rooms.values().map(|l| l.len()).sum::<usize>() + lobby.len()
    }
}

/// Joinable-room summary for the lobby list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomSummary {
    pub room_code: String,
    pub status: String,
    pub players: Vec<String>,
    pub joinable: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Match outcome enriched with the winner's username for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchSummary {
    pub outcome: MatchOutcome,
    pub winner_username: Option<String>,
    pub chips: [u32; 2],
    pub hands_played: u32,
}

/// Server-to-client events, serialized onto each viewer's SSE stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    RoomCreated {
        room_code: String,
        username: String,
        seat: usize,
    },
    RoomJoined {
        room_code: String,
        username: String,
        seat: usize,
    },
    RoomLeft {
        room_code: String,
        username: String,
    },
    PlayerJoined {
        room_code: String,
        username: String,
        seat: usize,
    },
    PlayerLeft {
        room_code: String,
        username: String,
        seat: usize,
    },
    PlayerReadyChanged {
        room_code: String,
        username: String,
        ready: bool,
    },
    GameStarted {
        room_code: String,
    },
    GameStateUpdated {
        room_code: String,
        view: GameView,
    },
    MatchComplete {
        room_code: String,
        result: MatchSummary,
    },
    RoomsUpdated {
        rooms: Vec<RoomSummary>,
    },
    RoomTerminated {
        room_code: String,
        reason: String,
    },
    AutoAdvanceCancelled {
        room_code: String,
    },
    Error {
        room_code: String,
        message: String,
    },
}
