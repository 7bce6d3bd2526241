use crate::events::EventBus;
use crate::handlers;
use crate::rooms::RoomManager;
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::reply::Reply;
use warp::Filter;

// Hard cap on JSON command bodies; the SSE paths carry no body.
const MAX_BODY_BYTES: u64 = 16 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn for_tests() -> Self {
        Self::new("127.0.0.1", 0)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

#[derive(Clone)]
pub struct AppContext {
    config: ServerConfig,
    event_bus: EventBus,
    rooms: Arc<RoomManager>,
}

impl AppContext {
    pub fn new(config: ServerConfig) -> Self {
        let event_bus = EventBus::new();
        let rooms = Arc::new(RoomManager::new(event_bus.clone()));
        Self::new_with_dependencies(config, event_bus, rooms)
    }

    pub fn new_with_dependencies(
        config: ServerConfig,
        event_bus: EventBus,
        rooms: Arc<RoomManager>,
    ) -> Self {
        Self {
            config,
            event_bus,
            rooms,
        }
    }

    pub fn new_for_tests() -> Self {
        Self::new(ServerConfig::for_tests())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn event_bus(&self) -> EventBus {
        self.event_bus.clone()
    }

    pub fn rooms(&self) -> Arc<RoomManager> {
        Arc::clone(&self.rooms)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    ConfigError(String),
}

pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            context: AppContext::new(config),
        }
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let bind_addr = Self::bind_addr(context.config())?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let routes = Self::routes(&context);
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(Self::map_warp_error)?;

        tracing::info!(address = %addr, "web server listening");

        let task = tokio::spawn(server_future);
        let sweeper = context.rooms().spawn_sweeper();

        Ok(ServerHandle::new(addr, shutdown_tx, task, sweeper, context))
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        let host = config.host();

        if let Ok(addr) = host.parse::<SocketAddr>() {
            return Ok(addr);
        }
        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }

        let candidate = format!("{}:{}", host, config.port());
        let mut addrs = candidate.to_socket_addrs().map_err(|err| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`: {err}"))
        })?;
        addrs.next().ok_or_else(|| {
            ServerError::ConfigError(format!("failed to resolve address `{candidate}`"))
        })
    }

    fn map_warp_error(err: warp::Error) -> ServerError {
        use std::error::Error as StdError;

        if let Some(source) = err.source() {
            if let Some(io_err) = source.downcast_ref::<std::io::Error>() {
                let recreated = std::io::Error::new(io_err.kind(), io_err.to_string());
                return ServerError::BindError(recreated);
            }
        }
        ServerError::ConfigError(err.to_string())
    }

    fn routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let health = Self::health_routes(context);
        let api = Self::api_routes(context);
        let sse = Self::sse_routes(context);

        health.or(api).unify().or(sse).unify().boxed()
    }

    fn health_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let rooms = context.rooms();

        let health = warp::path("health")
            .and(warp::get())
            .and(warp::path::end())
            .map(|| handlers::health::health().into_response());

        let ready = warp::path("ready")
            .and(warp::get())
            .and(warp::path::end())
            .and(Self::with_rooms(rooms))
            .map(|rooms: Arc<RoomManager>| handlers::health::ready(rooms).into_response());

        health.or(ready).unify().boxed()
    }

    fn api_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let rooms = context.rooms();
        let json_body = warp::body::content_length_limit(MAX_BODY_BYTES);

        let list = warp::path!("api" / "rooms")
            .and(warp::get())
            .and(Self::with_rooms(rooms.clone()))
            .and_then(|rooms: Arc<RoomManager>| async move {
                Ok::<_, Infallible>(handlers::rooms::list_rooms(rooms).await)
            });

        let create = warp::path!("api" / "rooms")
            .and(warp::post())
            .and(Self::with_rooms(rooms.clone()))
            .and(json_body.and(warp::body::json()))
            .and_then(
                |rooms: Arc<RoomManager>, request: handlers::CreateRoomRequest| async move {
                    Ok::<_, Infallible>(handlers::rooms::create_room(rooms, request).await)
                },
            );

        let join = warp::path!("api" / "rooms" / String / "join")
            .and(warp::post())
            .and(Self::with_rooms(rooms.clone()))
            .and(json_body.and(warp::body::json()))
            .and_then(
                |code: String, rooms: Arc<RoomManager>, request: handlers::JoinRoomRequest| async move {
                    Ok::<_, Infallible>(handlers::rooms::join_room(code, rooms, request).await)
                },
            );

        let leave = warp::path!("api" / "rooms" / String / "leave")
            .and(warp::post())
            .and(Self::with_rooms(rooms.clone()))
            .and(json_body.and(warp::body::json()))
            .and_then(
                |code: String, rooms: Arc<RoomManager>, request: handlers::LeaveRoomRequest| async move {
                    Ok::<_, Infallible>(handlers::rooms::leave_room(code, rooms, request).await)
                },
            );

        let ready = warp::path!("api" / "rooms" / String / "ready")
            .and(warp::post())
            .and(Self::with_rooms(rooms.clone()))
            .and(json_body.and(warp::body::json()))
            .and_then(
                |code: String, rooms: Arc<RoomManager>, request: handlers::ReadyRequest| async move {
                    Ok::<_, Infallible>(handlers::rooms::set_ready(code, rooms, request).await)
                },
            );

        let actions = warp::path!("api" / "rooms" / String / "actions")
            .and(warp::post())
            .and(Self::with_rooms(rooms.clone()))
            .and(json_body.and(warp::body::json()))
            .and_then(
                |code: String, rooms: Arc<RoomManager>, request: handlers::ActionRequest| async move {
                    Ok::<_, Infallible>(handlers::rooms::submit_action(code, rooms, request).await)
                },
            );

        let cancel = warp::path!("api" / "rooms" / String / "advance" / "cancel")
            .and(warp::post())
            .and(Self::with_rooms(rooms.clone()))
            .and(json_body.and(warp::body::json()))
            .and_then(
                |code: String, rooms: Arc<RoomManager>, request: handlers::LeaveRoomRequest| async move {
                    Ok::<_, Infallible>(
                        handlers::rooms::cancel_auto_advance(code, rooms, request).await,
                    )
                },
            );

        let state = warp::path!("api" / "rooms" / String / "state")
            .and(warp::get())
            .and(Self::with_rooms(rooms))
            .and(warp::query::<handlers::ViewerQuery>())
            .and_then(
                |code: String, rooms: Arc<RoomManager>, query: handlers::ViewerQuery| async move {
                    Ok::<_, Infallible>(handlers::rooms::get_state(code, rooms, query).await)
                },
            );

        list.or(create)
            .unify()
            .or(join)
            .unify()
            .or(leave)
            .unify()
            .or(ready)
            .unify()
            .or(actions)
            .unify()
            .or(cancel)
            .unify()
            .or(state)
            .unify()
            .boxed()
    }

    fn sse_routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
        let rooms = context.rooms();
        let event_bus = context.event_bus();

        let lobby = warp::path!("api" / "rooms" / "events")
            .and(warp::get())
            .and(Self::with_event_bus(event_bus.clone()))
            .and_then(|event_bus: EventBus| async move {
                Ok::<_, Infallible>(handlers::sse::stream_lobby_events(event_bus).await)
            });

        let room = warp::path!("api" / "rooms" / String / "events")
            .and(warp::get())
            .and(Self::with_rooms(rooms))
            .and(Self::with_event_bus(event_bus))
            .and(warp::query::<handlers::ViewerQuery>())
            .and_then(
                |code: String,
                 rooms: Arc<RoomManager>,
                 event_bus: EventBus,
                 query: handlers::ViewerQuery| async move {
                    Ok::<_, Infallible>(
                        handlers::sse::stream_room_events(code, query.username, rooms, event_bus)
                            .await,
                    )
                },
            );

        lobby.or(room).unify().boxed()
    }

    fn with_rooms(
        rooms: Arc<RoomManager>,
    ) -> impl Filter<Extract = (Arc<RoomManager>,), Error = Infallible> + Clone {
        warp::any().map(move || Arc::clone(&rooms))
    }

    fn with_event_bus(
        event_bus: EventBus,
    ) -> impl Filter<Extract = (EventBus,), Error = Infallible> + Clone {
        warp::any().map(move || event_bus.clone())
    }
}

pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    sweeper: Option<JoinHandle<()>>,
    context: AppContext,
}

impl ServerHandle {
    fn new(
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<()>,
        sweeper: JoinHandle<()>,
        context: AppContext,
    ) -> Self {
        Self {
            addr,
            shutdown: Some(shutdown),
            task: Some(task),
            sweeper: Some(sweeper),
            context,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await.map_err(|err| {
                ServerError::ConfigError(format!("server task join error: {err}"))
            })?;
        }
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
