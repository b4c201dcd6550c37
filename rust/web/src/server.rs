//! Server wiring: route composition, shared context, and lifecycle
//! (bind, graceful shutdown, periodic session sweep).

use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use warp::filters::BoxedFilter;
use warp::reply::Reply;
use warp::Filter;

use crate::config::AppConfig;
use crate::handlers;
use crate::orchestrator::{TurnOrchestrator, WsQuery};
use crate::session::SessionStore;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

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
    server_config: ServerConfig,
    store: Arc<SessionStore>,
    orchestrator: Arc<TurnOrchestrator>,
}

impl AppContext {
    pub fn new(server_config: ServerConfig, app_config: AppConfig) -> Self {
        let store = Arc::new(SessionStore::new());
        let orchestrator = Arc::new(TurnOrchestrator::new(Arc::clone(&store), app_config));
        Self {
            server_config,
            store,
            orchestrator,
        }
    }

    pub fn new_for_tests(app_config: AppConfig) -> Self {
        Self::new(ServerConfig::for_tests(), app_config)
    }

    pub fn server_config(&self) -> &ServerConfig {
        &self.server_config
    }

    pub fn store(&self) -> Arc<SessionStore> {
        Arc::clone(&self.store)
    }

    pub fn orchestrator(&self) -> Arc<TurnOrchestrator> {
        Arc::clone(&self.orchestrator)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

/// All routes: the websocket channel, the table-lifecycle endpoints,
/// and the health probe.
pub fn routes(context: &AppContext) -> BoxedFilter<(warp::reply::Response,)> {
    let health = warp::path("health")
        .and(warp::get())
        .and(warp::path::end())
        .map(handlers::health);

    let orchestrator = context.orchestrator();
    let ws = warp::path("ws")
        .and(warp::path::end())
        .and(warp::ws())
        .and(warp::query::<WsQuery>())
        .map(move |upgrade: warp::ws::Ws, query: WsQuery| {
            let orchestrator = Arc::clone(&orchestrator);
            upgrade
                .on_upgrade(move |socket| orchestrator.handle_connection(socket, query))
                .into_response()
        });

    let store = context.store();
    let create = warp::path!("tables" / "create")
        .and(warp::post())
        .and(with_store(store.clone()))
        .and(json_body_or_default::<handlers::CreateTableRequest>())
        .and_then(|store, request| async move {
            Ok::<_, Infallible>(handlers::create_table(store, request).await)
        });

    let status = warp::path!("tables" / String)
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(|table_id, store| async move {
            Ok::<_, Infallible>(handlers::get_table(store, table_id).await)
        });

    let join = warp::path!("tables" / String / "join")
        .and(warp::post())
        .and(with_store(store.clone()))
        .and(json_body_or_default::<handlers::JoinTableRequest>())
        .and_then(|table_id, store, request| async move {
            Ok::<_, Infallible>(handlers::join_table(store, table_id, request).await)
        });

    let start = warp::path!("tables" / String / "start")
        .and(warp::post())
        .and(with_store(store))
        .and(warp::body::json::<handlers::StartTableRequest>())
        .and_then(|table_id, store, request| async move {
            Ok::<_, Infallible>(handlers::start_table(store, table_id, request).await)
        });

    health
        .or(ws)
        .unify()
        .or(create)
        .unify()
        .or(status)
        .unify()
        .or(join)
        .unify()
        .or(start)
        .unify()
        .boxed()
}

fn with_store(
    store: Arc<SessionStore>,
) -> impl Filter<Extract = (Arc<SessionStore>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&store))
}

/// Optional JSON bodies: `{}` semantics for endpoints whose request
/// fields are all optional.
fn json_body_or_default<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Default + Send,
{
    warp::body::bytes().map(|bytes: warp::hyper::body::Bytes| {
        if bytes.is_empty() {
            T::default()
        } else {
            serde_json::from_slice(&bytes).unwrap_or_default()
        }
    })
}

pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let bind_addr = Self::bind_addr(self.context.server_config())?;
        let routes = routes(&self.context);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (addr, server_future) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(bind_addr, async move {
                let _ = shutdown_rx.await;
            })
            .map_err(|err| ServerError::Config(err.to_string()))?;

        tracing::info!(%addr, "server listening");

        let task = tokio::spawn(server_future);

        let store = self.context.store();
        let sweeper = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                store.cleanup_expired();
            }
        });

        Ok(ServerHandle {
            addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
            sweeper,
            context: self.context,
        })
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        if let Ok(ip) = config.host().parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }
        let candidate = format!("{}:{}", config.host(), config.port());
        candidate
            .to_socket_addrs()
            .map_err(|err| {
                ServerError::Config(format!("failed to resolve address `{candidate}`: {err}"))
            })?
            .next()
            .ok_or_else(|| ServerError::Config(format!("failed to resolve address `{candidate}`")))
    }
}

pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    sweeper: JoinHandle<()>,
    context: AppContext,
}

impl ServerHandle {
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.sweeper.abort();
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|err| ServerError::Config(format!("server task join error: {err}")))?;
        }
        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.sweeper.abort();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
