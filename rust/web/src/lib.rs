//! # felt-web: Table Server
//!
//! Multiplayer and single-player Texas Hold'em tables over a duplex
//! WebSocket channel, with thin HTTP endpoints for table lifecycle. The
//! [`session::SessionStore`] keeps the table registry; the
//! [`orchestrator::TurnOrchestrator`] validates client moves, drives AI
//! seats between human actions, and fans out events and per-viewer
//! state to every connected seat.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod messages;
pub mod orchestrator;
pub mod replay;
pub mod server;
pub mod session;

pub use config::AppConfig;
pub use errors::ErrorBody;
pub use logging::init_logging;
pub use messages::{ClientMessage, ErrorCode, ErrorMessage, ServerMessage};
pub use orchestrator::{TurnOrchestrator, WsQuery};
pub use replay::{ReplayBuffer, ReplayError};
pub use server::{routes, AppContext, ServerConfig, ServerError, ServerHandle, WebServer};
pub use session::{Session, SessionId, SessionStore, StoreError, TableMode};
