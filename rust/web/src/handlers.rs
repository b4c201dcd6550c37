//! HTTP table-lifecycle endpoints: thin wrappers around the session
//! store. The actual game traffic runs over the websocket channel.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::Reply;

use felt_engine::betting::SeatId;

use crate::errors::error_response;
use crate::session::{Session, SessionStore, TableMode, SEAT_ORDER};

#[derive(Debug, Default, Deserialize)]
pub struct CreateTableRequest {
    pub user_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct JoinTableRequest {
    pub user_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StartTableRequest {
    pub player_id: SeatId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatStatus {
    pub seat: String,
    pub joined: bool,
    pub connected: bool,
    pub is_host: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatus {
    pub table_id: String,
    pub mode: String,
    pub started: bool,
    pub ended: bool,
    pub winners: Vec<SeatId>,
    pub host_player_id: SeatId,
    pub joined_players: Vec<SeatId>,
    pub seats: Vec<SeatStatus>,
}

#[derive(Debug, Serialize)]
struct TableHandle {
    table_id: String,
    player_id: SeatId,
    status: TableStatus,
}

pub async fn table_status(session: &Session) -> TableStatus {
    let state = session.lock_state().await;
    TableStatus {
        table_id: session.id.clone(),
        mode: session.mode.as_str().to_string(),
        started: state.started,
        ended: state.table_ended,
        winners: state.table_winners.clone(),
        host_player_id: state.host_seat.clone(),
        joined_players: state.joined_players.iter().cloned().collect(),
        seats: SEAT_ORDER
            .iter()
            .map(|seat| SeatStatus {
                seat: seat.to_string(),
                joined: state.joined_players.contains(*seat),
                connected: state.human_players.contains(*seat),
                is_host: *seat == state.host_seat,
            })
            .collect(),
    }
}

pub fn health() -> Response {
    reply::json(&serde_json::json!({"status": "ok"})).into_response()
}

pub async fn create_table(store: Arc<SessionStore>, request: CreateTableRequest) -> Response {
    let session = store.create_multiplayer_table(request.user_key.as_deref());
    let status = table_status(&session).await;
    let handle = TableHandle {
        table_id: session.id.clone(),
        player_id: status.host_player_id.clone(),
        status,
    };
    reply::json(&handle).into_response()
}

pub async fn get_table(store: Arc<SessionStore>, table_id: String) -> Response {
    match store.get(&table_id) {
        Some(session) if session.mode == TableMode::Multi => {
            reply::json(&table_status(&session).await).into_response()
        }
        _ => error_response(StatusCode::NOT_FOUND, "table_not_found", "Table not found"),
    }
}

pub async fn join_table(
    store: Arc<SessionStore>,
    table_id: String,
    request: JoinTableRequest,
) -> Response {
    let seat = match store
        .join_multiplayer_table(&table_id, request.user_key.as_deref())
        .await
    {
        Ok(seat) => seat,
        Err(err) => return err.into_response(),
    };
    let session = match store.get(&table_id) {
        Some(session) => session,
        None => {
            return error_response(StatusCode::NOT_FOUND, "table_not_found", "Table not found")
        }
    };
    let handle = TableHandle {
        table_id: session.id.clone(),
        player_id: seat,
        status: table_status(&session).await,
    };
    reply::json(&handle).into_response()
}

pub async fn start_table(
    store: Arc<SessionStore>,
    table_id: String,
    request: StartTableRequest,
) -> Response {
    match store
        .start_multiplayer_table(&table_id, &request.player_id)
        .await
    {
        Ok(session) => reply::json(&table_status(&session).await).into_response(),
        Err(err) => err.into_response(),
    }
}
