//! Stats endpoints and the live change feed

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    Extension, Json,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::routes::identity::CurrentUser;
use crate::AppState;

/// GET /api/stats
/// Returns the stats row, creating the zero row on first access
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<StatsSnapshot>> {
    let row = state.db.get_or_create_stats(user.user_id).await?;
    Ok(Json(row.to_snapshot()))
}

/// POST /api/stats/events
/// Applies one trigger atomically and publishes the new row
pub async fn record_event(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<StatsEventRequest>,
) -> Result<Json<StatsEventResponse>> {
    let outcome = state
        .db
        .increment_stats(user.user_id, payload.trigger, payload.event_id)
        .await?;

    let snapshot = outcome.row.to_snapshot();

    if outcome.applied {
        info!(
            user_id = %user.user_id,
            trigger = %payload.trigger,
            total_points = snapshot.stats.total_points,
            level = snapshot.stats.level,
            "Stats updated"
        );
        state.stats_feed.publish(snapshot);
    } else {
        debug!(user_id = %user.user_id, event_id = ?payload.event_id, "Duplicate stats event ignored");
    }

    Ok(Json(StatsEventResponse {
        snapshot,
        applied: outcome.applied,
    }))
}

/// GET /ws/stats
/// The caller is identified by the upgrade request's user header
pub async fn subscribe(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> impl IntoResponse {
    info!(user_id = %user.user_id, "Stats subscriber connecting");
    ws.on_upgrade(move |socket| handle_socket(socket, state, user.user_id))
}

async fn send_snapshot(socket: &mut WebSocket, snapshot: &StatsSnapshot) -> bool {
    match serde_json::to_string(snapshot) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to encode stats snapshot");
            true
        }
    }
}

async fn current_snapshot(state: &AppState, user_id: Uuid) -> Option<StatsSnapshot> {
    match state.db.get_stats(user_id).await {
        Ok(row) => row.map(|r| r.to_snapshot()),
        Err(e) => {
            warn!(error = %e, "Failed to load stats for subscriber");
            None
        }
    }
}

async fn handle_socket(mut socket: WebSocket, state: AppState, user_id: Uuid) {
    // Subscribe before reading the current row so no change slips between
    let mut rx = state.stats_feed.subscribe();

    if let Some(snapshot) = current_snapshot(&state, user_id).await {
        if !send_snapshot(&mut socket, &snapshot).await {
            return;
        }
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(snapshot) if snapshot.user_id == user_id => {
                        if !send_snapshot(&mut socket, &snapshot).await {
                            debug!("Stats subscriber disconnected during send");
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(missed = n, "Stats subscriber lagged behind feed");
                        if let Some(snapshot) = current_snapshot(&state, user_id).await {
                            if !send_snapshot(&mut socket, &snapshot).await {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(error = %e, "Stats WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!(user_id = %user_id, "Stats subscriber disconnected");
}
