//! WebSocket connection handlers.
//!
//! Each connection authenticates with its first text frame, then runs an
//! inbound loop (frames from the client) and an outbound loop (the
//! connection's queue plus keepalive pings). Whichever loop ends first aborts
//! the other and the connection is unregistered.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::time::{Instant, interval_at, timeout, timeout_at};

use crate::{
    domain::{ConnectionId, OutboundMessage, OutboundSender, SessionId, User, UserId},
    infrastructure::{
        dto::{
            conversion::outbound_to_json,
            websocket::{AuthRequest, InboundEnvelope, MovePayload},
        },
        registry::OutboundQueue,
    },
    ui::state::{AppState, PumpConfig},
    usecase::{ConnectError, MoveError, MoveRequest, RequestError, WireError},
};

type WsSender = SplitSink<WebSocket, Message>;
type WsReceiver = SplitStream<WebSocket>;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let pump = state.pump;
    let connection_id = ConnectionId::generate();
    let queue = Arc::new(OutboundQueue::new(
        connection_id.to_string(),
        pump.outbound_capacity,
    ));

    let Some(user) = authenticate(
        &state,
        &mut sender,
        &mut receiver,
        connection_id,
        queue.clone(),
    )
    .await
    else {
        return;
    };
    let user_id = user.id;
    tracing::info!("User '{}' connected as {}", user_id, connection_id);

    let mut send_task = tokio::spawn(outbound_loop(queue.clone(), sender, pump));
    let mut recv_task = tokio::spawn(inbound_loop(
        receiver,
        state.clone(),
        user_id.clone(),
        queue,
        pump,
    ));

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if !state
        .disconnect_user_usecase
        .execute(&user_id, connection_id)
        .await
    {
        tracing::debug!(
            "Connection {} of '{}' was already replaced",
            connection_id,
            user_id
        );
    }
}

/// Reads the handshake frame and registers the connection.
///
/// On failure the error frame is written directly and the socket is closed.
async fn authenticate(
    state: &AppState,
    sender: &mut WsSender,
    receiver: &mut WsReceiver,
    connection_id: ConnectionId,
    queue: Arc<OutboundQueue>,
) -> Option<User> {
    let text = match timeout(state.pump.pong_wait, next_text(receiver)).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            tracing::debug!("Connection {} closed before authenticating", connection_id);
            return None;
        }
        Err(_) => {
            tracing::warn!("Connection {} did not authenticate in time", connection_id);
            return None;
        }
    };

    let result = match serde_json::from_str::<AuthRequest>(&text) {
        Ok(request) => {
            state
                .connect_user_usecase
                .execute(&request.email, &request.access_token, connection_id, queue)
                .await
        }
        Err(e) => Err(ConnectError::MalformedHandshake(e.to_string())),
    };

    match result {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!("Connection {} rejected: {}", connection_id, e);
            if let Ok(json) = outbound_to_json(e.to_outbound()) {
                let _ = timeout(
                    state.pump.write_wait,
                    sender.send(Message::Text(json.into())),
                )
                .await;
            }
            let _ = timeout(state.pump.write_wait, sender.close()).await;
            None
        }
    }
}

/// Next text frame, skipping control and binary frames.
async fn next_text(receiver: &mut WsReceiver) -> Option<String> {
    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => return Some(text.to_string()),
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => {}
        }
    }
    None
}

async fn inbound_loop(
    mut receiver: WsReceiver,
    state: Arc<AppState>,
    user_id: UserId,
    queue: Arc<OutboundQueue>,
    pump: PumpConfig,
) {
    let mut deadline = Instant::now() + pump.pong_wait;
    loop {
        let frame = match timeout_at(deadline, receiver.next()).await {
            Ok(Some(Ok(frame))) => frame,
            Ok(Some(Err(e))) => {
                tracing::warn!("WebSocket error from '{}': {}", user_id, e);
                break;
            }
            Ok(None) => break,
            Err(_) => {
                tracing::info!("Read deadline of '{}' expired", user_id);
                break;
            }
        };

        match frame {
            Message::Text(text) => dispatch(&state, &user_id, &queue, text.as_str()).await,
            Message::Pong(_) => deadline = Instant::now() + pump.pong_wait,
            Message::Close(_) => {
                tracing::info!("User '{}' requested close", user_id);
                break;
            }
            Message::Ping(_) | Message::Binary(_) => {}
        }
    }
}

/// Routes one inbound frame by its `type`.
async fn dispatch(state: &AppState, user_id: &UserId, queue: &OutboundQueue, text: &str) {
    tracing::debug!("Received from '{}': {}", user_id, text);

    let envelope = match serde_json::from_str::<InboundEnvelope>(text) {
        Ok(envelope) => envelope,
        Err(e) => return reply(queue, &RequestError::InvalidJson(e.to_string())),
    };

    match envelope.r#type.as_str() {
        "move" => {
            let payload = match serde_json::from_value::<MovePayload>(envelope.payload) {
                Ok(payload) => payload,
                Err(e) => return reply(queue, &MoveError::Malformed(e.to_string())),
            };
            if let Err(e) = state
                .submit_move_usecase
                .execute(user_id, move_request(payload))
                .await
            {
                tracing::info!("Move from '{}' rejected: {}", user_id, e);
                reply(queue, &e);
            }
        }
        "position" => state.query_position_usecase.execute(user_id).await,
        other => reply(queue, &RequestError::UnknownType(other.to_string())),
    }
}

fn move_request(payload: MovePayload) -> MoveRequest {
    MoveRequest {
        session_id: SessionId::new(payload.game_id),
        notation: payload.notation,
        dialect: payload.notation_type.into(),
        request_draw: payload.request_draw,
        resign: payload.resign,
    }
}

/// Queues an error frame on this connection only.
fn reply(queue: &OutboundQueue, error: &impl WireError) {
    if let Err(e) = queue.send(error.to_outbound()) {
        tracing::debug!("Error reply not queued: {}", e);
    }
}

async fn outbound_loop(queue: Arc<OutboundQueue>, mut sender: WsSender, pump: PumpConfig) {
    let period = pump.ping_interval();
    let mut ticker = interval_at(Instant::now() + period, period);

    loop {
        let frame = tokio::select! {
            message = queue.pop() => match message {
                Some(message) => match encode(message) {
                    Some(frame) => frame,
                    None => continue,
                },
                None => {
                    tracing::debug!("Outbound queue closed");
                    break;
                }
            },
            _ = ticker.tick() => Message::Ping(Bytes::new()),
        };

        match timeout(pump.write_wait, sender.send(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!("WebSocket write failed: {}", e);
                break;
            }
            Err(_) => {
                tracing::warn!("WebSocket write deadline expired");
                break;
            }
        }
    }

    let _ = timeout(pump.write_wait, sender.close()).await;
}

fn encode(message: OutboundMessage) -> Option<Message> {
    let kind = message.kind();
    match outbound_to_json(message) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!("Failed to serialize '{}' message: {}", kind, e);
            None
        }
    }
}
