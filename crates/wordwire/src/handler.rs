//! Per-connection handler: handshake, registration, and the read loop.
//!
//! Each accepted connection gets its own task running this handler.
//! The flow is:
//!   1. Send the auth challenge (code 10)
//!   2. Loop until a correct password arrives (incorrect passwords are
//!      answered and the connection stays open; a first message that
//!      skips authentication is answered with the unauthorized notice
//!      and the connection is closed)
//!   3. Register with the dispatcher, spawn the outbound pump, ack the
//!      assigned id (code 1)
//!   4. Loop: receive → decode → dispatch
//!
//! All outbound traffic after registration flows through the pump task
//! so the dispatcher never awaits socket I/O under its lock.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::Mutex;
use wordwire_protocol::{Message, PlayerId, WireCodec};
use wordwire_session::Authenticator;
use wordwire_transport::Connection;

use crate::server::ServerState;
use crate::{Dispatcher, WordwireError};

/// Drop guard that tears down a player's registrations when the
/// handler exits, cleanly or not. `Drop` is synchronous, so the async
/// lock is taken in a fire-and-forget task.
struct ConnectionGuard {
    player_id: PlayerId,
    dispatcher: Arc<Mutex<Dispatcher>>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            dispatcher.lock().await.handle_disconnect(player_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C, A>(
    conn: C,
    state: Arc<ServerState<A>>,
) -> Result<(), WordwireError>
where
    C: Connection,
    A: Authenticator,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // --- Step 1: handshake ---
    let Some(player_id) = perform_handshake(&conn, &state).await? else {
        return Ok(());
    };
    tracing::info!(%conn_id, %player_id, "player authenticated");

    let _guard = ConnectionGuard {
        player_id,
        dispatcher: Arc::clone(&state.dispatcher),
    };

    // --- Step 2: read loop ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        match state.codec.decode_message(&data) {
            Ok(message) => {
                state
                    .dispatcher
                    .lock()
                    .await
                    .handle_message(player_id, message);
            }
            Err(e) => {
                // Malformed buffer or illegal field set: fatal to this
                // message only. Answer the generic error notice and
                // keep reading.
                if e.is_malformed() {
                    tracing::warn!(%player_id, error = %e, "malformed message");
                } else {
                    tracing::debug!(%player_id, error = %e, "protocol violation");
                }
                send_direct(&conn, &state.codec, &Message::GenericError)
                    .await?;
            }
        }
    }

    // _guard drops here → disconnect teardown runs.
    Ok(())
}

/// Drives the password exchange. Returns the assigned player id, or
/// `None` if the connection was closed or rejected before
/// registration.
async fn perform_handshake<C, A>(
    conn: &Arc<C>,
    state: &Arc<ServerState<A>>,
) -> Result<Option<PlayerId>, WordwireError>
where
    C: Connection,
    A: Authenticator,
{
    send_direct(conn, &state.codec, &Message::AuthChallenge).await?;

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(
                    conn_id = %conn.id(),
                    "connection closed before handshake"
                );
                return Ok(None);
            }
            Err(e) => {
                tracing::debug!(
                    conn_id = %conn.id(),
                    error = %e,
                    "recv error during handshake"
                );
                return Ok(None);
            }
        };

        let password = match state.codec.decode_message(&data) {
            Ok(Message::AuthResponse { password }) => password,
            // Anything else — a different code, an auth message with
            // no password, or undecodable bytes — skips the handshake:
            // unauthorized, connection closes.
            Ok(_) | Err(_) => {
                tracing::info!(
                    conn_id = %conn.id(),
                    "unauthenticated message, closing"
                );
                send_direct(conn, &state.codec, &Message::Unauthorized)
                    .await?;
                let _ = conn.close().await;
                return Ok(None);
            }
        };

        if state.auth.verify(&password).is_err() {
            // The connection stays open; the client may try again.
            tracing::info!(conn_id = %conn.id(), "incorrect password");
            send_direct(conn, &state.codec, &Message::IncorrectPassword)
                .await?;
            continue;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let player_id =
            match state.dispatcher.lock().await.register(tx.clone()) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(
                        conn_id = %conn.id(),
                        error = %e,
                        "registration failed"
                    );
                    send_direct(conn, &state.codec, &Message::GenericError)
                        .await?;
                    let _ = conn.close().await;
                    return Ok(None);
                }
            };

        // Queue the ack first, then let the pump drain the channel —
        // the assigned id is always the first post-auth message.
        let _ = tx.send(Message::AuthOk { id: player_id });
        spawn_pump(Arc::clone(conn), rx, state.codec, player_id);

        return Ok(Some(player_id));
    }
}

/// Spawns the outbound pump: drains the player's channel, encodes, and
/// writes. Ends when the channel closes (player removed from the
/// registry) or the transport dies, closing the connection either way.
fn spawn_pump<C: Connection>(
    conn: Arc<C>,
    mut rx: UnboundedReceiver<Message>,
    codec: WireCodec,
    player_id: PlayerId,
) {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let bytes = match codec.encode_message(&message) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(
                        %player_id,
                        code = message.code(),
                        error = %e,
                        "dropping unencodable outbound message"
                    );
                    continue;
                }
            };
            if let Err(e) = conn.send(&bytes).await {
                tracing::debug!(
                    %player_id,
                    error = %e,
                    "outbound send failed"
                );
                break;
            }
        }
        let _ = conn.close().await;
    });
}

/// Encodes and writes one message outside the pump — handshake traffic
/// and decode-error answers, both owned by the handler task itself.
async fn send_direct<C: Connection>(
    conn: &Arc<C>,
    codec: &WireCodec,
    message: &Message,
) -> Result<(), WordwireError> {
    let bytes = codec.encode_message(message)?;
    conn.send(&bytes).await?;
    Ok(())
}
