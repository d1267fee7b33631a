//! `GET /v1/ws` — the WebSocket upgrade endpoint. Guarded by session
//! validity; once upgraded, reads from the client are drained and
//! discarded (used only to detect the connection closing), matching
//! SPEC_FULL §4.8.

use super::connections::ConnectionMap;
use crate::sessions::{self, SessionStore};
use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::info;

pub async fn upgrade(
    req: HttpRequest,
    body: web::Payload,
    connections: web::Data<Arc<ConnectionMap>>,
    session_store: web::Data<Arc<dyn SessionStore>>,
    signing_key: web::Data<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let (session_id, _state) =
        sessions::get_state(&req, &signing_key, session_store.as_ref().as_ref())
            .await
            .map_err(actix_web::error::ErrorUnauthorized)?;

    let (response, ws_session, mut msg_stream) = actix_ws::handle(&req, body)?;

    connections.insert(session_id.as_str().to_string(), ws_session);
    info!(session_id = %session_id, "websocket client connected");

    let connections = connections.get_ref().clone();
    let sid_for_task = session_id.as_str().to_string();
    actix_web::rt::spawn(async move {
        use futures_util::StreamExt;
        // Drain incoming frames; we only care about detecting close.
        while msg_stream.next().await.is_some() {}
        connections.remove(&sid_for_task);
        info!(session_id = %sid_for_task, "websocket client disconnected");
    });

    Ok(response)
}
