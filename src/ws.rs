use crate::models::{ClientAction, InternalMsg};
use crate::session::Session;
use crate::state::AppState;
use axum::{
  extract::{
    Query, State,
    ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
  },
  http::StatusCode,
  response::{IntoResponse, Response},
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::{
  sync::Arc,
  time::{Duration, Instant},
};
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct WsParams {
  session: Uuid,
}

/// Unknown sessions are refused before the upgrade is looked at.
pub async fn ws_handler(
  State(state): State<Arc<AppState>>,
  Query(params): Query<WsParams>,
  ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
  let Some(session) = state.session(&params.session) else {
    return (StatusCode::NOT_FOUND, "Unknown session").into_response();
  };
  match ws {
    Ok(ws) => ws
      .on_upgrade(move |socket| handle_socket(socket, state, session))
      .into_response(),
    Err(rejection) => rejection.into_response(),
  }
}

/// Attaches to `session` only if it is still registered.
///
/// The ticker may reap a session between the lookup and the attach; a socket
/// on a reaped session would never see its countdown move again.
async fn attach_live(
  state: &AppState,
  session: &RwLock<Session>,
) -> Option<broadcast::Receiver<InternalMsg>> {
  let (updates, id) = {
    let mut s = session.write().await;
    (s.attach(), s.id)
  };
  if state.sessions.contains_key(&id) {
    Some(updates)
  } else {
    session.write().await.detach(Instant::now());
    None
  }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, session: Arc<RwLock<Session>>) {
  let (mut sender, mut receiver) = socket.split();

  const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
  const CLIENT_TIMEOUT: Duration = Duration::from_secs(15);
  let mut heartbeat_interval = tokio::time::interval(HEARTBEAT_INTERVAL);
  heartbeat_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

  let id = session.read().await.id;
  let Some(mut updates) = attach_live(&state, &session).await else {
    tracing::debug!(session = %id, "session reaped before the socket attached");
    let _ = sender.send(Message::Close(None)).await;
    return;
  };
  tracing::debug!(session = %id, "socket attached");

  // Initial State
  if let Some(frame) = render_frame(&session).await {
    let _ = sender.send(frame).await;
  }

  let mut last_heartbeat = Instant::now();

  loop {
    tokio::select! {
      res = receiver.next() => {
        last_heartbeat = Instant::now();
        match res {
          Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientAction>(&text) {
            Ok(action) => session.write().await.handle(action, Instant::now()),
            Err(e) => tracing::debug!(session = %id, "unreadable client message: {e}"),
          },
          Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
          _ => {}
        }
      }
      Ok(msg) = updates.recv() => {
        match msg {
          InternalMsg::StateUpdated => {
            if let Some(frame) = render_frame(&session).await {
              if sender.send(frame).await.is_err() { break; }
            }
          }
        }
      }
      // Pings go out on a fixed interval; any client frame counts as alive
      _ = heartbeat_interval.tick() => {
        if Instant::now().duration_since(last_heartbeat) > CLIENT_TIMEOUT {
          tracing::debug!(session = %id, "socket timed out");
          break;
        }
        let _ = sender.send(Message::Ping(vec![].into())).await;
      }
    }
  }

  session.write().await.detach(Instant::now());
  tracing::debug!(session = %id, "socket detached");
}

/// Current screen wrapped in the `render` message the page script expects.
async fn render_frame(session: &RwLock<Session>) -> Option<Message> {
  let s = session.read().await;
  match s.screen() {
    Ok(html) => {
      let json = serde_json::json!({ "type": "render", "data": html });
      Some(Message::text(json.to_string()))
    }
    Err(e) => {
      tracing::error!(session = %s.id, "render failed: {e:#}");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::routes::app;
  use crate::source::tests::{failing_source, healthy_source};
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use pretty_assertions::assert_eq;
  use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite};
  use tower::ServiceExt;

  type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

  async fn registered(state: &AppState) -> Uuid {
    let session = Session::open(&state.source).await;
    let id = session.id;
    state.sessions.insert(id, Arc::new(RwLock::new(session)));
    id
  }

  async fn serve(state: Arc<AppState>) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app(state)).await.unwrap();
    });
    addr
  }

  /// Next `render` frame, skipping heartbeat pings.
  async fn next_render(client: &mut Client) -> String {
    loop {
      let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("no frame within 5s")
        .unwrap()
        .unwrap();
      if let tungstenite::Message::Text(text) = msg {
        let frame: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(frame["type"], "render");
        return frame["data"].as_str().unwrap().to_string();
      }
    }
  }

  #[tokio::test]
  async fn unknown_session_is_not_found() {
    let state = Arc::new(AppState::new(failing_source().await));
    let uri = format!("/ws?session={}", Uuid::now_v7());
    let resp = app(state)
      .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn socket_renders_on_connect_and_after_each_action() {
    let state = Arc::new(AppState::new(healthy_source().await));
    let id = registered(&state).await;
    let addr = serve(state.clone()).await;

    let (mut client, _) = connect_async(format!("ws://{addr}/ws?session={id}"))
      .await
      .unwrap();

    let first = next_render(&mut client).await;
    assert!(first.contains("1 ) 2 + 2?"));
    assert!(first.contains(r#"data-action="advance" disabled>"#));

    client
      .send(tungstenite::Message::text(
        r#"{"type":"select","data":{"question":0,"option":1}}"#,
      ))
      .await
      .unwrap();
    let second = next_render(&mut client).await;
    assert!(second.contains(r#"<li class="selected" data-action="select" data-question="0" data-option="1">4</li>"#));

    client
      .send(tungstenite::Message::text(r#"{"type":"advance"}"#))
      .await
      .unwrap();
    let third = next_render(&mut client).await;
    assert!(third.contains("2 ) Capital of France?"));
  }

  #[tokio::test]
  async fn reaped_session_is_not_attached() {
    let state = AppState::new(failing_source().await);
    let id = registered(&state).await;
    let session = state.session(&id).unwrap();

    assert!(attach_live(&state, &session).await.is_some());

    state.sessions.remove(&id);
    assert!(attach_live(&state, &session).await.is_none());
  }
}
