use crate::{
  error::AppError, render, session::Session, state::AppState, templates::PageTemplate, ws,
};
use askama::Template;
use axum::{
  Router,
  extract::State,
  response::{Html, IntoResponse},
  routing::get,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn app(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/", get(index))
    .route("/ws", get(ws::ws_handler))
    .route("/healthz", get(healthz))
    .layer(
      ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new().deflate(true).gzip(true)),
    )
    .with_state(state)
}

fn html<T: Template>(t: T) -> Result<Html<String>, AppError> {
  Ok(Html(render::to_html(&t)?))
}

/// Every page load is a fresh quiz. A failed fetch is rendered in place and
/// never registered, so there is nothing to connect to.
async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
  let session = Session::open(&state.source).await;
  let screen = match session.screen() {
    Ok(screen) => screen,
    Err(e) => {
      tracing::error!(session = %session.id, "initial render failed: {e:#}");
      render::error_screen()?
    }
  };

  let id = if session.is_failed() {
    String::new()
  } else {
    let id = session.id;
    state.sessions.insert(id, Arc::new(RwLock::new(session)));
    tracing::info!(session = %id, live = state.sessions.len(), "session opened");
    id.to_string()
  };

  html(PageTemplate {
    session: id,
    screen,
  })
}

async fn healthz() -> &'static str {
  "ok"
}
