use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use std::fmt::Debug;
use thiserror::Error;

/// Handler failure: logged, then answered with a 500.
pub struct AppError(anyhow::Error);

impl<E> From<E> for AppError
where
  E: Into<anyhow::Error>,
{
  fn from(err: E) -> Self {
    Self(err.into())
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    tracing::error!("Application error: {:#}", self.0);

    #[cfg(debug_assertions)]
    let message = format!(
      "Something went wrong:\n{}\n\nBacktrace:\n{}",
      self.0,
      self.0.backtrace()
    );

    #[cfg(not(debug_assertions))]
    let message = format!("Something went wrong: {}", self.0);

    (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
  }
}

impl Debug for AppError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self.0)
  }
}

/// Loading questions failed. Every variant ends on the same error screen.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("question source unreachable: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("question source answered HTTP {0}")]
  Status(reqwest::StatusCode),

  #[error("question payload could not be decoded: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("question source returned no questions")]
  Empty,
}
