pub mod conf;
pub mod error;
pub mod models;
pub mod quiz;
pub mod render;
pub mod routes;
pub mod session;
pub mod source;
pub mod state;
pub mod templates;
pub mod ws;

use anyhow::Context;
use clap::Parser;
use std::{net::SocketAddr, sync::Arc};

use crate::{conf::Config, source::Envelope, source::QuestionSource, state::AppState};

/// Timed multiple-choice quiz served over HTTP and WebSocket.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
  /// Address to listen on (overrides QUIZ_LISTEN).
  #[arg(long)]
  listen: Option<SocketAddr>,

  /// Question endpoint (overrides QUIZ_SOURCE_URL).
  #[arg(long)]
  source_url: Option<String>,

  /// Accepted payload shape: auto, wrapped or bare (overrides QUIZ_SOURCE_ENVELOPE).
  #[arg(long)]
  envelope: Option<Envelope>,
}

impl Cli {
  fn apply(self, config: &mut Config) {
    if let Some(listen) = self.listen {
      config.listen = listen;
    }
    if let Some(url) = self.source_url {
      config.source.url = url;
    }
    if let Some(envelope) = self.envelope {
      config.source.envelope = envelope;
    }
  }
}

fn init_tracing() -> anyhow::Result<()> {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .try_init()
    .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

  Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  init_tracing()?;

  let mut config = Config::load()?;
  Cli::parse().apply(&mut config);

  let source = QuestionSource::new(&config.source)?;
  let state = Arc::new(AppState::new(source));

  // Background countdown ticker
  tokio::spawn(session::tick_loop(state.clone()));

  let listener = tokio::net::TcpListener::bind(config.listen)
    .await
    .with_context(|| format!("failed to bind {}", config.listen))?;
  tracing::info!(
    listen = %config.listen,
    source = %config.source.url,
    envelope = %config.source.envelope,
    "quiz server started"
  );

  axum::serve(listener, routes::app(state))
    .await
    .context("server error")?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::CommandFactory;

  #[test]
  fn cli_is_well_formed() {
    Cli::command().debug_assert();
  }

  #[test]
  fn flags_override_the_loaded_config() {
    let mut config = Config::from_lookup(|_| None).unwrap();
    Cli::parse_from([
      "timed-quiz",
      "--listen",
      "127.0.0.1:9999",
      "--envelope",
      "bare",
    ])
    .apply(&mut config);

    assert_eq!(config.listen.port(), 9999);
    assert_eq!(config.source.envelope, Envelope::Bare);
    assert_eq!(config.source.url, conf::DEFAULT_SOURCE_URL);
  }
}
