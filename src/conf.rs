use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use crate::source::Envelope;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_SOURCE_URL: &str = "https://vishwa-s28.github.io/quiz-api/questions.json";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
  pub listen: SocketAddr,
  pub source: SourceConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SourceConfig {
  pub url: String,
  pub envelope: Envelope,
  pub timeout_secs: u64,
}

impl SourceConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

impl Config {
  pub fn load() -> Result<Self> {
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Builds the config from any key lookup, environment variable names as keys.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    Ok(Self {
      listen: parse_or(&lookup, "QUIZ_LISTEN", DEFAULT_LISTEN)?,
      source: SourceConfig {
        url: lookup("QUIZ_SOURCE_URL").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
        envelope: parse_or(&lookup, "QUIZ_SOURCE_ENVELOPE", "auto")?,
        timeout_secs: parse_or(
          &lookup,
          "QUIZ_FETCH_TIMEOUT_SECS",
          &DEFAULT_FETCH_TIMEOUT_SECS.to_string(),
        )?,
      },
    })
  }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  let raw = lookup(key).unwrap_or_else(|| default.to_string());
  raw
    .parse()
    .with_context(|| format!("invalid value {raw:?} for {key}"))
}
