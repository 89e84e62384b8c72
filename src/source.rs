//! Remote question source.
//!
//! The endpoint has been seen answering both `{"questions": [...]}` and a bare
//! array, so the accepted envelope is part of the configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{conf::SourceConfig, error::FetchError, models::Question};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Envelope {
  /// Accept either shape.
  #[default]
  Auto,
  /// `{"questions": [...]}`
  Wrapped,
  /// `[...]`
  Bare,
}

#[derive(Deserialize)]
struct Wrapped {
  questions: Vec<Question>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyShape {
  Wrapped(Wrapped),
  Bare(Vec<Question>),
}

pub fn decode(body: &[u8], envelope: Envelope) -> Result<Vec<Question>, serde_json::Error> {
  match envelope {
    Envelope::Wrapped => serde_json::from_slice::<Wrapped>(body).map(|w| w.questions),
    Envelope::Bare => serde_json::from_slice(body),
    Envelope::Auto => serde_json::from_slice::<AnyShape>(body).map(|shape| match shape {
      AnyShape::Wrapped(w) => w.questions,
      AnyShape::Bare(questions) => questions,
    }),
  }
}

#[derive(Debug, Clone)]
pub struct QuestionSource {
  client: reqwest::Client,
  url: String,
  envelope: Envelope,
}

impl QuestionSource {
  pub fn new(config: &SourceConfig) -> anyhow::Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(config.timeout())
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self::with_client(client, config.url.clone(), config.envelope))
  }

  pub fn with_client(client: reqwest::Client, url: String, envelope: Envelope) -> Self {
    Self {
      client,
      url,
      envelope,
    }
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  pub async fn fetch(&self) -> Result<Vec<Question>, FetchError> {
    let resp = self.client.get(&self.url).send().await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(FetchError::Status(status));
    }

    let body = resp.bytes().await?;
    let questions = decode(&body, self.envelope)?;
    if questions.is_empty() {
      return Err(FetchError::Empty);
    }

    tracing::debug!(url = %self.url, count = questions.len(), "questions fetched");
    Ok(questions)
  }
}
