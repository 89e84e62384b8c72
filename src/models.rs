use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One multiple-choice record as served by the question source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub question: String,
  pub options: Vec<String>,
  /// Text of the correct option, compared verbatim.
  pub answer: String,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
  Correct,
  Wrong,
  #[default]
  Unanswered,
}

impl Outcome {
  pub const ALL: [Outcome; 3] = [Outcome::Correct, Outcome::Wrong, Outcome::Unanswered];

  pub fn label(self) -> &'static str {
    match self {
      Self::Correct => "Correct",
      Self::Wrong => "Wrong",
      Self::Unanswered => "Unanswered",
    }
  }

  /// Background class of a question block in the results detail panel.
  pub fn block_class(self) -> &'static str {
    match self {
      Self::Correct => "bg-blue",
      Self::Wrong => "bg-red",
      Self::Unanswered => "bg-yellow",
    }
  }
}

#[derive(Debug, Clone, Copy)]
pub enum InternalMsg {
  StateUpdated,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientAction {
  Select { question: usize, option: usize },
  Advance,
  Filter { outcome: Outcome },
}
