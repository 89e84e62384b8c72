//! Markup for the three screens.
//!
//! Question and option text comes from the remote source verbatim; askama
//! escapes it when the templates interpolate it.

use anyhow::{Context, Result};
use askama::Template;

use crate::{
  models::{Outcome, Question},
  quiz::{Navigator, Phase, QuizState},
  templates::{
    BlockView, CounterView, ErrorTemplate, LoadingTemplate, OptionView, QuestionTemplate,
    ResultsTemplate,
  },
};

/// Renders whatever the container should show right now.
///
/// `filter` picks the detail panel on the results screen.
pub fn screen(navigator: &Navigator, filter: Option<Outcome>) -> Result<String> {
  match navigator.phase() {
    Phase::AwaitingFetch => to_html(&LoadingTemplate),
    Phase::Failed => to_html(&ErrorTemplate),
    Phase::Question(index) => {
      let quiz = navigator.quiz().context("question phase without questions")?;
      to_html(&question_view(quiz, index, navigator))
    }
    Phase::Results => {
      let quiz = navigator.quiz().context("results phase without questions")?;
      to_html(&results_view(quiz, filter))
    }
  }
}

pub fn error_screen() -> Result<String> {
  to_html(&ErrorTemplate)
}

/// Renders any template, askama errors folded into `anyhow`.
pub fn to_html<T: Template>(template: &T) -> Result<String> {
  template
    .render()
    .map_err(|e| anyhow::anyhow!("Template error: {}", e))
}

fn question_view(quiz: &QuizState, index: usize, navigator: &Navigator) -> QuestionTemplate {
  let question = &quiz.questions()[index];
  let selected = quiz.answer(index);

  QuestionTemplate {
    timer: navigator.countdown().display(),
    index,
    number: index + 1,
    text: question.question.clone(),
    options: question
      .options
      .iter()
      .enumerate()
      .map(|(i, text)| OptionView {
        text: text.clone(),
        class: if selected == Some(i) { "selected" } else { "" },
      })
      .collect(),
    can_advance: navigator.can_advance(),
    advance_label: if index < quiz.last_index() {
      "Next"
    } else {
      "Submit Quiz"
    },
  }
}

fn results_view(quiz: &QuizState, filter: Option<Outcome>) -> ResultsTemplate {
  let partition = quiz.partition();

  let counters = Outcome::ALL
    .iter()
    .map(|&outcome| CounterView {
      id: outcome.to_string(),
      label: outcome.label(),
      count: partition.get(outcome).len(),
      active: filter == Some(outcome),
    })
    .collect();

  let blocks = filter
    .map(|outcome| {
      partition
        .get(outcome)
        .iter()
        .map(|&index| detail_block(&quiz.questions()[index], index, quiz.answer(index), outcome))
        .collect()
    })
    .unwrap_or_default();

  ResultsTemplate {
    counters,
    show_details: filter.is_some(),
    blocks,
  }
}

fn detail_block(
  question: &Question,
  index: usize,
  selected: Option<usize>,
  outcome: Outcome,
) -> BlockView {
  let options = question
    .options
    .iter()
    .enumerate()
    .map(|(i, text)| OptionView {
      text: text.clone(),
      class: if *text == question.answer {
        "correct"
      } else if selected == Some(i) {
        "submitted"
      } else {
        ""
      },
    })
    .collect();

  BlockView {
    number: index + 1,
    text: question.question.clone(),
    class: outcome.block_class(),
    options,
  }
}
