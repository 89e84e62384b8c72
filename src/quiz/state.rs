use crate::models::{Outcome, Question};

/// Questions of one session plus the per-question selection and outcome.
///
/// `answers` and `outcomes` always have the same length as `questions`, and
/// `outcomes[i]` is derived from `answers[i]` every time a selection lands.
#[derive(Debug, Clone)]
pub struct QuizState {
  questions: Vec<Question>,
  answers: Vec<Option<usize>>,
  outcomes: Vec<Outcome>,
}

/// Question indices split by final outcome, each list in quiz order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
  pub correct: Vec<usize>,
  pub wrong: Vec<usize>,
  pub unanswered: Vec<usize>,
}

impl Partition {
  pub fn get(&self, outcome: Outcome) -> &[usize] {
    match outcome {
      Outcome::Correct => &self.correct,
      Outcome::Wrong => &self.wrong,
      Outcome::Unanswered => &self.unanswered,
    }
  }
}

impl QuizState {
  pub fn new(questions: Vec<Question>) -> Self {
    let len = questions.len();
    Self {
      questions,
      answers: vec![None; len],
      outcomes: vec![Outcome::Unanswered; len],
    }
  }

  pub fn questions(&self) -> &[Question] {
    &self.questions
  }

  pub fn len(&self) -> usize {
    self.questions.len()
  }

  pub fn last_index(&self) -> usize {
    self.questions.len().saturating_sub(1)
  }

  pub fn answer(&self, index: usize) -> Option<usize> {
    self.answers.get(index).copied().flatten()
  }

  pub fn outcome(&self, index: usize) -> Outcome {
    self.outcomes.get(index).copied().unwrap_or_default()
  }

  pub fn outcomes(&self) -> &[Outcome] {
    &self.outcomes
  }

  pub fn is_answered(&self, index: usize) -> bool {
    self.answer(index).is_some()
  }

  /// Records `option` as the choice for `question` and rescores it.
  ///
  /// Returns false without touching anything when either index does not
  /// exist.
  pub fn select_option(&mut self, question: usize, option: usize) -> bool {
    let Some(record) = self.questions.get(question) else {
      return false;
    };
    let Some(text) = record.options.get(option) else {
      return false;
    };

    self.outcomes[question] = if *text == record.answer {
      Outcome::Correct
    } else {
      Outcome::Wrong
    };
    self.answers[question] = Some(option);
    true
  }

  /// Countdown ran out on `question`: only an empty selection becomes
  /// Unanswered, an existing choice keeps its score.
  pub fn expire(&mut self, question: usize) {
    if question < self.len() && self.answers[question].is_none() {
      self.outcomes[question] = Outcome::Unanswered;
    }
  }

  pub fn partition(&self) -> Partition {
    let mut partition = Partition::default();
    for (index, outcome) in self.outcomes.iter().enumerate() {
      match outcome {
        Outcome::Correct => partition.correct.push(index),
        Outcome::Wrong => partition.wrong.push(index),
        Outcome::Unanswered => partition.unanswered.push(index),
      }
    }
    partition
  }

  pub fn count(&self, outcome: Outcome) -> usize {
    self.outcomes.iter().filter(|o| **o == outcome).count()
  }

  pub fn score(&self) -> usize {
    self.count(Outcome::Correct)
  }
}
