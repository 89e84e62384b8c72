use std::time::Instant;

use super::state::QuizState;
use super::timer::{Countdown, Tick};
use crate::models::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  AwaitingFetch,
  Question(usize),
  Results,
  /// Questions could not be loaded. Only a new session leaves this phase.
  Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
  Loaded(Vec<Question>),
  FetchFailed,
  Select { question: usize, option: usize },
  Advance,
  Expire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
  Restart,
  Stop,
}

/// Where the quiz goes when question `index` is left, by click or by timeout.
pub fn leave_question(index: usize, last: usize) -> (Phase, TimerCommand) {
  if index < last {
    (Phase::Question(index + 1), TimerCommand::Restart)
  } else {
    (Phase::Results, TimerCommand::Stop)
  }
}

/// Quiz state machine: the phase, the answers and the one countdown.
#[derive(Debug, Clone)]
pub struct Navigator {
  phase: Phase,
  quiz: Option<QuizState>,
  countdown: Countdown,
}

impl Default for Navigator {
  fn default() -> Self {
    Self::new()
  }
}

impl Navigator {
  pub fn new() -> Self {
    Self {
      phase: Phase::AwaitingFetch,
      quiz: None,
      countdown: Countdown::Idle,
    }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  /// `None` until questions were loaded.
  pub fn quiz(&self) -> Option<&QuizState> {
    self.quiz.as_ref()
  }

  /// Index of the displayed question, if one is displayed.
  pub fn current_question(&self) -> Option<usize> {
    match self.phase {
      Phase::Question(index) => Some(index),
      _ => None,
    }
  }

  pub fn countdown(&self) -> &Countdown {
    &self.countdown
  }

  /// Whether the Next/Submit control is enabled for the displayed question.
  pub fn can_advance(&self) -> bool {
    match (self.phase, &self.quiz) {
      (Phase::Question(index), Some(quiz)) => quiz.is_answered(index),
      _ => false,
    }
  }

  /// Applies one event. Returns true when anything visible changed.
  pub fn handle(&mut self, event: Event, now: Instant) -> bool {
    match (self.phase, event) {
      (Phase::AwaitingFetch, Event::Loaded(questions)) => {
        if questions.is_empty() {
          self.phase = Phase::Failed;
          return true;
        }
        self.quiz = Some(QuizState::new(questions));
        self.enter(Phase::Question(0), TimerCommand::Restart, now);
        true
      }
      (Phase::AwaitingFetch, Event::FetchFailed) => {
        self.phase = Phase::Failed;
        true
      }
      (Phase::Question(index), Event::Select { question, option }) if question == index => self
        .quiz
        .as_mut()
        .is_some_and(|quiz| quiz.select_option(question, option)),
      (Phase::Question(index), Event::Advance) => {
        if !self.can_advance() {
          return false;
        }
        self.leave(index, now);
        true
      }
      (Phase::Question(index), Event::Expire) => {
        if let Some(quiz) = self.quiz.as_mut() {
          quiz.expire(index);
        }
        self.leave(index, now);
        true
      }
      (phase, event) => {
        tracing::debug!(?phase, ?event, "event ignored");
        false
      }
    }
  }

  /// Samples the countdown; an expiry is turned into [`Event::Expire`].
  pub fn tick(&mut self, now: Instant) -> bool {
    match self.countdown.tick(now) {
      Tick::Inactive | Tick::Unchanged => false,
      Tick::Counted(remaining) => {
        tracing::trace!(remaining, "countdown");
        true
      }
      Tick::Expired => self.handle(Event::Expire, now),
    }
  }

  fn leave(&mut self, index: usize, now: Instant) {
    if let Some(quiz) = self.quiz.as_ref() {
      tracing::debug!(question = index, outcome = %quiz.outcome(index), "question left");
    }
    let last = self.quiz.as_ref().map_or(0, QuizState::last_index);
    let (phase, command) = leave_question(index, last);
    self.enter(phase, command, now);
  }

  fn enter(&mut self, phase: Phase, command: TimerCommand, now: Instant) {
    self.phase = phase;
    match command {
      TimerCommand::Restart => self.countdown.reset(now),
      TimerCommand::Stop => self.countdown.stop(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Outcome;
  use crate::quiz::state::tests::abcd;
  use crate::quiz::timer::COUNTDOWN_SECS;
  use pretty_assertions::assert_eq;
  use std::time::Duration;

  fn loaded(n: usize, now: Instant) -> Navigator {
    let mut nav = Navigator::new();
    assert!(nav.handle(Event::Loaded(abcd(n)), now));
    nav
  }

  fn select(nav: &mut Navigator, question: usize, option: usize, now: Instant) -> bool {
    nav.handle(Event::Select { question, option }, now)
  }

  /// Ticks once per second until the countdown stops running.
  fn run_out(nav: &mut Navigator, from: Instant) -> Instant {
    let mut now = from;
    for _ in 0..COUNTDOWN_SECS {
      now += Duration::from_secs(1);
      nav.tick(now);
    }
    now
  }

  #[test]
  fn loading_starts_the_first_question() {
    let t0 = Instant::now();
    let nav = loaded(3, t0);
    assert_eq!(nav.phase(), Phase::Question(0));
    assert!(nav.countdown().is_running());
    assert!(!nav.can_advance());
  }

  #[test]
  fn fetch_failure_builds_no_state() {
    let mut nav = Navigator::new();
    assert!(nav.handle(Event::FetchFailed, Instant::now()));
    assert_eq!(nav.phase(), Phase::Failed);
    assert!(nav.quiz().is_none());
    assert!(!nav.countdown().is_running());
  }

  #[test]
  fn empty_question_list_fails() {
    let mut nav = Navigator::new();
    nav.handle(Event::Loaded(Vec::new()), Instant::now());
    assert_eq!(nav.phase(), Phase::Failed);
    assert!(nav.quiz().is_none());
  }

  #[test]
  fn advance_requires_a_selection() {
    let t0 = Instant::now();
    let mut nav = loaded(2, t0);
    assert!(!nav.handle(Event::Advance, t0));
    assert_eq!(nav.phase(), Phase::Question(0));

    assert!(select(&mut nav, 0, 2, t0));
    assert!(nav.can_advance());
    assert!(nav.handle(Event::Advance, t0));
    assert_eq!(nav.phase(), Phase::Question(1));
    assert!(!nav.can_advance());
  }

  #[test]
  fn current_question_follows_the_phase() {
    let t0 = Instant::now();
    let mut nav = Navigator::new();
    assert_eq!(nav.current_question(), None);

    nav.handle(Event::Loaded(abcd(2)), t0);
    assert_eq!(nav.current_question(), Some(0));

    let t1 = run_out(&mut nav, t0);
    assert_eq!(nav.current_question(), Some(1));

    run_out(&mut nav, t1);
    assert_eq!(nav.phase(), Phase::Results);
    assert_eq!(nav.current_question(), None);
  }

  #[test]
  fn selection_for_another_question_is_ignored() {
    let t0 = Instant::now();
    let mut nav = loaded(2, t0);
    assert!(!select(&mut nav, 1, 1, t0));
    assert_eq!(nav.quiz().unwrap().answer(1), None);
  }

  #[test]
  fn manual_advance_restarts_the_countdown() {
    let t0 = Instant::now();
    let mut nav = loaded(2, t0);
    nav.tick(t0 + Duration::from_secs(7));
    select(&mut nav, 0, 1, t0);

    let t1 = t0 + Duration::from_millis(7_200);
    nav.handle(Event::Advance, t1);
    assert_eq!(nav.countdown().remaining(), COUNTDOWN_SECS);

    // The first question's run would have expired here.
    nav.tick(t0 + Duration::from_secs(10));
    assert_eq!(nav.phase(), Phase::Question(1));
  }

  #[test]
  fn submitting_the_last_question_shows_results() {
    let t0 = Instant::now();
    let mut nav = loaded(1, t0);
    select(&mut nav, 0, 1, t0);
    nav.handle(Event::Advance, t0);

    assert_eq!(nav.phase(), Phase::Results);
    assert!(!nav.countdown().is_running());
    assert!(!nav.tick(t0 + Duration::from_secs(60)));
  }

  #[test]
  fn timeout_auto_advances_and_keeps_a_recorded_choice() {
    let t0 = Instant::now();
    let mut nav = loaded(2, t0);
    select(&mut nav, 0, 3, t0);

    let t1 = run_out(&mut nav, t0);
    assert_eq!(nav.phase(), Phase::Question(1));
    assert_eq!(nav.quiz().unwrap().outcome(0), Outcome::Wrong);
    assert!(!nav.can_advance());

    run_out(&mut nav, t1);
    assert_eq!(nav.phase(), Phase::Results);
    assert_eq!(nav.quiz().unwrap().outcome(1), Outcome::Unanswered);
  }

  #[test]
  fn one_timeout_moves_exactly_one_question() {
    let t0 = Instant::now();
    let mut nav = loaded(3, t0);
    // A single very late sample must not skip two questions.
    nav.tick(t0 + Duration::from_secs(25));
    assert_eq!(nav.phase(), Phase::Question(1));
  }

  #[test]
  fn three_question_walkthrough() {
    let t0 = Instant::now();
    let mut nav = loaded(3, t0);

    select(&mut nav, 0, 1, t0);
    nav.handle(Event::Advance, t0 + Duration::from_secs(2));

    let t1 = run_out(&mut nav, t0 + Duration::from_secs(2));
    assert_eq!(nav.phase(), Phase::Question(2));

    select(&mut nav, 2, 2, t1);
    nav.handle(Event::Advance, t1);
    assert_eq!(nav.phase(), Phase::Results);

    let quiz = nav.quiz().unwrap();
    assert_eq!(
      quiz.outcomes(),
      &[Outcome::Correct, Outcome::Unanswered, Outcome::Wrong]
    );
    for outcome in Outcome::ALL {
      assert_eq!(quiz.count(outcome), 1);
    }
  }

  #[test]
  fn reselecting_overwrites_before_advance() {
    let t0 = Instant::now();
    let mut nav = loaded(1, t0);
    select(&mut nav, 0, 1, t0);
    select(&mut nav, 0, 0, t0);
    nav.handle(Event::Advance, t0);

    let quiz = nav.quiz().unwrap();
    assert_eq!(quiz.answer(0), Some(0));
    assert_eq!(quiz.outcome(0), Outcome::Wrong);
  }

  #[test]
  fn results_ignore_quiz_events() {
    let t0 = Instant::now();
    let mut nav = loaded(1, t0);
    select(&mut nav, 0, 1, t0);
    nav.handle(Event::Advance, t0);

    assert!(!select(&mut nav, 0, 0, t0));
    assert!(!nav.handle(Event::Expire, t0));
    assert!(!nav.handle(Event::Loaded(abcd(2)), t0));
    assert_eq!(nav.quiz().unwrap().outcome(0), Outcome::Correct);
  }

  #[test]
  fn leaving_the_last_question_stops_the_timer() {
    assert_eq!(
      leave_question(0, 2),
      (Phase::Question(1), TimerCommand::Restart)
    );
    assert_eq!(leave_question(2, 2), (Phase::Results, TimerCommand::Stop));
  }
}
