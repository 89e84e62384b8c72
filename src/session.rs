use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
  models::{ClientAction, InternalMsg, Outcome},
  quiz::{Event, Navigator, Phase},
  render,
  source::QuestionSource,
  state::AppState,
};

const TICK_INTERVAL: Duration = Duration::from_millis(200);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// One page load worth of quiz.
pub struct Session {
  pub id: Uuid,
  pub tx: broadcast::Sender<InternalMsg>,
  navigator: Navigator,
  filter: Option<Outcome>,
  sockets: usize,
  idle_since: Instant,
}

impl Session {
  /// Fetches the questions and builds the session around the result.
  pub async fn open(source: &QuestionSource) -> Self {
    let event = match source.fetch().await {
      Ok(questions) => {
        tracing::info!(count = questions.len(), "quiz loaded");
        Event::Loaded(questions)
      }
      Err(e) => {
        tracing::warn!(url = source.url(), "could not load quiz questions: {e}");
        Event::FetchFailed
      }
    };

    let now = Instant::now();
    let mut navigator = Navigator::new();
    navigator.handle(event, now);
    Self::with_navigator(navigator, now)
  }

  pub fn with_navigator(navigator: Navigator, now: Instant) -> Self {
    let (tx, _) = broadcast::channel(32);
    Self {
      id: Uuid::now_v7(),
      tx,
      navigator,
      filter: None,
      sockets: 0,
      idle_since: now,
    }
  }

  #[cfg(test)]
  pub fn navigator(&self) -> &Navigator {
    &self.navigator
  }

  pub fn is_failed(&self) -> bool {
    self.navigator.phase() == Phase::Failed
  }

  pub fn handle(&mut self, action: ClientAction, now: Instant) {
    let before = self.navigator.phase();
    let changed = match action {
      ClientAction::Select { question, option } => self
        .navigator
        .handle(Event::Select { question, option }, now),
      ClientAction::Advance => self.navigator.handle(Event::Advance, now),
      ClientAction::Filter { outcome } => self.show_details(outcome),
    };

    if changed {
      self.log_transition(before, "click");
      self.publish();
    }
  }

  pub fn tick(&mut self, now: Instant) {
    let before = self.navigator.phase();
    if self.navigator.tick(now) {
      self.log_transition(before, "countdown");
      self.publish();
    }
  }

  /// Markup for the container in the current state.
  pub fn screen(&self) -> anyhow::Result<String> {
    render::screen(&self.navigator, self.filter)
  }

  pub fn attach(&mut self) -> broadcast::Receiver<InternalMsg> {
    self.sockets += 1;
    self.tx.subscribe()
  }

  pub fn detach(&mut self, now: Instant) {
    self.sockets = self.sockets.saturating_sub(1);
    if self.sockets == 0 {
      self.idle_since = now;
    }
  }

  pub fn is_abandoned(&self, now: Instant) -> bool {
    self.sockets == 0 && now.duration_since(self.idle_since) > IDLE_TIMEOUT
  }

  fn show_details(&mut self, outcome: Outcome) -> bool {
    if self.navigator.phase() != Phase::Results || self.filter == Some(outcome) {
      return false;
    }
    self.filter = Some(outcome);
    true
  }

  fn log_transition(&self, before: Phase, cause: &str) {
    let after = self.navigator.phase();
    if before == after {
      return;
    }
    let Some(quiz) = self.navigator.quiz() else {
      return;
    };
    match self.navigator.current_question() {
      Some(question) => tracing::debug!(session = %self.id, question, cause, "next question"),
      None if after == Phase::Results => tracing::info!(
        session = %self.id,
        score = quiz.score(),
        total = quiz.len(),
        cause,
        "quiz finished"
      ),
      None => {}
    }
  }

  fn publish(&self) {
    let _ = self.tx.send(InternalMsg::StateUpdated);
  }
}

/// Drives every live countdown and drops sessions nobody is watching.
pub async fn tick_loop(state: Arc<AppState>) {
  let mut interval = tokio::time::interval(TICK_INTERVAL);
  interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
  loop {
    interval.tick().await;
    tick_all(&state, Instant::now()).await;
  }
}

/// One pass of the ticker over every registered session.
pub async fn tick_all(state: &AppState, now: Instant) {
  let sessions: Vec<_> = state
    .sessions
    .iter()
    .map(|entry| (*entry.key(), entry.value().clone()))
    .collect();

  for (id, session) in sessions {
    let abandoned = {
      let mut s = session.write().await;
      s.tick(now);
      s.is_abandoned(now)
    };
    // Re-checked under the map entry so a socket attaching meanwhile keeps it.
    if abandoned
      && state
        .sessions
        .remove_if(&id, |_, s| s.try_read().is_ok_and(|s| s.is_abandoned(now)))
        .is_some()
    {
      tracing::info!(session = %id, "session reaped");
    }
  }
}
