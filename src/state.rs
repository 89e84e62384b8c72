use crate::session::Session;
use crate::source::QuestionSource;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct AppState {
  pub sessions: DashMap<Uuid, Arc<RwLock<Session>>>,
  pub source: QuestionSource,
}

impl AppState {
  pub fn new(source: QuestionSource) -> Self {
    Self {
      sessions: DashMap::new(),
      source,
    }
  }

  pub fn session(&self, id: &Uuid) -> Option<Arc<RwLock<Session>>> {
    self.sessions.get(id).map(|entry| entry.value().clone())
  }
}
