// src/quiz/registry.rs

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    config::DEFAULT_SESSION_IDLE_SECS,
    error::AppError,
    models::{question::QuizQuestion, session::SessionView},
    quiz::session::QuizSession,
};

/// Identity of an outstanding quiz-generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub session_id: Uuid,
    epoch: u64,
}

/// A session plus the bookkeeping needed to drop stale gateway results.
#[derive(Debug)]
pub struct Slot {
    pub session: QuizSession,
    pub document: Option<String>,
    pub created_at: DateTime<Utc>,
    touched_at: DateTime<Utc>,
    epoch: u64,
}

impl Slot {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            session: QuizSession::new(),
            document: None,
            created_at: now,
            touched_at: now,
            epoch: 0,
        }
    }

    pub fn view(&self, id: Uuid) -> SessionView {
        SessionView::new(id, &self.session, self.document.as_deref(), self.created_at)
    }

    /// Identifies the slot's current state without superseding anything.
    pub fn ticket(&self, id: Uuid) -> Ticket {
        Ticket {
            session_id: id,
            epoch: self.epoch,
        }
    }

    fn idle_longer_than(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        (now - self.touched_at).to_std().is_ok_and(|idle| idle > ttl)
    }
}

/// All live quiz sessions, keyed by id.
///
/// The lock is only held for in-memory updates, never across a gateway call.
/// Sessions untouched for longer than the idle TTL are evicted whenever a new
/// one is created.
#[derive(Debug)]
pub struct SessionRegistry {
    slots: Mutex<HashMap<Uuid, Slot>>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_ttl(Duration::from_secs(DEFAULT_SESSION_IDLE_SECS))
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    pub async fn create(&self) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut slots = self.slots.lock().await;
        evict_idle(&mut slots, self.idle_ttl, now);
        slots.insert(id, Slot::new(now));
        tracing::debug!(session_id = %id, live = slots.len(), "Quiz session created");
        id
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.slots
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    /// Drops sessions idle for longer than the TTL as of `now`.
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        evict_idle(&mut *self.slots.lock().await, self.idle_ttl, now)
    }

    /// Runs `f` against one session while holding the lock.
    pub async fn with_slot<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Slot) -> R,
    ) -> Result<R, AppError> {
        let mut slots = self.slots.lock().await;
        let slot = slots.get_mut(&id).ok_or_else(|| not_found(id))?;
        slot.touched_at = Utc::now();
        Ok(f(slot))
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView, AppError> {
        self.with_slot(id, |slot| slot.view(id)).await
    }

    /// Starts a new generation request, superseding any outstanding one.
    pub async fn issue(&self, id: Uuid) -> Result<Ticket, AppError> {
        self.with_slot(id, |slot| {
            slot.epoch += 1;
            Ticket {
                session_id: id,
                epoch: slot.epoch,
            }
        })
        .await
    }

    /// Installs a generated question set if `ticket` is still current.
    /// Stale results are dropped and reported as a conflict.
    pub async fn install(
        &self,
        ticket: Ticket,
        questions: Vec<QuizQuestion>,
        document: Option<String>,
    ) -> Result<SessionView, AppError> {
        let mut slots = self.slots.lock().await;
        let slot = slots
            .get_mut(&ticket.session_id)
            .ok_or_else(|| not_found(ticket.session_id))?;

        if slot.epoch != ticket.epoch {
            tracing::info!(
                session_id = %ticket.session_id,
                ticket_epoch = ticket.epoch,
                current_epoch = slot.epoch,
                "Dropping stale quiz generation result"
            );
            return Err(AppError::Conflict(
                "This quiz request was superseded.".to_string(),
            ));
        }

        slot.session.start(questions)?;
        slot.document = document;
        Ok(slot.view(ticket.session_id))
    }

    /// Undoes a completion recorded under `ticket`, returning the attempt to its
    /// last question. Does nothing if the session was reset or restarted since.
    pub async fn reopen(&self, ticket: Ticket) -> Result<bool, AppError> {
        self.with_slot(ticket.session_id, |slot| {
            slot.epoch == ticket.epoch && slot.session.reopen()
        })
        .await
    }

    /// Returns the session to idle and invalidates any outstanding request.
    pub async fn reset(&self, id: Uuid) -> Result<SessionView, AppError> {
        self.with_slot(id, |slot| {
            slot.epoch += 1;
            slot.session.reset();
            slot.document = None;
            slot.view(id)
        })
        .await
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }
}

fn evict_idle(slots: &mut HashMap<Uuid, Slot>, ttl: Duration, now: DateTime<Utc>) -> usize {
    let before = slots.len();
    slots.retain(|_, slot| !slot.idle_longer_than(ttl, now));
    let evicted = before - slots.len();
    if evicted > 0 {
        tracing::info!(evicted, "Evicted idle quiz sessions");
    }
    evicted
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Quiz session {} not found", id))
}
