//! Quiz session lifecycle
//!
//! A session starts when the user begins a quiz and ends explicitly, when the
//! word pool is exhausted or after a period of inactivity. Each active
//! session owns exactly one pending expiry timer. Ending is a check-and-clear
//! of the `active` flag under the registry lock, so a timer firing while the
//! user answers can never record the same session twice.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::SessionConfig;
use crate::database::WordPoolStore;
use crate::models::CreateSessionRecordRequest;
use crate::quiz::Question;
use crate::utils::clock::Clock;
use crate::utils::errors::Result;
use crate::utils::logging::log_session_event;

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// User left the quiz or switched to another activity
    Manual,
    /// No unseen words remain
    Exhausted,
    /// Inactivity timer fired
    Timeout,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Manual => "manual",
            EndReason::Exhausted => "exhausted",
            EndReason::Timeout => "timeout",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a completed session, as persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub user_id: i64,
    pub started_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub learned_words: i64,
    pub reason: EndReason,
}

/// Delivers the inactivity notice to the user
#[async_trait]
pub trait ExpiryNotifier: Send + Sync {
    async fn session_expired(&self, summary: &SessionSummary);
}

/// Transient per-user session state
#[derive(Debug)]
struct SessionState {
    active: bool,
    generation: u64,
    start: DateTime<Utc>,
    timer: Option<CancellationToken>,
    timer_seq: u64,
    question: Option<Question>,
}

/// Identifies the timer allowed to expire a session
#[derive(Debug, Clone, Copy)]
struct TimerTicket {
    generation: u64,
    seq: u64,
}

struct Inner {
    store: Arc<dyn WordPoolStore>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn ExpiryNotifier>,
    timeout: Duration,
    count_buffer: chrono::Duration,
    sessions: Mutex<HashMap<i64, SessionState>>,
    counter: AtomicU64,
}

/// Registry of active quiz sessions keyed by user id
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(
        store: Arc<dyn WordPoolStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn ExpiryNotifier>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                clock,
                notifier,
                timeout: Duration::from_secs(config.timeout_seconds),
                count_buffer: chrono::Duration::milliseconds(config.count_buffer_ms as i64),
                sessions: Mutex::new(HashMap::new()),
                counter: AtomicU64::new(0),
            }),
        }
    }

    /// Start a session. Returns false when one is already active.
    pub fn start_session(&self, user_id: i64) -> bool {
        let mut sessions = self.inner.lock();
        if sessions.get(&user_id).map_or(false, |s| s.active) {
            debug!(user_id = user_id, "Session already active");
            return false;
        }

        let generation = self.inner.next_id();
        let seq = self.inner.next_id();
        let token = self.inner.arm_timer(user_id, TimerTicket { generation, seq });

        // A previous state may still be finishing its save; it is superseded here
        if let Some(previous) = sessions.insert(
            user_id,
            SessionState {
                active: true,
                generation,
                start: self.inner.clock.now(),
                timer: Some(token),
                timer_seq: seq,
                question: None,
            },
        ) {
            if let Some(timer) = previous.timer {
                timer.cancel();
            }
        }
        drop(sessions);

        log_session_event(user_id, "started", None, None);
        true
    }

    /// Push the inactivity deadline back to a full timeout from now
    pub fn refresh_timer(&self, user_id: i64) {
        let mut sessions = self.inner.lock();
        let Some(state) = sessions.get_mut(&user_id).filter(|s| s.active) else {
            return;
        };

        if let Some(old) = state.timer.take() {
            old.cancel();
        }
        let seq = self.inner.next_id();
        state.timer_seq = seq;
        state.timer = Some(self.inner.arm_timer(
            user_id,
            TimerTicket { generation: state.generation, seq },
        ));
        debug!(user_id = user_id, "Session timer refreshed");
    }

    /// End the session and persist its record. `Ok(None)` when no session was active.
    pub async fn end_session(&self, user_id: i64, reason: EndReason) -> Result<Option<SessionSummary>> {
        self.inner.end_session(user_id, reason, None).await
    }

    /// End the session as timed out and notify the user
    pub async fn expire_session(&self, user_id: i64) -> Result<Option<SessionSummary>> {
        let summary = self.inner.end_session(user_id, EndReason::Timeout, None).await?;
        if let Some(summary) = &summary {
            self.inner.notifier.session_expired(summary).await;
        }
        Ok(summary)
    }

    pub fn is_active(&self, user_id: i64) -> bool {
        self.inner.lock().get(&user_id).map_or(false, |s| s.active)
    }

    pub fn session_start(&self, user_id: i64) -> Option<DateTime<Utc>> {
        self.inner
            .lock()
            .get(&user_id)
            .filter(|s| s.active)
            .map(|s| s.start)
    }

    /// Remember the question currently on screen
    pub fn set_question(&self, user_id: i64, question: Question) {
        if let Some(state) = self.inner.lock().get_mut(&user_id).filter(|s| s.active) {
            state.question = Some(question);
        }
    }

    pub fn current_question(&self, user_id: i64) -> Option<Question> {
        self.inner
            .lock()
            .get(&user_id)
            .filter(|s| s.active)
            .and_then(|s| s.question.clone())
    }

    pub fn clear_question(&self, user_id: i64) {
        if let Some(state) = self.inner.lock().get_mut(&user_id) {
            state.question = None;
        }
    }

    /// Number of expiry timers that are armed and not cancelled
    pub fn pending_timers(&self) -> usize {
        self.inner
            .lock()
            .values()
            .filter(|s| s.timer.as_ref().map_or(false, |t| !t.is_cancelled()))
            .count()
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<i64, SessionState>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_id(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn arm_timer(self: &Arc<Self>, user_id: i64, ticket: TimerTicket) -> CancellationToken {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let inner = Arc::clone(self);
        let timeout = self.timeout;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    inner.on_timer_fired(user_id, ticket).await;
                }
            }
        });

        token
    }

    async fn on_timer_fired(self: &Arc<Self>, user_id: i64, ticket: TimerTicket) {
        match self.end_session(user_id, EndReason::Timeout, Some(ticket)).await {
            Ok(Some(summary)) => self.notifier.session_expired(&summary).await,
            Ok(None) => debug!(user_id = user_id, "Stale expiry timer ignored"),
            Err(e) => error!(user_id = user_id, error = %e, "Failed to expire session"),
        }
    }

    async fn end_session(
        self: &Arc<Self>,
        user_id: i64,
        reason: EndReason,
        ticket: Option<TimerTicket>,
    ) -> Result<Option<SessionSummary>> {
        let (start, generation) = {
            let mut sessions = self.lock();
            let Some(state) = sessions.get_mut(&user_id) else {
                return Ok(None);
            };
            if !state.active {
                return Ok(None);
            }
            if let Some(ticket) = ticket {
                if state.generation != ticket.generation || state.timer_seq != ticket.seq {
                    return Ok(None);
                }
            }

            state.active = false;
            if let Some(timer) = state.timer.take() {
                timer.cancel();
            }
            (state.start, state.generation)
        };

        let now = self.clock.now();
        let duration_secs = (now - start).num_seconds().max(0);

        match self.persist(user_id, start, now, duration_secs).await {
            Ok(learned_words) => {
                let mut sessions = self.lock();
                if sessions.get(&user_id).map_or(false, |s| s.generation == generation) {
                    sessions.remove(&user_id);
                }
                drop(sessions);

                log_session_event(user_id, reason.as_str(), Some(duration_secs), Some(learned_words));
                Ok(Some(SessionSummary {
                    user_id,
                    started_at: start,
                    duration_secs,
                    learned_words,
                    reason,
                }))
            }
            Err(e) => {
                let mut sessions = self.lock();
                if let Some(state) = sessions.get_mut(&user_id).filter(|s| s.generation == generation) {
                    state.active = true;
                    let seq = self.next_id();
                    state.timer_seq = seq;
                    state.timer = Some(self.arm_timer(user_id, TimerTicket { generation, seq }));
                }
                drop(sessions);

                warn!(user_id = user_id, reason = %reason, error = %e, "Session end failed, state restored");
                Err(e)
            }
        }
    }

    async fn persist(&self, user_id: i64, start: DateTime<Utc>, now: DateTime<Utc>, duration_secs: i64) -> Result<i64> {
        let learned_words = self
            .store
            .count_progress_in_range(user_id, start, now + self.count_buffer)
            .await?;

        self.store
            .append_session_record(CreateSessionRecordRequest {
                user_id,
                started_at: start,
                duration_secs,
                learned_words,
            })
            .await?;

        Ok(learned_words)
    }
}
