//! In-memory attendance windows.
//!
//! `SessionStore` is the only owner of live sessions. Each method takes the
//! store's lock once, so start, mark and finalize are atomic with respect to
//! each other for a given event.

use chrono::{DateTime, Duration, Utc};
use common::model::attendance::{AttendanceStatus, AttendanceSummary};
use common::model::outcome::ActiveSession;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::AbortHandle;
use uuid::Uuid;

#[derive(Debug)]
pub struct AttendanceSession {
    /// Distinguishes this window from earlier ones for the same event.
    pub token: Uuid,
    pub event_id: String,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Marks received while the window was open, by student id.
    pub marks: HashMap<String, AttendanceStatus>,
    expiry_task: Option<AbortHandle>,
}

impl AttendanceSession {
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Stops the pending expiry timer, if any.
    pub fn cancel_expiry(&self) {
        if let Some(handle) = &self.expiry_task {
            handle.abort();
        }
    }

    pub fn transient_summary(&self) -> AttendanceSummary {
        let present = self
            .marks
            .values()
            .filter(|s| **s == AttendanceStatus::Present)
            .count() as u32;
        let total = self.marks.len() as u32;
        AttendanceSummary {
            total,
            present,
            absent: total - present,
        }
    }
}

#[derive(Debug)]
pub enum StartResult {
    Started {
        expires_at: DateTime<Utc>,
        /// An expired window that was still waiting for its timer and got replaced.
        stale: Option<AttendanceSession>,
    },
    AlreadyActive {
        expires_at: DateTime<Utc>,
    },
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, AttendanceSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a window for `event_id` unless a live one exists.
    ///
    /// `schedule` is called with the new session's token and expiry while the
    /// lock is held and must return the handle of the expiry task.
    pub async fn start<F>(
        &self,
        event_id: &str,
        now: DateTime<Utc>,
        duration: Duration,
        schedule: F,
    ) -> StartResult
    where
        F: FnOnce(Uuid, DateTime<Utc>) -> AbortHandle,
    {
        let mut sessions = self.sessions.write().await;

        if let Some(existing) = sessions.get(event_id) {
            if existing.is_live_at(now) {
                return StartResult::AlreadyActive {
                    expires_at: existing.expires_at,
                };
            }
        }
        let stale = sessions.remove(event_id);
        if let Some(old) = &stale {
            old.cancel_expiry();
        }

        let token = Uuid::new_v4();
        let expires_at = now + duration;
        let handle = schedule(token, expires_at);
        sessions.insert(
            event_id.to_string(),
            AttendanceSession {
                token,
                event_id: event_id.to_string(),
                started_at: now,
                expires_at,
                marks: HashMap::new(),
                expiry_task: Some(handle),
            },
        );
        StartResult::Started { expires_at, stale }
    }

    pub async fn is_live(&self, event_id: &str, now: DateTime<Utc>) -> bool {
        self.sessions
            .read()
            .await
            .get(event_id)
            .is_some_and(|s| s.is_live_at(now))
    }

    /// Notes a mark in the live window for `event_id`. Returns `false` when
    /// there is no live window.
    pub async fn record_mark(
        &self,
        event_id: &str,
        student_id: &str,
        status: AttendanceStatus,
        now: DateTime<Utc>,
    ) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(event_id) {
            Some(session) if session.is_live_at(now) => {
                session.marks.insert(student_id.to_string(), status);
                true
            }
            _ => false,
        }
    }

    /// Atomically removes the window for `event_id`. Only one caller ever gets it.
    pub async fn take(&self, event_id: &str) -> Option<AttendanceSession> {
        self.sessions.write().await.remove(event_id)
    }

    /// Removes the window only if it is still the one identified by `token`.
    pub async fn take_if_current(&self, event_id: &str, token: Uuid) -> Option<AttendanceSession> {
        let mut sessions = self.sessions.write().await;
        if sessions.get(event_id).is_some_and(|s| s.token == token) {
            sessions.remove(event_id)
        } else {
            None
        }
    }

    /// Live windows, soonest expiry first.
    pub async fn active(&self, now: DateTime<Utc>) -> Vec<ActiveSession> {
        let sessions = self.sessions.read().await;
        let mut active: Vec<ActiveSession> = sessions
            .values()
            .filter(|s| s.is_live_at(now))
            .map(|s| ActiveSession {
                event_id: s.event_id.clone(),
                started_at: s.started_at,
                expires_at: s.expires_at,
                live: s.transient_summary(),
            })
            .collect();
        active.sort_by(|a, b| a.expires_at.cmp(&b.expires_at).then_with(|| a.event_id.cmp(&b.event_id)));
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn idle_task() -> AbortHandle {
        tokio::spawn(std::future::pending::<()>()).abort_handle()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn second_start_reports_existing_window() {
        let store = SessionStore::new();
        let first = store.start("e", t0(), Duration::minutes(3), |_, _| idle_task()).await;
        let second = store
            .start("e", t0() + Duration::seconds(10), Duration::minutes(3), |_, _| {
                panic!("must not schedule a second timer")
            })
            .await;

        let expires_at = match first {
            StartResult::Started { expires_at, stale: None } => expires_at,
            other => panic!("expected a fresh start, got {:?}", other),
        };
        assert!(matches!(second, StartResult::AlreadyActive { expires_at: e } if e == expires_at));
    }

    #[tokio::test]
    async fn expired_window_is_replaced_on_start() {
        let store = SessionStore::new();
        store.start("e", t0(), Duration::minutes(3), |_, _| idle_task()).await;

        let later = t0() + Duration::minutes(3);
        let result = store.start("e", later, Duration::minutes(3), |_, _| idle_task()).await;

        match result {
            StartResult::Started { expires_at, stale: Some(old) } => {
                assert_eq!(old.expires_at, later);
                assert_eq!(expires_at, later + Duration::minutes(3));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn take_if_current_ignores_other_tokens() {
        let store = SessionStore::new();
        let mut token = None;
        store
            .start("e", t0(), Duration::minutes(3), |t, _| {
                token = Some(t);
                idle_task()
            })
            .await;

        assert!(store.take_if_current("e", Uuid::new_v4()).await.is_none());
        assert!(store.take_if_current("e", token.unwrap()).await.is_some());
        assert!(store.take("e").await.is_none());
    }

    #[tokio::test]
    async fn marks_only_land_in_live_windows() {
        let store = SessionStore::new();
        store.start("e", t0(), Duration::minutes(3), |_, _| idle_task()).await;

        assert!(store.record_mark("e", "A", AttendanceStatus::Present, t0()).await);
        assert!(store.record_mark("e", "B", AttendanceStatus::Absent, t0()).await);
        assert!(!store
            .record_mark("e", "C", AttendanceStatus::Present, t0() + Duration::minutes(3))
            .await);
        assert!(!store.record_mark("other", "A", AttendanceStatus::Present, t0()).await);

        assert_eq!(
            store.active(t0()).await[0].live,
            AttendanceSummary {
                total: 2,
                present: 1,
                absent: 1
            }
        );
        assert!(store.active(t0() + Duration::minutes(5)).await.is_empty());
    }
}
