//! Attendance session lifecycle.
//!
//! `SessionManager` ties the in-memory windows (`SessionStore`) to the
//! durable ledger. Per event the lifecycle is
//! `Inactive -> Active (start_session) -> Inactive (finalize)`, where
//! finalize happens either when the window's expiry task fires or when an
//! admin stops it early. Finalize removes the window atomically, so exactly
//! one caller writes the closing report no matter how the timer and explicit
//! stops interleave.
//!
//! Self-marks are only accepted while `now < expires_at`; admin marks are
//! accepted for any event at any time. Summaries always come from the ledger.
//!
//! Marks hold the read side of the closing gate from the liveness check
//! until the ledger write is done; closing a window holds the write side
//! across the removal and the report snapshot. An accepted self-mark is
//! therefore always in the report of the window that accepted it.

use crate::attendance::clock::{system_clock, Clock};
use crate::attendance::ledger::{self, UnknownStudent};
use crate::attendance::session::{SessionStore, StartResult};
use crate::config::MAX_SESSION_SECS;
use crate::db::Database;
use crate::error::AppError;
use crate::reports::{self, ReportArchive};
use chrono::{DateTime, Utc};
use common::model::attendance::{
    AttendanceRow, AttendanceStatus, AttendanceSummary, EventOverview, MarkActor,
};
use common::model::outcome::{
    ActiveSession, FinalizeOutcome, MarkOutcome, Rejection, SessionsOverview, StartOutcome,
};
use log::{debug, error, info};
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::AbortHandle;
use uuid::Uuid;

static EVENT_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9 _.:/\-]{1,64}$").expect("event id pattern is valid")
});

/// Trims and checks an event identifier.
pub fn validate_event_id(raw: &str) -> Result<String, Rejection> {
    let event_id = raw.trim();
    if event_id.is_empty() {
        return Err(Rejection::Validation("event id must not be empty".into()));
    }
    if !EVENT_ID_RE.is_match(event_id) {
        return Err(Rejection::Validation(format!(
            "event id '{}' must be at most 64 letters, digits, spaces or - _ . : /",
            event_id
        )));
    }
    Ok(event_id.to_string())
}

fn rejected(reason: Rejection) -> MarkOutcome {
    MarkOutcome::Rejected { reason }
}

#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    db: Database,
    store: SessionStore,
    reports: ReportArchive,
    clock: Arc<dyn Clock>,
    duration: chrono::Duration,
    closing: RwLock<()>,
    /// Windows closed since startup, by any path.
    finalized: AtomicU64,
}

impl SessionManager {
    pub fn new(db: Database, reports: ReportArchive, duration: Duration) -> Self {
        Self::with_clock(db, reports, duration, system_clock())
    }

    pub fn with_clock(
        db: Database,
        reports: ReportArchive,
        duration: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let longest = chrono::Duration::seconds(MAX_SESSION_SECS as i64);
        let duration = chrono::Duration::from_std(duration)
            .map(|d| d.min(longest))
            .unwrap_or(longest);
        Self {
            inner: Arc::new(Inner {
                db,
                store: SessionStore::new(),
                reports,
                clock,
                duration,
                closing: RwLock::new(()),
                finalized: AtomicU64::new(0),
            }),
        }
    }

    pub fn database(&self) -> &Database {
        &self.inner.db
    }

    fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    fn count_finalized(&self) {
        self.inner.finalized.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of windows closed since startup, whether by timer, stop or restart.
    pub fn finalized_count(&self) -> u64 {
        self.inner.finalized.load(Ordering::Relaxed)
    }

    /// Opens a collection window for `event_id`.
    ///
    /// A second start while the window is live changes nothing and reports
    /// `AlreadyActive`. A window that has expired but whose timer has not run
    /// yet is closed and replaced. Its report is written on a best-effort
    /// basis; a failed write is logged and does not fail the new window.
    pub async fn start_session(&self, event_id: &str) -> Result<StartOutcome, AppError> {
        let event_id = match validate_event_id(event_id) {
            Ok(id) => id,
            Err(reason) => return Ok(StartOutcome::Rejected { reason }),
        };

        let _closing = self.inner.closing.write().await;
        let now = self.now();
        let result = self
            .inner
            .store
            .start(&event_id, now, self.inner.duration, |token, expires_at| {
                self.spawn_expiry(event_id.clone(), token, expires_at)
            })
            .await;

        match result {
            StartResult::AlreadyActive { expires_at } => {
                debug!("session for {} already active until {}", event_id, expires_at);
                Ok(StartOutcome::AlreadyActive { expires_at })
            }
            StartResult::Started { expires_at, stale } => {
                if stale.is_some() {
                    info!("closing expired session for {} before restarting", event_id);
                    self.count_finalized();
                    if let Err(e) = self.write_report(&event_id).await {
                        error!("failed to write report for replaced session {}: {}", event_id, e);
                    }
                }
                info!("session for {} started, expires at {}", event_id, expires_at);
                Ok(StartOutcome::Started { expires_at })
            }
        }
    }

    fn spawn_expiry(&self, event_id: String, token: Uuid, expires_at: DateTime<Utc>) -> AbortHandle {
        let wait = (expires_at - self.now()).to_std().unwrap_or_default();
        let manager = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            if let Err(e) = manager.expire(&event_id, token).await {
                error!("failed to finalize expired session for {}: {}", event_id, e);
            }
        })
        .abort_handle()
    }

    /// Timer path: finalizes only the window the timer was created for.
    async fn expire(&self, event_id: &str, token: Uuid) -> Result<(), AppError> {
        let _closing = self.inner.closing.write().await;
        if self.inner.store.take_if_current(event_id, token).await.is_some() {
            self.count_finalized();
            self.write_report(event_id).await?;
            info!("session for {} expired and was finalized", event_id);
        }
        Ok(())
    }

    /// Records a mark and returns the ledger totals for the event.
    ///
    /// `MarkActor::Student` requires a live window; `MarkActor::Admin` does not.
    pub async fn mark(
        &self,
        event_id: &str,
        student_id: &str,
        status: &str,
        actor: MarkActor,
    ) -> Result<MarkOutcome, AppError> {
        let event_id = match validate_event_id(event_id) {
            Ok(id) => id,
            Err(reason) => return Ok(rejected(reason)),
        };
        let student_id = student_id.trim().to_string();
        if student_id.is_empty() {
            return Ok(rejected(Rejection::Validation(
                "student id must not be empty".into(),
            )));
        }
        let status: AttendanceStatus = match status.parse() {
            Ok(status) => status,
            Err(e) => return Ok(rejected(Rejection::Validation(e.to_string()))),
        };

        let _closing = self.inner.closing.read().await;
        if actor == MarkActor::Student && !self.inner.store.is_live(&event_id, self.now()).await {
            debug!("self-mark by {} rejected: no live session for {}", student_id, event_id);
            return Ok(rejected(Rejection::SessionNotActive(event_id)));
        }

        let (ev, sid) = (event_id.clone(), student_id.clone());
        let written = self
            .inner
            .db
            .run(move |conn| match ledger::upsert(conn, &sid, &ev, status, Some(actor))? {
                Ok(()) => Ok(Ok(ledger::aggregate(conn, &ev)?)),
                Err(unknown) => Ok(Err(unknown)),
            })
            .await?;

        match written {
            Ok(summary) => {
                self.inner
                    .store
                    .record_mark(&event_id, &student_id, status, self.now())
                    .await;
                debug!("{} marked {} for {} by {}", student_id, status, event_id, actor.as_str());
                Ok(MarkOutcome::Accepted { summary })
            }
            Err(UnknownStudent(id)) => Ok(rejected(Rejection::UnknownStudent(id))),
        }
    }

    /// Closes the window for `event_id` and writes its report.
    ///
    /// Idempotent: if nothing is open, returns the last report on disk, if any.
    pub async fn finalize_session(&self, event_id: &str) -> Result<FinalizeOutcome, AppError> {
        let event_id = event_id.trim();
        let _closing = self.inner.closing.write().await;
        match self.inner.store.take(event_id).await {
            Some(session) => {
                session.cancel_expiry();
                self.count_finalized();
                let report = self.write_report(event_id).await?;
                info!("session for {} finalized", event_id);
                Ok(FinalizeOutcome::Finalized { report })
            }
            None => {
                let archive = self.inner.reports.clone();
                let ev = event_id.to_string();
                let report = tokio::task::spawn_blocking(move || archive.read(&ev)).await??;
                Ok(FinalizeOutcome::AlreadyFinalized { report })
            }
        }
    }

    /// Admin "stop early". Same as `finalize_session`; the pending timer is cancelled.
    pub async fn stop_session(&self, event_id: &str) -> Result<FinalizeOutcome, AppError> {
        self.finalize_session(event_id).await
    }

    /// Snapshots the ledger for `event_id` into the report archive.
    async fn write_report(&self, event_id: &str) -> Result<Vec<u8>, AppError> {
        let archive = self.inner.reports.clone();
        let ev = event_id.to_string();
        self.inner
            .db
            .run(move |conn| {
                let rows = ledger::query_sorted(conn, &ev)?;
                let bytes = reports::csv::render_csv(&rows)?;
                let path = archive.write(&ev, &bytes)?;
                info!("wrote {} rows to {}", rows.len(), path.display());
                Ok(bytes)
            })
            .await
    }

    pub async fn get_summary(&self, event_id: &str) -> Result<AttendanceSummary, AppError> {
        let ev = event_id.trim().to_string();
        self.inner.db.run(move |conn| ledger::aggregate(conn, &ev)).await
    }

    /// Ledger rows for `event_id`, sorted by student name.
    pub async fn get_records(&self, event_id: &str) -> Result<Vec<AttendanceRow>, AppError> {
        let ev = event_id.trim().to_string();
        self.inner.db.run(move |conn| ledger::query_sorted(conn, &ev)).await
    }

    pub async fn events(&self) -> Result<Vec<EventOverview>, AppError> {
        self.inner.db.run(|conn| ledger::events(conn)).await
    }

    pub async fn active_sessions(&self) -> Vec<ActiveSession> {
        self.inner.store.active(self.now()).await
    }

    pub async fn overview(&self) -> SessionsOverview {
        SessionsOverview {
            active: self.active_sessions().await,
            finalized: self.finalized_count(),
        }
    }
}
