//! Shared state of long-running background jobs.
//!
//! Jobs (currently the student CSV import) run outside the request/response
//! cycle. The request that starts a job registers it as `Pending` and returns
//! its id; the worker pushes `JobUpdate` messages into an MPSC channel, and
//! `start_job_updater` folds them into the shared map that
//! `GET /api/jobs/{job_id}` reads.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// Clonable handle to the job map and the update channel.
#[derive(Clone)]
pub struct JobsState {
    /// Job id → latest known status.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Workers send progress here instead of locking `jobs` themselves.
    pub tx: mpsc::Sender<JobUpdate>,
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobsState {
    /// Creates the state and spawns its updater task on the current runtime.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel(100);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        let updater_state = state.clone();
        tokio::spawn(async move {
            start_job_updater(updater_state, rx).await;
        });
        state
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }
}

/// Applies queued updates to the job map until every sender is dropped.
///
/// Progress messages can arrive after the worker already stored its final
/// status; a finished job is never moved back to `InProgress`.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        if jobs.get(&update.job_id).is_some_and(JobStatus::is_finished) {
            continue;
        }
        jobs.insert(update.job_id, update.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn late_progress_does_not_reopen_finished_job() {
        let state = JobsState::spawn();
        state
            .jobs
            .write()
            .await
            .insert("job".into(), JobStatus::Completed("done".into()));

        state
            .tx
            .send(JobUpdate {
                job_id: "job".into(),
                status: JobStatus::InProgress(3),
            })
            .await
            .unwrap();
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(
            state.status("job").await,
            Some(JobStatus::Completed("done".into()))
        );
    }
}
