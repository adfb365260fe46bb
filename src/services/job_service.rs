use crate::models::job::{JobEvent, JobState, JobStatus};
use anyhow::Result;
use chrono::Utc;
use log::info;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex, RwLock};

/// Owns the job lifecycle and the progress channel behind the SSE
/// stream. At most one job runs at a time; `begin` enforces the
/// single-flight guard through its state transition.
pub struct JobService {
    state: RwLock<Option<JobState>>,
    sender: UnboundedSender<JobEvent>,
    receiver: Mutex<UnboundedReceiver<JobEvent>>,
}

impl JobService {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            state: RwLock::new(None),
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Transitions into `running`, rejecting the request while another
    /// job is in flight.
    pub async fn begin(&self, keyword: &str, platforms: &[String]) -> Result<JobState> {
        let mut state = self.state.write().await;
        if matches!(state.as_ref(), Some(job) if job.status == JobStatus::Running) {
            return Err(anyhow::anyhow!("A job is already running"));
        }

        let job = JobState {
            status: JobStatus::Running,
            keyword: keyword.to_string(),
            platforms: platforms.to_vec(),
            started_at: Utc::now().to_rfc3339(),
            exit_code: None,
            error: None,
        };
        *state = Some(job.clone());
        drop(state);

        self.send(JobEvent::Status(job.clone()));
        Ok(job)
    }

    pub async fn current(&self) -> Option<JobState> {
        self.state.read().await.clone()
    }

    /// Marks the running job done and announces the output file.
    pub async fn finish(&self, output: &str) {
        let mut state = self.state.write().await;
        if let Some(job) = state.as_mut() {
            job.status = JobStatus::Done;
            job.exit_code = Some(0);
            let job = job.clone();
            drop(state);
            self.send(JobEvent::Status(job));
        }
        self.send(JobEvent::Done {
            output: output.to_string(),
        });
    }

    /// Marks the running job failed with a human-readable message.
    pub async fn fail(&self, message: &str) {
        let mut state = self.state.write().await;
        if let Some(job) = state.as_mut() {
            job.status = JobStatus::Error;
            job.exit_code = Some(1);
            job.error = Some(message.to_string());
            let job = job.clone();
            drop(state);
            self.send(JobEvent::Status(job));
        }
        self.log(format!("Error: {}", message));
    }

    /// Progress line, mirrored to the process log.
    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        info!("[Job] {}", line);
        self.send(JobEvent::Log { line });
    }

    /// Next queued event. Streams share the one receiver through the
    /// lock, so a reconnecting client resumes draining after the
    /// previous connection drops.
    pub async fn next_event(&self) -> Option<JobEvent> {
        self.receiver.lock().await.recv().await
    }

    fn send(&self, event: JobEvent) {
        // the receiver lives as long as the service, send cannot fail
        let _ = self.sender.send(event);
    }
}

impl Default for JobService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platforms() -> Vec<String> {
        vec!["twitch".to_string(), "youtube".to_string()]
    }

    #[tokio::test]
    async fn test_single_flight_guard() {
        let jobs = JobService::new();
        jobs.begin("gaming", &platforms()).await.unwrap();
        assert!(jobs.begin("other", &platforms()).await.is_err());

        jobs.finish("influencers_gaming.csv").await;
        // finished jobs no longer block new ones
        jobs.begin("other", &platforms()).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_job_allows_retry() {
        let jobs = JobService::new();
        jobs.begin("gaming", &platforms()).await.unwrap();
        jobs.fail("boom").await;

        let state = jobs.current().await.unwrap();
        assert_eq!(state.status, JobStatus::Error);
        assert_eq!(state.exit_code, Some(1));
        assert_eq!(state.error.as_deref(), Some("boom"));

        assert!(jobs.begin("again", &platforms()).await.is_ok());
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let jobs = JobService::new();
        jobs.begin("gaming", &platforms()).await.unwrap();
        jobs.log("searching");
        jobs.finish("out.csv").await;

        assert!(matches!(
            jobs.next_event().await,
            Some(JobEvent::Status(job)) if job.status == JobStatus::Running
        ));
        assert!(matches!(jobs.next_event().await, Some(JobEvent::Log { .. })));
        assert!(matches!(
            jobs.next_event().await,
            Some(JobEvent::Status(job)) if job.status == JobStatus::Done
        ));
        assert!(matches!(
            jobs.next_event().await,
            Some(JobEvent::Done { output }) if output == "out.csv"
        ));
    }
}
