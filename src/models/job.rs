use serde::{Deserialize, Serialize};
use serde_json::json;

fn default_max_results() -> u64 {
    50
}

/// Body of POST /api/run/influencer-scraper. Field names match the web UI.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeRequest {
    pub keyword: String,
    pub platforms: Vec<String>,
    /// Subscriber floor for YouTube channels.
    #[serde(default, rename = "minFollowersYT")]
    pub min_followers_yt: u64,
    /// Follower floor shared by Twitch and TikTok.
    #[serde(default, rename = "minFollowersTW")]
    pub min_followers_tw: u64,
    #[serde(default = "default_max_results", rename = "maxResults")]
    pub max_results: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Done,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobState {
    pub status: JobStatus,
    pub keyword: String,
    pub platforms: Vec<String>,
    #[serde(rename = "startedAt")]
    pub started_at: String,
    #[serde(rename = "exitCode", skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Progress events pushed over the SSE log stream.
#[derive(Debug, Clone)]
pub enum JobEvent {
    Log { line: String },
    Status(JobState),
    Done { output: String },
}

impl JobEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            JobEvent::Log { .. } => "log",
            JobEvent::Status(_) => "status",
            JobEvent::Done { .. } => "done",
        }
    }

    /// SSE event payload.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            JobEvent::Log { line } => json!({ "line": line }),
            JobEvent::Status(state) => serde_json::to_value(state).unwrap_or_else(|_| json!({})),
            JobEvent::Done { output } => json!({ "output": output }),
        }
    }
}
