use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Twitch,
    YouTube,
    TikTok,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitch => "Twitch",
            Platform::YouTube => "YouTube",
            Platform::TikTok => "TikTok",
        }
    }
}

/// One normalized search hit, fully built by its platform adapter.
/// Records are never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluencerRecord {
    pub platform: Platform,
    pub username: String,
    pub display_name: String,
    pub url: String,
    pub followers: u64,
    pub video_count: u64,
    /// 5.0 when the keyword appears in the bio/title, 1.0 otherwise.
    pub relevance_score: f64,
    pub category: String,
    pub description: String,
    pub is_live: bool,
    pub email: String,
    pub region: String,
}
