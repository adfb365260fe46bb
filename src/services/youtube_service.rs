use crate::models::influencer::{InfluencerRecord, Platform};
use crate::utils::text;
use anyhow::Result;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const CHANNELS_URL: &str = "https://www.googleapis.com/youtube/v3/channels";

/// YouTube Data API adapter. Two-step fetch: a channel search for the
/// keyword, then one batched statistics call for every returned id.
pub struct YouTubeService {
    client: Client,
    api_key: Option<String>,
}

impl YouTubeService {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    pub async fn search(
        &self,
        keyword: &str,
        limit: u64,
        min_subscribers: u64,
    ) -> Vec<InfluencerRecord> {
        let Some(api_key) = &self.api_key else {
            debug!("[YouTube] No API key, skipping search");
            return Vec::new();
        };

        match self.try_search(api_key, keyword, limit, min_subscribers).await {
            Ok(influencers) => influencers,
            Err(e) => {
                warn!("[YouTube] Search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_search(
        &self,
        api_key: &str,
        keyword: &str,
        limit: u64,
        min_subscribers: u64,
    ) -> Result<Vec<InfluencerRecord>> {
        let search_url = format!(
            "{}?part=snippet&q={}&type=channel&maxResults={}&key={}",
            SEARCH_URL,
            urlencoding::encode(keyword),
            limit.min(50),
            api_key
        );

        let search_response = self
            .client
            .get(&search_url)
            .send()
            .await?
            .json::<Value>()
            .await?;

        let ids: Vec<String> = search_response
            .get("items")
            .and_then(|i| i.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        item.get("id")
                            .and_then(|id| id.get("channelId"))
                            .and_then(|v| v.as_str())
                            .map(str::to_string)
                    })
                    .collect()
            })
            .unwrap_or_default();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let stats_url = format!(
            "{}?part=snippet,statistics&id={}&key={}",
            CHANNELS_URL,
            ids.join(","),
            api_key
        );

        let stats_response = self
            .client
            .get(&stats_url)
            .send()
            .await?
            .json::<Value>()
            .await?;

        Ok(channel_records(keyword, &stats_response, min_subscribers))
    }
}

/// Normalizes the batched channels response, dropping channels below
/// the subscriber floor.
pub(crate) fn channel_records(
    keyword: &str,
    stats_response: &Value,
    min_subscribers: u64,
) -> Vec<InfluencerRecord> {
    let mut influencers = Vec::new();

    let Some(items) = stats_response.get("items").and_then(|i| i.as_array()) else {
        return influencers;
    };

    for item in items {
        let Some(id) = item.get("id").and_then(|v| v.as_str()) else {
            continue;
        };

        let stats = item.get("statistics");
        let subscribers = count_field(stats, "subscriberCount");
        if subscribers < min_subscribers {
            continue;
        }

        let snippet = item.get("snippet");
        let description = snippet
            .and_then(|s| s.get("description"))
            .and_then(|v| v.as_str())
            .unwrap_or("");

        influencers.push(InfluencerRecord {
            platform: Platform::YouTube,
            username: id.to_string(),
            display_name: snippet
                .and_then(|s| s.get("title"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            url: format!("https://youtube.com/channel/{}", id),
            followers: subscribers,
            video_count: count_field(stats, "videoCount"),
            relevance_score: text::relevance_score(keyword, description),
            category: "YouTube".to_string(),
            description: text::truncate_bio(description),
            is_live: false,
            email: text::extract_email(description),
            region: "Global".to_string(),
        });
    }

    influencers
}

// The Data API writes counters as decimal strings; hidden or malformed
// counts parse as zero.
fn count_field(stats: Option<&Value>, key: &str) -> u64 {
    match stats.and_then(|s| s.get(key)) {
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        Some(v) => v.as_u64().unwrap_or(0),
        None => 0,
    }
}
