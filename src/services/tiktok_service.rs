use crate::models::influencer::{InfluencerRecord, Platform};
use crate::utils::text;
use anyhow::Result;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;

const SEARCH_URL: &str = "https://tokapi-mobile-version.p.rapidapi.com/v1/search/user";
const RAPIDAPI_HOST: &str = "tokapi-mobile-version.p.rapidapi.com";

/// TikTok adapter, fetching through the tokapi RapidAPI gateway.
/// Single search call, user info and stats arrive together.
pub struct TikTokService {
    client: Client,
    api_key: Option<String>,
}

impl TikTokService {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    pub async fn search(
        &self,
        keyword: &str,
        limit: u64,
        min_followers: u64,
    ) -> Vec<InfluencerRecord> {
        let Some(api_key) = &self.api_key else {
            debug!("[TikTok] No RapidAPI key, skipping search");
            return Vec::new();
        };

        match self.try_search(api_key, keyword, limit, min_followers).await {
            Ok(influencers) => influencers,
            Err(e) => {
                warn!("[TikTok] Search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_search(
        &self,
        api_key: &str,
        keyword: &str,
        limit: u64,
        min_followers: u64,
    ) -> Result<Vec<InfluencerRecord>> {
        let count = limit.to_string();
        let response = self
            .client
            .get(SEARCH_URL)
            .header("x-rapidapi-key", api_key)
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .query(&[("keyword", keyword), ("count", count.as_str())])
            .send()
            .await?
            .json::<Value>()
            .await?;

        Ok(user_records(keyword, &response, min_followers))
    }
}

/// Normalizes the gateway response. The user list sits at the top
/// level of the payload, not under a data envelope.
pub(crate) fn user_records(keyword: &str, response: &Value, min_followers: u64) -> Vec<InfluencerRecord> {
    let mut influencers = Vec::new();

    let Some(users) = response.get("user_list").and_then(|u| u.as_array()) else {
        return influencers;
    };

    for entry in users {
        let user = entry.get("user_info");
        let stats = entry.get("stats");

        let followers = stats
            .and_then(|s| s.get("follower_count"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        if followers < min_followers {
            continue;
        }

        let unique_id = user
            .and_then(|u| u.get("unique_id"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let bio = user
            .and_then(|u| u.get("signature"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let avatar_uri = user
            .and_then(|u| u.get("avatar_168x168"))
            .and_then(|a| a.get("uri"))
            .and_then(|v| v.as_str())
            .unwrap_or("");

        influencers.push(InfluencerRecord {
            platform: Platform::TikTok,
            username: unique_id.to_string(),
            display_name: user
                .and_then(|u| u.get("nickname"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            url: format!("https://tiktok.com/@{}", unique_id),
            followers,
            video_count: stats
                .and_then(|s| s.get("video_count"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            relevance_score: text::relevance_score(keyword, bio),
            category: "TikTok".to_string(),
            description: text::truncate_bio(bio),
            is_live: false,
            email: text::extract_email(bio),
            region: text::detect_region(avatar_uri),
        });
    }

    influencers
}
