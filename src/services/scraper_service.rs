use crate::models::influencer::InfluencerRecord;
use crate::models::settings::ApiCredentials;
use crate::services::tiktok_service::TikTokService;
use crate::services::twitch_service::TwitchService;
use crate::services::youtube_service::YouTubeService;
use log::info;
use reqwest::Client;

/// Aggregates keyword searches across the three platform adapters.
/// Each adapter owns its own credential state; a platform with missing
/// or invalid credentials contributes an empty slice, never an error.
pub struct InfluencerScraper {
    twitch: TwitchService,
    youtube: YouTubeService,
    tiktok: TikTokService,
}

impl InfluencerScraper {
    /// Builds the adapters, performing the one-time Twitch token
    /// exchange when credentials are present.
    pub async fn new(credentials: &ApiCredentials) -> Self {
        let client = Client::new();

        let twitch = TwitchService::connect(
            client.clone(),
            credentials.twitch_client_id.clone(),
            credentials.twitch_client_secret.clone(),
        )
        .await;
        let youtube = YouTubeService::new(client.clone(), credentials.youtube_api_key.clone());
        let tiktok = TikTokService::new(client, credentials.rapidapi_key.clone());

        Self {
            twitch,
            youtube,
            tiktok,
        }
    }

    /// Runs the enabled adapters sequentially and concatenates their
    /// filtered output in fixed twitch, youtube, tiktok order. Unknown
    /// platform names are ignored. `limit` caps each platform
    /// independently; `min_followers` is the shared Twitch/TikTok
    /// floor, `min_subscribers` the YouTube floor.
    pub async fn search_all_platforms(
        &self,
        keyword: &str,
        platforms: &[String],
        limit: u64,
        min_subscribers: u64,
        min_followers: u64,
    ) -> Vec<InfluencerRecord> {
        let enabled = |name: &str| platforms.iter().any(|p| p == name);
        let mut results = Vec::new();

        if enabled("twitch") {
            let hits = self.twitch.search(keyword, limit, min_followers).await;
            info!("[Scraper] Twitch: {} hits", hits.len());
            results.extend(hits);
        }

        if enabled("youtube") {
            let hits = self.youtube.search(keyword, limit, min_subscribers).await;
            info!("[Scraper] YouTube: {} hits", hits.len());
            results.extend(hits);
        }

        if enabled("tiktok") {
            let hits = self.tiktok.search(keyword, limit, min_followers).await;
            info!("[Scraper] TikTok: {} hits", hits.len());
            results.extend(hits);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // With no credentials every adapter degrades to empty without
    // touching the network.
    #[tokio::test]
    async fn test_search_without_credentials_is_empty() {
        let scraper = InfluencerScraper::new(&ApiCredentials::default()).await;
        let platforms = vec![
            "twitch".to_string(),
            "youtube".to_string(),
            "tiktok".to_string(),
        ];
        let results = scraper
            .search_all_platforms("gaming", &platforms, 10, 0, 0)
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_platforms_are_ignored() {
        let scraper = InfluencerScraper::new(&ApiCredentials::default()).await;
        let platforms = vec!["instagram".to_string(), "TWITCH".to_string()];
        let results = scraper
            .search_all_platforms("gaming", &platforms, 10, 0, 0)
            .await;
        assert!(results.is_empty());
    }
}
