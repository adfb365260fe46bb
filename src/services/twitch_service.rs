use crate::models::influencer::{InfluencerRecord, Platform};
use crate::utils::text;
use anyhow::Result;
use log::{debug, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
const SEARCH_URL: &str = "https://api.twitch.tv/helix/search/channels";
const FOLLOWERS_URL: &str = "https://api.twitch.tv/helix/channels/followers";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Twitch adapter. Holds the app access token obtained once at
/// construction; without a token every search is a no-op.
pub struct TwitchService {
    client: Client,
    client_id: Option<String>,
    token: Option<String>,
}

impl TwitchService {
    /// Exchanges the client credentials for an app access token. A failed
    /// exchange leaves the token unset so searches degrade to empty
    /// results instead of aborting the other platforms.
    pub async fn connect(
        client: Client,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        let token = match (&client_id, &client_secret) {
            (Some(id), Some(secret)) => match Self::fetch_token(&client, id, secret).await {
                Ok(token) => Some(token),
                Err(e) => {
                    warn!("[Twitch] App token exchange failed: {}", e);
                    None
                }
            },
            _ => None,
        };

        Self {
            client,
            client_id,
            token,
        }
    }

    async fn fetch_token(client: &Client, client_id: &str, client_secret: &str) -> Result<String> {
        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("grant_type", "client_credentials"),
        ];

        let response = client.post(TOKEN_URL).form(&params).send().await?;
        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!("token endpoint returned: {}", error_text));
        }

        let token_response: TokenResponse = response.json().await?;
        Ok(token_response.access_token)
    }

    pub async fn search(&self, keyword: &str, limit: u64, min_followers: u64) -> Vec<InfluencerRecord> {
        let (Some(client_id), Some(token)) = (&self.client_id, &self.token) else {
            debug!("[Twitch] No app token, skipping search");
            return Vec::new();
        };

        match self
            .try_search(client_id, token, keyword, limit, min_followers)
            .await
        {
            Ok(influencers) => influencers,
            Err(e) => {
                warn!("[Twitch] Search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_search(
        &self,
        client_id: &str,
        token: &str,
        keyword: &str,
        limit: u64,
        min_followers: u64,
    ) -> Result<Vec<InfluencerRecord>> {
        let url = format!(
            "{}?query={}&first={}",
            SEARCH_URL,
            urlencoding::encode(keyword),
            limit.min(100)
        );

        let response = self
            .client
            .get(&url)
            .header("Client-Id", client_id)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?
            .json::<Value>()
            .await?;

        let mut influencers = Vec::new();

        if let Some(channels) = response.get("data").and_then(|d| d.as_array()) {
            for channel in channels {
                let broadcaster_id = channel.get("id").and_then(|v| v.as_str()).unwrap_or("");
                let followers = self
                    .fetch_follower_count(client_id, token, broadcaster_id)
                    .await;

                // filtering happens after the fetch, a failed lookup counts as zero
                if followers < min_followers {
                    continue;
                }

                if let Some(record) = channel_record(keyword, channel, followers) {
                    influencers.push(record);
                }
            }
        }

        Ok(influencers)
    }

    /// Follower count for one channel. Any failure is a count of zero,
    /// not a skip.
    async fn fetch_follower_count(&self, client_id: &str, token: &str, broadcaster_id: &str) -> u64 {
        let url = format!("{}?broadcaster_id={}", FOLLOWERS_URL, broadcaster_id);

        let result = async {
            self.client
                .get(&url)
                .header("Client-Id", client_id)
                .header(AUTHORIZATION, format!("Bearer {}", token))
                .send()
                .await?
                .json::<Value>()
                .await
        }
        .await;

        match result {
            Ok(body) => body.get("total").and_then(|t| t.as_u64()).unwrap_or(0),
            Err(e) => {
                debug!(
                    "[Twitch] Follower lookup failed for {}: {}",
                    broadcaster_id, e
                );
                0
            }
        }
    }
}

/// Builds the unified record from one helix search hit.
pub(crate) fn channel_record(keyword: &str, channel: &Value, followers: u64) -> Option<InfluencerRecord> {
    let login = channel.get("broadcaster_login").and_then(|v| v.as_str())?;
    let title = channel.get("title").and_then(|v| v.as_str()).unwrap_or("");

    Some(InfluencerRecord {
        platform: Platform::Twitch,
        username: login.to_string(),
        display_name: channel
            .get("display_name")
            .and_then(|v| v.as_str())
            .unwrap_or(login)
            .to_string(),
        url: format!("https://twitch.tv/{}", login),
        followers,
        video_count: 0,
        relevance_score: text::relevance_score(keyword, title),
        category: channel
            .get("game_name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        description: text::truncate_bio(title),
        is_live: channel
            .get("is_live")
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        email: String::new(),
        region: "Global".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_channel() -> Value {
        json!({
            "id": "12345",
            "broadcaster_login": "ninja",
            "display_name": "Ninja",
            "game_name": "Fortnite",
            "title": "Pro gaming all day",
            "is_live": true
        })
    }

    #[test]
    fn test_channel_record_fields() {
        let record = channel_record("gaming", &sample_channel(), 42).unwrap();
        assert_eq!(record.platform, Platform::Twitch);
        assert_eq!(record.username, "ninja");
        assert_eq!(record.url, "https://twitch.tv/ninja");
        assert_eq!(record.followers, 42);
        assert_eq!(record.video_count, 0);
        assert_eq!(record.relevance_score, 5.0);
        assert_eq!(record.category, "Fortnite");
        assert!(record.is_live);
        assert_eq!(record.email, "");
        assert_eq!(record.region, "Global");
    }

    #[test]
    fn test_channel_record_keyword_miss_scores_one() {
        let record = channel_record("cooking", &sample_channel(), 0).unwrap();
        assert_eq!(record.relevance_score, 1.0);
        // a failed follower lookup still yields a record, with zero followers
        assert_eq!(record.followers, 0);
    }

    #[test]
    fn test_channel_record_requires_login() {
        let channel = json!({ "display_name": "NoLogin" });
        assert!(channel_record("gaming", &channel, 10).is_none());
    }

    #[tokio::test]
    async fn test_search_without_token_is_empty() {
        let service = TwitchService::connect(Client::new(), None, None).await;
        let results = service.search("gaming", 5, 0).await;
        assert!(results.is_empty());
    }
}
