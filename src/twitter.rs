use serde_json::json;
use tracing::{debug, error, info};

const TWEET_URL: &str = "https://api.twitter.com/2/tweets";

/// Best-effort mirror of notifications to the community feed. Every failure
/// is swallowed and logged; the Discord notification is the real delivery.
pub struct SocialClient {
    http: reqwest::Client,
    bearer_token: Option<String>,
}

impl SocialClient {
    pub fn new(http: reqwest::Client, bearer_token: Option<String>) -> Self {
        SocialClient { http, bearer_token }
    }

    pub async fn post(&self, text: &str) {
        let Some(token) = &self.bearer_token else {
            debug!("tweet mirror disabled, skipping: {}", text);
            return;
        };

        let result = self
            .http
            .post(TWEET_URL)
            .bearer_auth(token)
            .json(&json!({ "text": text }))
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                info!("mirrored notification to the feed");
            }
            Ok(response) => {
                error!("tweet was rejected with status {}", response.status());
            }
            Err(e) => error!("could not post tweet: {}", e),
        }
    }
}
