use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use thiserror::Error;

use crate::models::{ChampionTable, ItemTable, LeagueEntry, MatchDetail, RankSnapshot};

const RIOT_ASIA_URL: &str = "https://asia.api.riotgames.com";
const RIOT_JP_URL: &str = "https://jp1.api.riotgames.com";
const DDRAGON_URL: &str = "https://ddragon.leagueoflegends.com";

pub const SOLO_QUEUE_TYPE: &str = "RANKED_SOLO_5x5";

/// Failure taxonomy for every Riot/Data Dragon round trip. Calls are single
/// attempt; the monitor treats any of these as "skip this tick".
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{0} was not found")]
    NotFound(&'static str),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
struct AccountResponse {
    puuid: String,
}

#[derive(Debug, Deserialize)]
struct SummonerResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ItemTableResponse {
    data: ItemTable,
}

#[derive(Debug, Deserialize)]
struct ChampionTableResponse {
    data: ChampionTable,
}

/// Thin client over the Riot match/league endpoints and Data Dragon.
/// Authentication is the X-Riot-Token header; Data Dragon is unauthenticated.
pub struct RiotClient {
    http: reqwest::Client,
    api_token: String,
}

impl RiotClient {
    pub fn new(http: reqwest::Client, api_token: String) -> Self {
        RiotClient { http, api_token }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String, with_token: bool) -> ApiResult<T> {
        let mut request = self.http.get(&url);
        if with_token {
            request = request.header("X-Riot-Token", &self.api_token);
        }
        let response = request.send().await.map_err(|source| ApiError::Network {
            url: url.clone(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { url, status });
        }
        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode { url, source })
    }

    pub async fn fetch_puuid(&self, name: &str, tag: &str) -> ApiResult<String> {
        let url = format!(
            "{}/riot/account/v1/accounts/by-riot-id/{}/{}",
            RIOT_ASIA_URL,
            urlencoding::encode(name),
            urlencoding::encode(tag)
        );
        let account: AccountResponse = self.get_json(url, true).await?;
        Ok(account.puuid)
    }

    pub async fn fetch_summoner_id(&self, puuid: &str) -> ApiResult<String> {
        let url = format!("{}/lol/summoner/v4/summoners/by-puuid/{}", RIOT_JP_URL, puuid);
        let summoner: SummonerResponse = self.get_json(url, true).await?;
        Ok(summoner.id)
    }

    /// Most recent match id only (start=0&count=1).
    pub async fn fetch_latest_match_id(&self, puuid: &str) -> ApiResult<String> {
        let url = format!(
            "{}/lol/match/v5/matches/by-puuid/{}/ids?start=0&count=1",
            RIOT_ASIA_URL, puuid
        );
        let ids: Vec<String> = self.get_json(url, true).await?;
        ids.into_iter()
            .next()
            .ok_or(ApiError::NotFound("latest match id"))
    }

    pub async fn fetch_match_detail(&self, match_id: &str) -> ApiResult<MatchDetail> {
        let url = format!("{}/lol/match/v5/matches/{}", RIOT_ASIA_URL, match_id);
        self.get_json(url, true).await
    }

    /// Solo queue standing for a summoner; `NotFound` when the summoner has
    /// no RANKED_SOLO_5x5 entry (or no entries at all).
    pub async fn fetch_rank(&self, summoner_id: &str) -> ApiResult<RankSnapshot> {
        let url = format!(
            "{}/lol/league/v4/entries/by-summoner/{}",
            RIOT_JP_URL, summoner_id
        );
        let entries: Vec<LeagueEntry> = self.get_json(url, true).await?;
        solo_queue_rank(entries).ok_or(ApiError::NotFound("solo queue rank entry"))
    }

    pub async fn fetch_item_table(&self, version: &str) -> ApiResult<ItemTable> {
        let url = format!("{}/cdn/{}/data/en_US/item.json", DDRAGON_URL, version);
        let table: ItemTableResponse = self.get_json(url, false).await?;
        Ok(table.data)
    }

    pub async fn fetch_champion_table(&self, version: &str) -> ApiResult<ChampionTable> {
        let url = format!("{}/cdn/{}/data/en_US/champion.json", DDRAGON_URL, version);
        let table: ChampionTableResponse = self.get_json(url, false).await?;
        Ok(table.data)
    }

    /// Newest game-content version; versions.json lists newest first.
    pub async fn fetch_latest_version(&self) -> ApiResult<String> {
        let url = format!("{}/api/versions.json", DDRAGON_URL);
        let versions: Vec<String> = self.get_json(url, false).await?;
        versions
            .into_iter()
            .next()
            .ok_or(ApiError::NotFound("game content version"))
    }
}

fn solo_queue_rank(entries: Vec<LeagueEntry>) -> Option<RankSnapshot> {
    entries
        .into_iter()
        .find(|entry| entry.queue_type == SOLO_QUEUE_TYPE)
        .map(|entry| entry.rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Division, Tier};

    fn entries(json: &str) -> Vec<LeagueEntry> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn picks_the_solo_queue_entry() {
        let rank = solo_queue_rank(entries(
            r#"[
                {"queueType": "RANKED_FLEX_SR", "tier": "PLATINUM", "rank": "I",
                 "leaguePoints": 75, "wins": 11, "losses": 4},
                {"queueType": "RANKED_SOLO_5x5", "tier": "GOLD", "rank": "III",
                 "leaguePoints": 20, "wins": 30, "losses": 32}
            ]"#,
        ))
        .unwrap();
        assert_eq!(rank.tier, Tier::Gold);
        assert_eq!(rank.division, Some(Division::Three));
    }

    #[test]
    fn missing_solo_queue_entry_is_none() {
        let rank = solo_queue_rank(entries(
            r#"[{"queueType": "RANKED_FLEX_SR", "tier": "IRON", "rank": "IV",
                 "leaguePoints": 0, "wins": 1, "losses": 9}]"#,
        ));
        assert!(rank.is_none());
    }

    #[test]
    fn empty_entry_list_is_none() {
        assert!(solo_queue_rank(Vec::new()).is_none());
    }
}
