use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use tokio::sync::RwLock;
use tracing::error;

use crate::cache::ReferenceCache;
use crate::models::{MatchDetail, Participant, Status};
use crate::riot_api::RiotClient;

/// Queue id of ranked solo/duo; every other queue is ignored.
pub const RANKED_SOLO_QUEUE: i64 = 420;
/// End state of a match that actually finished (as opposed to a remake).
pub const GAME_COMPLETE: &str = "GameComplete";

const UNKNOWN_LANE: &str = "Unknown lane";

/// Last-seen match id per tracked puuid. Seeded at monitor start so a match
/// that predates tracking never triggers a notification.
pub struct MatchStore {
    last_ids: RwLock<HashMap<String, String>>,
}

impl MatchStore {
    pub fn new() -> Self {
        MatchStore {
            last_ids: RwLock::new(HashMap::new()),
        }
    }

    /// A match is worth notifying about only when all three hold: the id
    /// differs from the last one seen, the game ran to completion, and it
    /// was played in the ranked solo queue.
    pub async fn is_new_match(&self, match_id: &str, puuid: &str, detail: &MatchDetail) -> bool {
        self.last_ids.read().await.get(puuid).map(String::as_str) != Some(match_id)
            && detail.info.end_of_game_result == GAME_COMPLETE
            && detail.info.queue_id == RANKED_SOLO_QUEUE
    }

    pub async fn record_seen(&self, match_id: &str, puuid: &str) {
        self.last_ids
            .write()
            .await
            .insert(puuid.to_string(), match_id.to_string());
    }

    pub async fn initialize(&self, riot: &RiotClient, puuid: &str) {
        match riot.fetch_latest_match_id(puuid).await {
            Ok(match_id) => self.record_seen(&match_id, puuid).await,
            Err(e) => error!("could not seed last match id for {}: {}", puuid, e),
        }
    }

    pub async fn forget(&self, puuid: &str) {
        self.last_ids.write().await.remove(puuid);
    }

    #[cfg(test)]
    pub async fn last_seen(&self, puuid: &str) -> Option<String> {
        self.last_ids.read().await.get(puuid).cloned()
    }
}

impl Default for MatchStore {
    fn default() -> Self {
        Self::new()
    }
}

pub fn find_participant<'a>(detail: &'a MatchDetail, puuid: &str) -> Option<&'a Participant> {
    detail
        .info
        .participants
        .iter()
        .find(|participant| participant.puuid == puuid)
}

/// Resolves the tracked player's stat line for a finished match, refreshing
/// the reference cache first when the game-content version moved on.
pub async fn build_status(
    riot: &RiotClient,
    cache: &ReferenceCache,
    detail: &MatchDetail,
    puuid: &str,
) -> Result<Status> {
    let version = riot
        .fetch_latest_version()
        .await
        .context("could not fetch the game content version")?;

    if !cache.is_item_cache_valid(&version).await {
        let items = riot
            .fetch_item_table(&version)
            .await
            .with_context(|| format!("could not fetch the item table for {}", version))?;
        cache.update_items(&version, items).await;
    }
    if !cache.is_champion_cache_valid(&version).await {
        let champions = riot
            .fetch_champion_table(&version)
            .await
            .with_context(|| format!("could not fetch the champion table for {}", version))?;
        cache.update_champions(&version, champions).await;
    }

    let participant = find_participant(detail, puuid)
        .ok_or_else(|| anyhow!("participant {} missing from match detail", puuid))?;

    let lane = if participant.team_position.is_empty() {
        UNKNOWN_LANE.to_string()
    } else {
        participant.team_position.clone()
    };
    let champion = cache.champion_name(participant.champion_id).await;
    let champion_icon = format!(
        "https://ddragon.leagueoflegends.com/cdn/{}/img/champion/{}.png",
        version, participant.champion_name
    );
    let item_names = cache.item_names(&participant.item_ids()).await;

    Ok(Status {
        lane,
        champion,
        champion_icon,
        cs: participant.creep_score(),
        kills: participant.kills,
        kda: format!(
            "{}/{}/{}",
            participant.kills, participant.deaths, participant.assists
        ),
        damage: participant.total_damage_dealt_to_champions,
        item_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchInfo, Participant};

    fn detail(queue_id: i64, end_of_game_result: &str, participants: Vec<Participant>) -> MatchDetail {
        MatchDetail {
            info: MatchInfo {
                participants,
                queue_id,
                end_of_game_result: end_of_game_result.to_string(),
            },
        }
    }

    fn participant(puuid: &str, win: bool) -> Participant {
        Participant {
            puuid: puuid.to_string(),
            win,
            ..Participant::default()
        }
    }

    #[tokio::test]
    async fn repeated_match_id_is_not_new() {
        let store = MatchStore::new();
        store.record_seen("JP1_100", "puuid-a").await;

        let ranked = detail(RANKED_SOLO_QUEUE, GAME_COMPLETE, vec![]);
        assert!(!store.is_new_match("JP1_100", "puuid-a", &ranked).await);
    }

    #[tokio::test]
    async fn fresh_id_in_another_queue_is_not_new() {
        let store = MatchStore::new();
        store.record_seen("JP1_100", "puuid-a").await;

        let aram = detail(450, GAME_COMPLETE, vec![]);
        assert!(!store.is_new_match("JP1_101", "puuid-a", &aram).await);
    }

    #[tokio::test]
    async fn fresh_id_of_a_remake_is_not_new() {
        let store = MatchStore::new();
        store.record_seen("JP1_100", "puuid-a").await;

        let remake = detail(RANKED_SOLO_QUEUE, "Abort_Unexpected", vec![]);
        assert!(!store.is_new_match("JP1_101", "puuid-a", &remake).await);
    }

    #[tokio::test]
    async fn fresh_completed_ranked_match_is_new() {
        let store = MatchStore::new();
        store.record_seen("JP1_100", "puuid-a").await;

        let ranked = detail(RANKED_SOLO_QUEUE, GAME_COMPLETE, vec![]);
        assert!(store.is_new_match("JP1_101", "puuid-a", &ranked).await);
    }

    #[tokio::test]
    async fn unseeded_player_sees_the_first_match_as_new() {
        let store = MatchStore::new();
        let ranked = detail(RANKED_SOLO_QUEUE, GAME_COMPLETE, vec![]);
        assert!(store.is_new_match("JP1_100", "puuid-a", &ranked).await);
    }

    #[tokio::test]
    async fn forget_removes_the_entry() {
        let store = MatchStore::new();
        store.record_seen("JP1_100", "puuid-a").await;
        store.forget("puuid-a").await;
        assert!(store.last_seen("puuid-a").await.is_none());
    }

    #[test]
    fn finds_the_tracked_participant() {
        let ranked = detail(
            RANKED_SOLO_QUEUE,
            GAME_COMPLETE,
            vec![participant("puuid-a", true), participant("puuid-b", false)],
        );
        assert!(find_participant(&ranked, "puuid-b").is_some());
        assert!(!find_participant(&ranked, "puuid-b").unwrap().win);
        assert!(find_participant(&ranked, "puuid-c").is_none());
    }

    #[test]
    fn match_detail_deserializes_from_api_shape() {
        let parsed: MatchDetail = serde_json::from_str(
            r#"{
                "metadata": {"matchId": "JP1_123"},
                "info": {
                    "queueId": 420,
                    "endOfGameResult": "GameComplete",
                    "participants": [{
                        "puuid": "puuid-a",
                        "win": true,
                        "championId": 103,
                        "championName": "Ahri",
                        "teamPosition": "MIDDLE",
                        "kills": 7,
                        "deaths": 2,
                        "assists": 9,
                        "totalMinionsKilled": 180,
                        "neutralMinionsKilled": 12,
                        "totalDamageDealtToChampions": 24360,
                        "item0": 3031, "item1": 0, "item2": 6672,
                        "item3": 0, "item4": 0, "item5": 0
                    }]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(parsed.info.queue_id, RANKED_SOLO_QUEUE);
        let p = find_participant(&parsed, "puuid-a").unwrap();
        assert_eq!(p.creep_score(), 192);
        assert_eq!(p.item_ids(), [3031, 0, 6672, 0, 0, 0]);
    }
}
