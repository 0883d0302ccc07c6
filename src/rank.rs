use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{error, warn};

use crate::models::RankSnapshot;
use crate::riot_api::RiotClient;

pub fn player_key(name: &str, tag: &str) -> String {
    format!("{}#{}", name, tag)
}

/// Last-known solo queue rank per tracked player, keyed by `name#tag`.
/// Seeded when a monitor starts and rebuilt from scratch on restart.
pub struct RankStore {
    ranks: RwLock<HashMap<String, RankSnapshot>>,
}

impl RankStore {
    pub fn new() -> Self {
        RankStore {
            ranks: RwLock::new(HashMap::new()),
        }
    }

    pub async fn set(&self, key: &str, rank: RankSnapshot) {
        self.ranks.write().await.insert(key.to_string(), rank);
    }

    pub async fn get(&self, key: &str) -> Option<RankSnapshot> {
        self.ranks.read().await.get(key).cloned()
    }

    pub async fn delete(&self, key: &str) {
        self.ranks.write().await.remove(key);
    }

    /// Seed the snapshot at monitor start. A fetch failure is logged and
    /// monitoring proceeds; the first rank change after that is simply not
    /// classified until a snapshot lands.
    pub async fn initialize(&self, riot: &RiotClient, summoner_id: &str, key: &str) {
        match riot.fetch_rank(summoner_id).await {
            Ok(rank) => self.set(key, rank).await,
            Err(e) => error!("could not seed rank snapshot for {}: {}", key, e),
        }
    }

    /// True when tier or division differs from the stored snapshot.
    pub async fn has_changed(&self, key: &str, current: &RankSnapshot) -> bool {
        match self.ranks.read().await.get(key) {
            Some(previous) => {
                previous.tier != current.tier || previous.division != current.division
            }
            None => true,
        }
    }

    /// True when the current rank is strictly stronger than the stored
    /// snapshot. Without a prior snapshot the direction is unknowable, so
    /// this logs and answers false rather than failing the tick.
    pub async fn is_promotion(&self, key: &str, current: &RankSnapshot) -> bool {
        match self.ranks.read().await.get(key) {
            Some(previous) => current.strength() > previous.strength(),
            None => {
                warn!("no previous rank snapshot for {}, treating as non-promotion", key);
                false
            }
        }
    }
}

impl Default for RankStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Division, Tier};

    fn rank(tier: Tier, division: Option<Division>) -> RankSnapshot {
        RankSnapshot {
            tier,
            division,
            league_points: 50,
            wins: 20,
            losses: 20,
        }
    }

    #[tokio::test]
    async fn unchanged_rank_is_not_a_change() {
        let store = RankStore::new();
        store.set("a#jp1", rank(Tier::Gold, Some(Division::Two))).await;

        let same = rank(Tier::Gold, Some(Division::Two));
        assert!(!store.has_changed("a#jp1", &same).await);
    }

    #[tokio::test]
    async fn tier_or_division_difference_is_a_change() {
        let store = RankStore::new();
        store.set("a#jp1", rank(Tier::Gold, Some(Division::Two))).await;

        assert!(
            store
                .has_changed("a#jp1", &rank(Tier::Platinum, Some(Division::Two)))
                .await
        );
        assert!(
            store
                .has_changed("a#jp1", &rank(Tier::Gold, Some(Division::One)))
                .await
        );
    }

    #[tokio::test]
    async fn moving_up_a_tier_is_a_promotion() {
        let store = RankStore::new();
        store.set("a#jp1", rank(Tier::Gold, Some(Division::Two))).await;

        // Gold II -> Platinum IV crosses a tier boundary upwards.
        assert!(
            store
                .is_promotion("a#jp1", &rank(Tier::Platinum, Some(Division::Four)))
                .await
        );
    }

    #[tokio::test]
    async fn dropping_a_division_within_a_tier_is_a_demotion() {
        let store = RankStore::new();
        store.set("a#jp1", rank(Tier::Gold, Some(Division::Two))).await;

        assert!(
            !store
                .is_promotion("a#jp1", &rank(Tier::Gold, Some(Division::Three)))
                .await
        );
    }

    #[tokio::test]
    async fn climbing_a_division_within_a_tier_is_a_promotion() {
        let store = RankStore::new();
        store.set("a#jp1", rank(Tier::Gold, Some(Division::Two))).await;

        assert!(
            store
                .is_promotion("a#jp1", &rank(Tier::Gold, Some(Division::One)))
                .await
        );
    }

    #[tokio::test]
    async fn promotion_without_a_snapshot_is_false() {
        let store = RankStore::new();
        assert!(
            !store
                .is_promotion("a#jp1", &rank(Tier::Challenger, None))
                .await
        );
    }

    #[tokio::test]
    async fn reaching_master_from_diamond_one_is_a_promotion() {
        let store = RankStore::new();
        store.set("a#jp1", rank(Tier::Diamond, Some(Division::One))).await;

        assert!(store.is_promotion("a#jp1", &rank(Tier::Master, None)).await);
    }

    #[tokio::test]
    async fn delete_forgets_the_snapshot() {
        let store = RankStore::new();
        store.set("a#jp1", rank(Tier::Gold, Some(Division::Two))).await;
        store.delete("a#jp1").await;
        assert!(store.get("a#jp1").await.is_none());
    }
}
