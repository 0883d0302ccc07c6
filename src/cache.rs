use tokio::sync::RwLock;

use crate::models::{ChampionTable, ItemTable};

pub const UNKNOWN_ITEM: &str = "Unknown item";
pub const UNKNOWN_CHAMPION: &str = "Unknown champion";

/// Items never bought leave a 0 in the slot.
const EMPTY_ITEM_SLOT: i64 = 0;

#[derive(Default)]
struct Tables {
    version: Option<String>,
    items: ItemTable,
    champions: ChampionTable,
}

/// Item and champion name tables, stamped with the Data Dragon version they
/// were fetched for. Both tables share one stamp; a table is usable only
/// while the stamp matches the latest version and the table is non-empty.
pub struct ReferenceCache {
    inner: RwLock<Tables>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        ReferenceCache {
            inner: RwLock::new(Tables::default()),
        }
    }

    pub async fn is_item_cache_valid(&self, version: &str) -> bool {
        let tables = self.inner.read().await;
        tables.version.as_deref() == Some(version) && !tables.items.is_empty()
    }

    pub async fn is_champion_cache_valid(&self, version: &str) -> bool {
        let tables = self.inner.read().await;
        tables.version.as_deref() == Some(version) && !tables.champions.is_empty()
    }

    /// Last write wins; no merging with the previous table.
    pub async fn update_items(&self, version: &str, items: ItemTable) {
        let mut tables = self.inner.write().await;
        tables.version = Some(version.to_string());
        tables.items = items;
    }

    pub async fn update_champions(&self, version: &str, champions: ChampionTable) {
        let mut tables = self.inner.write().await;
        tables.version = Some(version.to_string());
        tables.champions = champions;
    }

    /// Resolves item ids to names, skipping empty slots. Ids the table does
    /// not know get a placeholder instead of failing the whole status build.
    pub async fn item_names(&self, item_ids: &[i64]) -> Vec<String> {
        let tables = self.inner.read().await;
        item_ids
            .iter()
            .filter(|&&id| id != EMPTY_ITEM_SLOT)
            .map(|id| {
                tables
                    .items
                    .get(&id.to_string())
                    .map(|item| item.name.clone())
                    .unwrap_or_else(|| UNKNOWN_ITEM.to_string())
            })
            .collect()
    }

    /// champion.json is keyed by name, so the numeric id lives in the `key`
    /// field and lookup is a linear scan.
    pub async fn champion_name(&self, champion_id: i64) -> String {
        let tables = self.inner.read().await;
        tables
            .champions
            .values()
            .find(|champion| champion.key.parse::<i64>() == Ok(champion_id))
            .map(|champion| champion.name.clone())
            .unwrap_or_else(|| UNKNOWN_CHAMPION.to_string())
    }
}

impl Default for ReferenceCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChampionEntry, ItemEntry};
    use std::collections::HashMap;

    fn item_table(entries: &[(&str, &str)]) -> ItemTable {
        entries
            .iter()
            .map(|(id, name)| {
                (
                    id.to_string(),
                    ItemEntry {
                        name: name.to_string(),
                    },
                )
            })
            .collect()
    }

    fn champion_table(entries: &[(&str, &str, &str)]) -> ChampionTable {
        entries
            .iter()
            .map(|(champ, key, name)| {
                (
                    champ.to_string(),
                    ChampionEntry {
                        key: key.to_string(),
                        name: name.to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn cache_is_invalid_until_updated() {
        tokio_test::block_on(async {
            let cache = ReferenceCache::new();
            assert!(!cache.is_item_cache_valid("14.1.1").await);

            cache
                .update_items("14.1.1", item_table(&[("3031", "Infinity Edge")]))
                .await;
            assert!(cache.is_item_cache_valid("14.1.1").await);
        });
    }

    #[test]
    fn version_bump_invalidates_a_non_empty_table() {
        tokio_test::block_on(async {
            let cache = ReferenceCache::new();
            cache
                .update_items("14.1.1", item_table(&[("3031", "Infinity Edge")]))
                .await;
            assert!(!cache.is_item_cache_valid("14.2.1").await);
        });
    }

    #[test]
    fn empty_table_is_invalid_even_with_matching_version() {
        tokio_test::block_on(async {
            let cache = ReferenceCache::new();
            cache.update_items("14.1.1", HashMap::new()).await;
            assert!(!cache.is_item_cache_valid("14.1.1").await);
            // Champion table was never filled either.
            assert!(!cache.is_champion_cache_valid("14.1.1").await);
        });
    }

    #[test]
    fn item_lookup_skips_empty_slots_and_flags_unknown_ids() {
        tokio_test::block_on(async {
            let cache = ReferenceCache::new();
            cache
                .update_items(
                    "14.1.1",
                    item_table(&[("3031", "Infinity Edge"), ("3046", "Phantom Dancer")]),
                )
                .await;

            let names = cache.item_names(&[3031, 0, 9999, 3046, 0, 0]).await;
            assert_eq!(
                names,
                vec![
                    "Infinity Edge".to_string(),
                    UNKNOWN_ITEM.to_string(),
                    "Phantom Dancer".to_string(),
                ]
            );
        });
    }

    #[test]
    fn champion_lookup_matches_on_the_numeric_key() {
        tokio_test::block_on(async {
            let cache = ReferenceCache::new();
            cache
                .update_champions(
                    "14.1.1",
                    champion_table(&[("Ahri", "103", "Ahri"), ("MonkeyKing", "62", "Wukong")]),
                )
                .await;

            assert_eq!(cache.champion_name(62).await, "Wukong");
            assert_eq!(cache.champion_name(103).await, "Ahri");
            assert_eq!(cache.champion_name(1).await, UNKNOWN_CHAMPION);
        });
    }
}
