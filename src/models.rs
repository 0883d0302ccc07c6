use std::collections::HashMap;
use std::fmt;

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// A player registered for ranked notifications. The registry (db.rs) owns
/// the persistent record; everything here is a working copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPlayer {
    pub name: String,
    pub tag: String,
    pub puuid: String,
    pub summoner_id: String,
    pub discord_id: String,
    pub streak: i64,
}

impl TrackedPlayer {
    /// Key used by the rank store and the monitor registry.
    pub fn key(&self) -> String {
        format!("{}#{}", self.name, self.tag)
    }
}

/// Competitive tiers, declared lowest to highest so the derived `Ord`
/// encodes rank strength directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Iron => "IRON",
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
            Tier::Diamond => "DIAMOND",
            Tier::Master => "MASTER",
            Tier::Grandmaster => "GRANDMASTER",
            Tier::Challenger => "CHALLENGER",
        };
        write!(f, "{}", name)
    }
}

/// Divisions within a tier, declared weakest (IV) to strongest (I) for the
/// same reason as `Tier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Division {
    #[serde(rename = "IV")]
    Four,
    #[serde(rename = "III")]
    Three,
    #[serde(rename = "II")]
    Two,
    #[serde(rename = "I")]
    One,
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Division::Four => "IV",
            Division::Three => "III",
            Division::Two => "II",
            Division::One => "I",
        };
        write!(f, "{}", name)
    }
}

/// A player's solo queue standing at one point in time. The league API omits
/// the division at Master and above.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankSnapshot {
    pub tier: Tier,
    #[serde(rename = "rank")]
    pub division: Option<Division>,
    pub league_points: i64,
    pub wins: i64,
    pub losses: i64,
}

impl RankSnapshot {
    /// Total-order key for promotion/demotion decisions. A missing division
    /// (Master and above) compares as division I within its tier.
    pub fn strength(&self) -> (Tier, Division) {
        (self.tier, self.division.unwrap_or(Division::One))
    }

    pub fn win_rate(&self) -> f64 {
        let games = self.wins + self.losses;
        if games == 0 {
            return 0.0;
        }
        self.wins as f64 / games as f64 * 100.0
    }

    /// Short label like "GOLD II" or "MASTER".
    pub fn label(&self) -> String {
        match self.division {
            Some(division) => format!("{} {}", self.tier, division),
            None => self.tier.to_string(),
        }
    }
}

/// One entry from the league-v4 endpoint; the client picks out the
/// RANKED_SOLO_5x5 one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntry {
    pub queue_type: String,
    #[serde(flatten)]
    pub rank: RankSnapshot,
}

/// match-v5 detail, trimmed to the fields the notifications need.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchDetail {
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    #[serde(default)]
    pub participants: Vec<Participant>,
    pub queue_id: i64,
    #[serde(default)]
    pub end_of_game_result: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Participant {
    pub puuid: String,
    pub win: bool,
    pub champion_id: i64,
    pub champion_name: String,
    pub team_position: String,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub total_minions_killed: i64,
    pub neutral_minions_killed: i64,
    pub total_damage_dealt_to_champions: i64,
    pub item0: i64,
    pub item1: i64,
    pub item2: i64,
    pub item3: i64,
    pub item4: i64,
    pub item5: i64,
}

impl Participant {
    pub fn item_ids(&self) -> [i64; 6] {
        [
            self.item0, self.item1, self.item2, self.item3, self.item4, self.item5,
        ]
    }

    pub fn creep_score(&self) -> i64 {
        self.total_minions_killed + self.neutral_minions_killed
    }
}

/// The per-match stat line a notification embeds, with item and champion ids
/// already resolved to names through the reference cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub lane: String,
    pub champion: String,
    pub champion_icon: String,
    pub cs: i64,
    pub kills: i64,
    pub kda: String,
    pub damage: i64,
    pub item_names: Vec<String>,
}

/// Data Dragon item.json entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemEntry {
    pub name: String,
}

/// Data Dragon champion.json entry; `key` is the numeric champion id as a
/// string, the map itself is keyed by champion name.
#[derive(Debug, Clone, Deserialize)]
pub struct ChampionEntry {
    pub key: String,
    pub name: String,
}

pub type ItemTable = HashMap<String, ItemEntry>;
pub type ChampionTable = HashMap<String, ChampionEntry>;
