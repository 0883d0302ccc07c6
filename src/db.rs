use std::path::PathBuf;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::models::TrackedPlayer;

/// The player registry. One row per tracked player; `Streak` is the only
/// column the monitor writes back, everything else is fixed at registration.
pub fn init_db(db_path: &PathBuf) -> Result<()> {
    let connection = Connection::open(db_path)?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS Player (
            Name TEXT NOT NULL,
            Tag TEXT NOT NULL,
            Puuid TEXT NOT NULL UNIQUE,
            SummonerId TEXT NOT NULL,
            DiscordId TEXT NOT NULL,
            Streak INTEGER NOT NULL DEFAULT 0,
            RegisteredAt TEXT NOT NULL
        );",
        [],
    )?;
    Ok(())
}

pub fn fetch_all_players(db_path: &PathBuf) -> Result<Vec<TrackedPlayer>> {
    let connection = Connection::open(db_path)?;
    let mut statement = connection
        .prepare("SELECT Name, Tag, Puuid, SummonerId, DiscordId, Streak FROM Player;")?;
    let mut rows = statement.query([])?;

    let mut players = Vec::new();
    while let Some(row) = rows.next()? {
        players.push(TrackedPlayer {
            name: row.get(0)?,
            tag: row.get(1)?,
            puuid: row.get(2)?,
            summoner_id: row.get(3)?,
            discord_id: row.get(4)?,
            streak: row.get(5)?,
        });
    }
    Ok(players)
}

pub fn add_player(db_path: &PathBuf, player: &TrackedPlayer) -> Result<()> {
    let connection = Connection::open(db_path)?;
    let mut statement = connection.prepare(
        "INSERT INTO Player (Name, Tag, Puuid, SummonerId, DiscordId, Streak, RegisteredAt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
    )?;
    statement.execute(rusqlite::params![
        player.name,
        player.tag,
        player.puuid,
        player.summoner_id,
        player.discord_id,
        player.streak,
        chrono::Local::now().to_rfc3339(),
    ])?;
    Ok(())
}

pub fn remove_player(db_path: &PathBuf, discord_id: &str) -> Result<()> {
    let connection = Connection::open(db_path)?;
    let mut statement = connection.prepare("DELETE FROM Player WHERE DiscordId = ?1;")?;
    statement.execute([discord_id])?;
    Ok(())
}

/// Persists the streak the monitor just computed. The registry value is the
/// authoritative "previous streak" for the next match.
pub fn update_streak(db_path: &PathBuf, puuid: &str, streak: i64) -> Result<()> {
    let connection = Connection::open(db_path)?;
    let mut statement = connection.prepare("UPDATE Player SET Streak = ?1 WHERE Puuid = ?2;")?;
    let updated = statement
        .execute(rusqlite::params![streak, puuid])
        .context("Failed to update the streak column")?;
    if updated == 0 {
        anyhow::bail!("no registry row for puuid {}", puuid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lol_rank_bot_test_{}.db", name));
        let _ = std::fs::remove_file(&path);
        init_db(&path).unwrap();
        path
    }

    fn player(name: &str, discord_id: &str) -> TrackedPlayer {
        TrackedPlayer {
            name: name.to_string(),
            tag: "JP1".to_string(),
            puuid: format!("puuid-{}", name),
            summoner_id: format!("summoner-{}", name),
            discord_id: discord_id.to_string(),
            streak: 0,
        }
    }

    #[test]
    fn registered_players_round_trip() {
        let path = temp_db("round_trip");
        add_player(&path, &player("alice", "111")).unwrap();
        add_player(&path, &player("bob", "222")).unwrap();

        let players = fetch_all_players(&path).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "alice");
        assert_eq!(players[0].streak, 0);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn streak_updates_persist() {
        let path = temp_db("streak");
        add_player(&path, &player("alice", "111")).unwrap();

        update_streak(&path, "puuid-alice", -4).unwrap();
        let players = fetch_all_players(&path).unwrap();
        assert_eq!(players[0].streak, -4);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn updating_an_unknown_puuid_fails() {
        let path = temp_db("unknown");
        assert!(update_streak(&path, "puuid-ghost", 1).is_err());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn removal_is_keyed_by_discord_id() {
        let path = temp_db("removal");
        add_player(&path, &player("alice", "111")).unwrap();
        add_player(&path, &player("bob", "222")).unwrap();

        remove_player(&path, "111").unwrap();
        let players = fetch_all_players(&path).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].discord_id, "222");

        std::fs::remove_file(&path).unwrap();
    }
}
