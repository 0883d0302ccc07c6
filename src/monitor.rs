use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::models::{RankSnapshot, TrackedPlayer};
use crate::rank::player_key;
use crate::streak::{is_milestone, next_streak};
use crate::{db, matches, Bot};

/// Effective retry period too: a failed tick just waits for the next one.
pub const POLL_PERIOD: Duration = Duration::from_secs(5 * 60);

/// One polling task per tracked player, keyed by `name#tag`. At most one
/// task per key; ticks for a player never overlap because each task awaits
/// its own tick body before sleeping again.
pub struct MonitorRegistry {
    timers: RwLock<HashMap<String, JoinHandle<()>>>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        MonitorRegistry {
            timers: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MonitorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Arms the recurring poll for the player and seeds the stores from inside
/// the spawned task. A second start for the same key is a logged no-op.
pub async fn start(bot: &Arc<Bot>, player: &TrackedPlayer) {
    let key = player.key();

    // The write lock only guards the check-and-insert; seeding runs inside
    // the task so a stalled fetch never wedges the registry for other
    // start/stop calls.
    let mut timers = bot.monitors.timers.write().await;
    if timers.contains_key(&key) {
        info!("{} is already being monitored", key);
        return;
    }
    info!("starting ranked monitor for {}", key);

    let task_bot = Arc::clone(bot);
    let task_player = player.clone();
    let handle = tokio::spawn(async move {
        // Seeding failures are logged inside the stores; monitoring
        // proceeds with whatever state could be fetched.
        let task_player_key = task_player.key();
        futures::join!(
            task_bot.match_store.initialize(&task_bot.riot, &task_player.puuid),
            task_bot
                .rank_store
                .initialize(&task_bot.riot, &task_player.summoner_id, &task_player_key),
        );

        // First tick one full period after start; the seeded state already
        // covers "now".
        let mut interval = time::interval_at(Instant::now() + POLL_PERIOD, POLL_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            process_match(&task_bot, &task_player).await;
        }
    });
    timers.insert(key, handle);
}

/// Cancels the player's poll and clears both stores. An in-flight tick may
/// still finish, but with the store entries gone a later start begins clean.
pub async fn stop(bot: &Bot, name: &str, tag: &str, puuid: &str) {
    let key = player_key(name, tag);
    let handle = bot.monitors.timers.write().await.remove(&key);
    match handle {
        Some(handle) => {
            handle.abort();
            bot.rank_store.delete(&key).await;
            bot.match_store.forget(puuid).await;
            info!("stopped monitoring {}", key);
        }
        None => info!("{} is not currently monitored", key),
    }
}

/// Called once the gateway is ready: every registered player gets a monitor.
pub async fn start_all(bot: &Arc<Bot>) {
    match db::fetch_all_players(&bot.config.db_path) {
        Ok(players) => {
            for player in players {
                start(bot, &player).await;
            }
        }
        Err(e) => error!("could not enumerate registered players: {:#}", e),
    }
}

/// One poll tick. Any failure logs and abandons the tick; the player's
/// monitoring and the process itself are never taken down from here.
async fn process_match(bot: &Arc<Bot>, player: &TrackedPlayer) {
    let key = player.key();

    let match_id = match bot.riot.fetch_latest_match_id(&player.puuid).await {
        Ok(id) => id,
        Err(e) => {
            error!("could not fetch the latest match id for {}: {}", key, e);
            return;
        }
    };
    let detail = match bot.riot.fetch_match_detail(&match_id).await {
        Ok(detail) => detail,
        Err(e) => {
            error!("could not fetch match {} for {}: {}", match_id, key, e);
            return;
        }
    };

    // The common case: nothing new since the last tick.
    if !bot.match_store.is_new_match(&match_id, &player.puuid, &detail).await {
        return;
    }
    bot.match_store.record_seen(&match_id, &player.puuid).await;

    let status = match matches::build_status(&bot.riot, &bot.cache, &detail, &player.puuid).await {
        Ok(status) => status,
        Err(e) => {
            error!("could not build a status for {} in {}: {:#}", key, match_id, e);
            return;
        }
    };
    let win = match matches::find_participant(&detail, &player.puuid) {
        Some(participant) => participant.win,
        None => {
            error!("participant {} missing from match {}", player.puuid, match_id);
            return;
        }
    };

    // A rank fetch failure must not swallow the match notification; fall
    // back to the stored snapshot and skip only the rank-change check.
    let fetched_rank = match bot.riot.fetch_rank(&player.summoner_id).await {
        Ok(rank) => Some(rank),
        Err(e) => {
            error!("could not fetch the current rank for {}: {}", key, e);
            None
        }
    };
    let display_rank = match &fetched_rank {
        Some(rank) => Some(rank.clone()),
        None => bot.rank_store.get(&key).await,
    };

    bot.notifier
        .send_match_result(player, win, &status, display_rank.as_ref())
        .await;

    process_streak(bot, player, win).await;

    if let Some(current) = fetched_rank {
        process_rank_change(bot, player, &key, current).await;
    }
}

/// Reads the authoritative streak from the registry, persists the updated
/// value, and announces milestones.
async fn process_streak(bot: &Bot, player: &TrackedPlayer, win: bool) {
    let players = match db::fetch_all_players(&bot.config.db_path) {
        Ok(players) => players,
        Err(e) => {
            error!("could not read the player registry: {:#}", e);
            return;
        }
    };
    let Some(record) = players.iter().find(|p| p.puuid == player.puuid) else {
        error!("{} is missing from the player registry", player.key());
        return;
    };

    let streak = next_streak(record.streak, win);
    if let Err(e) = db::update_streak(&bot.config.db_path, &player.puuid, streak) {
        error!("could not persist streak {} for {}: {:#}", streak, player.key(), e);
        return;
    }

    if is_milestone(streak) {
        bot.notifier.send_streak_milestone(player, streak).await;
    }
}

async fn process_rank_change(
    bot: &Bot,
    player: &TrackedPlayer,
    key: &str,
    current: RankSnapshot,
) {
    let Some(previous) = bot.rank_store.get(key).await else {
        error!("no previous rank snapshot for {}", key);
        return;
    };

    if bot.rank_store.has_changed(key, &current).await {
        let promotion = bot.rank_store.is_promotion(key, &current).await;
        bot.notifier
            .send_rank_change(player, &previous, &current, promotion)
            .await;
        bot.rank_store.set(key, current).await;
    }
}
