use std::sync::Arc;

use serenity::all::{ChannelId, Colour, CreateEmbed, CreateMessage};
use tracing::{error, info};

use crate::models::{RankSnapshot, Status, TrackedPlayer};
use crate::twitter::SocialClient;

const WIN_COLOUR: Colour = Colour(0x57F287);
const LOSS_COLOUR: Colour = Colour(0xED4245);

/// Flavor lines indexed by kill count, clamped to the last entry.
const WIN_LINES: [&str; 11] = [
    "Zero kills and still a win? Enjoy the bus ride.",
    "One whole kill. Carried in style.",
    "Two kills. The team did the heavy lifting.",
    "Three kills. Respectable freeloading.",
    "Four kills. Almost pulling your weight.",
    "Five kills! Now we're talking.",
    "Six kills. Certified menace.",
    "Seven kills. The enemy jungler is uninstalling.",
    "Eight kills. Leave some for the rest of the lobby.",
    "Nine kills. Absolute unit.",
    "Double digits. Bow before the carry.",
];

const LOSS_LINES: [&str; 11] = [
    "Zero kills. Were you even in the game?",
    "One kill and a loss. Pure deadweight.",
    "Two kills. The scoreboard called, it wants answers.",
    "Three kills and still down bad.",
    "Four kills, zero impact.",
    "Five kills wasted. Tragic.",
    "Six kills and a loss? Team diff, allegedly.",
    "Seven kills thrown away. Painful to watch.",
    "Eight kills and it still wasn't enough.",
    "Nine kills. Carried so hard and dropped at the finish line.",
    "Ten plus kills in a loss. That's a highlight reel of despair.",
];

pub fn flavor_line(win: bool, kills: i64) -> &'static str {
    let lines = if win { &WIN_LINES } else { &LOSS_LINES };
    let index = kills.clamp(0, lines.len() as i64 - 1) as usize;
    lines[index]
}

/// Formats and dispatches the three notification kinds. Channel delivery is
/// the primary guarantee; the tweet mirror is best effort and never blocks
/// or fails a notification.
pub struct Notifier {
    discord: Arc<serenity::http::Http>,
    channel_id: ChannelId,
    social: SocialClient,
}

impl Notifier {
    pub fn new(discord: Arc<serenity::http::Http>, channel_id: ChannelId, social: SocialClient) -> Self {
        Notifier {
            discord,
            channel_id,
            social,
        }
    }

    async fn send(&self, content: &str, embed: CreateEmbed) {
        let message = CreateMessage::new().content(content).embed(embed);
        match self.discord.send_message(self.channel_id, vec![], &message).await {
            Ok(sent) => info!("notification sent: {}", sent.id),
            Err(e) => error!("could not send notification: {}", e),
        }
    }

    pub async fn send_match_result(
        &self,
        player: &TrackedPlayer,
        win: bool,
        status: &Status,
        rank: Option<&RankSnapshot>,
    ) {
        let key = player.key();
        let title = flavor_line(win, status.kills);
        let result = if win { "Victory" } else { "Defeat" };

        let mut embed = CreateEmbed::new()
            .title(title)
            .colour(if win { WIN_COLOUR } else { LOSS_COLOUR })
            .description("Latest ranked solo queue result")
            .field("Player", key.clone(), true)
            .field("Result", result, true)
            .field("Champion", status.champion.clone(), true)
            .field("Lane", status.lane.clone(), true)
            .field("Items", status.item_names.join("\n"), false)
            .field("CS", status.cs.to_string(), true)
            .field("KDA", status.kda.clone(), true)
            .field("Damage", status.damage.to_string(), true)
            .thumbnail(status.champion_icon.clone());
        if let Some(rank) = rank {
            embed = embed
                .field("Win rate", format!("{:.0}%", rank.win_rate()), true)
                .field(
                    "Rank",
                    format!("{} ({} LP)", rank.label(), rank.league_points),
                    true,
                );
        }
        self.send("", embed).await;

        let text = format!(
            "{} just {} a ranked game! {} {} | {} | {} CS | {} damage",
            key,
            if win { "won" } else { "lost" },
            title,
            status.champion,
            status.kda,
            status.cs,
            status.damage
        );
        self.social
            .post(&format!("{} #LoL #LeagueOfLegends", text))
            .await;
    }

    pub async fn send_streak_milestone(&self, player: &TrackedPlayer, streak: i64) {
        let key = player.key();
        let winning = streak > 0;
        let count = streak.abs();

        let message = if winning {
            format!(
                "Hey everyone! {} is on a {}-game winning streak! Unstoppable!",
                key, count
            )
        } else {
            format!(
                "Hey everyone! {} is on a {}-game losing streak. Maybe ranked isn't the place today?",
                key, count
            )
        };
        let embed = CreateEmbed::new()
            .title(format!(
                "{}-game {} streak",
                count,
                if winning { "winning" } else { "losing" }
            ))
            .colour(if winning { WIN_COLOUR } else { LOSS_COLOUR })
            .description(message.clone());

        self.send("@everyone", embed).await;
        self.social
            .post(&format!("{} #LoL #LeagueOfLegends", message))
            .await;
    }

    pub async fn send_rank_change(
        &self,
        player: &TrackedPlayer,
        previous: &RankSnapshot,
        current: &RankSnapshot,
        promotion: bool,
    ) {
        let key = player.key();
        let message = format!(
            "{} was {} from {} to {}!",
            key,
            if promotion { "promoted" } else { "demoted" },
            previous.label(),
            current.label()
        );
        let embed = CreateEmbed::new()
            .title("Rank update")
            .colour(if promotion { WIN_COLOUR } else { LOSS_COLOUR })
            .thumbnail(format!(
                "https://static.bigbrain.gg/assets/lol/ranks/s13/{}.png",
                current.tier.to_string().to_lowercase()
            ))
            .description(message.clone());

        // Promotions ping narrower than demotions; the shame must travel.
        self.send(if promotion { "@here" } else { "@everyone" }, embed)
            .await;
        self.social
            .post(&format!("{} #LoL #LeagueOfLegends", message))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flavor_lines_are_indexed_by_kills() {
        assert_eq!(flavor_line(true, 0), WIN_LINES[0]);
        assert_eq!(flavor_line(true, 5), WIN_LINES[5]);
        assert_eq!(flavor_line(false, 3), LOSS_LINES[3]);
    }

    #[test]
    fn kill_counts_past_the_list_clamp_to_the_last_line() {
        assert_eq!(flavor_line(true, 10), WIN_LINES[10]);
        assert_eq!(flavor_line(true, 27), WIN_LINES[10]);
        assert_eq!(flavor_line(false, 99), LOSS_LINES[10]);
    }

    #[test]
    fn negative_kill_counts_clamp_to_the_first_line() {
        assert_eq!(flavor_line(true, -1), WIN_LINES[0]);
    }
}
