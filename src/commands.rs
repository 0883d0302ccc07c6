pub mod lol_rank {
    use serenity::all::CommandDataOption;
    use serenity::all::CommandDataOptionValue;
    use serenity::all::CreateCommandOption;
    use serenity::all::UserId;
    use serenity::builder;
    use serenity::model::application::CommandOptionType;
    use serenity::prelude::Context;
    use std::sync::Arc;
    use tracing::error;

    use crate::rank::player_key;
    use crate::models::TrackedPlayer;
    use crate::{db, monitor, Bot};

    pub fn register() -> builder::CreateCommand {
        builder::CreateCommand::new("lol_rank")
            .description("Ranked win/loss notifications for tracked players.")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "register",
                    "Start ranked notifications for a player.",
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::User,
                        "user",
                        "The Discord user to notify for",
                    )
                    .required(true),
                )
                .add_sub_option(
                    CreateCommandOption::new(CommandOptionType::String, "name", "The in-game name")
                        .required(true),
                )
                .add_sub_option(
                    CreateCommandOption::new(CommandOptionType::String, "tag", "The riot id tag")
                        .required(true),
                ),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "unregister",
                    "Stop ranked notifications for a user.",
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::User,
                        "user",
                        "The Discord user to remove",
                    )
                    .required(true),
                ),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "list",
                "List tracked players with rank and streak.",
            ))
    }

    pub async fn run(ctx: &Context, options: &[CommandDataOption], bot: Arc<Bot>) -> String {
        let Some(subcommand) = options.first() else {
            return "No subcommand provided.".to_string();
        };
        let CommandDataOptionValue::SubCommand(sub_options) = &subcommand.value else {
            return "Expected a subcommand.".to_string();
        };
        match subcommand.name.as_str() {
            "register" => register_player(ctx, sub_options, &bot).await,
            "unregister" => unregister_player(sub_options, &bot).await,
            "list" => list_players(&bot).await,
            _ => "not implemented :(".to_string(),
        }
    }

    fn user_option(options: &[CommandDataOption]) -> Option<UserId> {
        options.iter().find(|o| o.name == "user").and_then(|o| match &o.value {
            CommandDataOptionValue::User(user_id) => Some(*user_id),
            _ => None,
        })
    }

    fn string_option<'a>(options: &'a [CommandDataOption], name: &str) -> Option<&'a str> {
        options.iter().find(|o| o.name == name).and_then(|o| match &o.value {
            CommandDataOptionValue::String(s) => Some(s.as_str()),
            _ => None,
        })
    }

    async fn register_player(ctx: &Context, options: &[CommandDataOption], bot: &Arc<Bot>) -> String {
        let Some(user_id) = user_option(options) else {
            return "Looks like no user was specified.".to_string();
        };
        let (Some(name), Some(tag)) = (string_option(options, "name"), string_option(options, "tag"))
        else {
            return "Both a name and a tag are required.".to_string();
        };
        let name = name.trim();
        let tag = tag.trim();
        if name.is_empty() || tag.is_empty() {
            return "Both a name and a tag are required.".to_string();
        }

        let user = match ctx.http.get_user(user_id).await {
            Ok(user) => user,
            Err(e) => {
                error!("could not look up user {}: {}", user_id, e);
                return "Unable to look up that Discord user.".to_string();
            }
        };
        let display_name = user.global_name.clone().unwrap_or_else(|| user.name.clone());

        let puuid = match bot.riot.fetch_puuid(name, tag).await {
            Ok(puuid) => puuid,
            Err(e) => {
                error!("could not resolve {}#{}: {}", name, tag, e);
                return format!("{}#{} does not exist.", name, tag);
            }
        };

        let players = match db::fetch_all_players(&bot.config.db_path) {
            Ok(players) => players,
            Err(e) => {
                error!("could not read the player registry: {:#}", e);
                return "The player registry is unavailable right now.".to_string();
            }
        };
        if players.iter().any(|p| p.discord_id == user_id.get().to_string()) {
            return format!(
                "{} is already registered. One account per person.",
                display_name
            );
        }
        if players.iter().any(|p| {
            p.name.eq_ignore_ascii_case(name) && p.tag.eq_ignore_ascii_case(tag)
        }) {
            return format!("{}#{} is already registered.", name, tag);
        }

        let summoner_id = match bot.riot.fetch_summoner_id(&puuid).await {
            Ok(id) => id,
            Err(e) => {
                error!("could not resolve a summoner id for {}#{}: {}", name, tag, e);
                return format!("{}#{} does not exist.", name, tag);
            }
        };

        let player = TrackedPlayer {
            name: name.to_string(),
            tag: tag.to_string(),
            puuid,
            summoner_id,
            discord_id: user_id.get().to_string(),
            streak: 0,
        };
        if let Err(e) = db::add_player(&bot.config.db_path, &player) {
            error!("could not add {} to the registry: {:#}", player.key(), e);
            return "The player could not be saved.".to_string();
        }

        monitor::start(bot, &player).await;
        format!("Registered {} as {}.", display_name, player.key())
    }

    async fn unregister_player(options: &[CommandDataOption], bot: &Arc<Bot>) -> String {
        let Some(user_id) = user_option(options) else {
            return "Looks like no user was specified.".to_string();
        };

        let players = match db::fetch_all_players(&bot.config.db_path) {
            Ok(players) => players,
            Err(e) => {
                error!("could not read the player registry: {:#}", e);
                return "The player registry is unavailable right now.".to_string();
            }
        };
        let Some(player) = players
            .iter()
            .find(|p| p.discord_id == user_id.get().to_string())
        else {
            return "That user is not registered.".to_string();
        };

        if let Err(e) = db::remove_player(&bot.config.db_path, &player.discord_id) {
            error!("could not remove {} from the registry: {:#}", player.key(), e);
            return "The player could not be removed.".to_string();
        }
        monitor::stop(bot, &player.name, &player.tag, &player.puuid).await;
        format!("Unregistered {}.", player.key())
    }

    async fn list_players(bot: &Arc<Bot>) -> String {
        let players = match db::fetch_all_players(&bot.config.db_path) {
            Ok(players) => players,
            Err(e) => {
                error!("could not read the player registry: {:#}", e);
                return "The player registry is unavailable right now.".to_string();
            }
        };
        if players.is_empty() {
            return "No players are registered.".to_string();
        }

        let mut lines = Vec::new();
        for player in &players {
            let key = player_key(&player.name, &player.tag);
            let rank = match bot.rank_store.get(&key).await {
                Some(rank) => rank.label(),
                None => "Unranked".to_string(),
            };
            lines.push(format!("{}  {}  streak {}", key, rank, player.streak));
        }
        lines.join("\n")
    }
}

pub mod dice {
    use anyhow::{anyhow, Result};
    use rand::{thread_rng, Rng};
    use regex::Regex;
    use serenity::all::CommandDataOption;
    use serenity::all::CommandDataOptionValue;
    use serenity::all::CreateCommandOption;
    use serenity::builder;
    use serenity::model::application::CommandOptionType;

    const MAX_DICE_PER_GROUP: i64 = 100;
    const MAX_DICE_SIDES: i64 = 1000;
    const MAX_GROUPS: usize = 10;

    pub fn register() -> builder::CreateCommand {
        builder::CreateCommand::new("dice")
            .description("Rolls dice.")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "expression",
                    "NdM groups joined with +, for example 1d100 or 2d6+1d20",
                )
                .required(true),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::Boolean,
                "secret",
                "Show the result only to you",
            ))
    }

    /// The bool is the ephemeral flag: secret rolls are shown only to the
    /// caller.
    pub fn run(options: &[CommandDataOption]) -> (String, bool) {
        let expression = options
            .iter()
            .find(|o| o.name == "expression")
            .and_then(|o| match &o.value {
                CommandDataOptionValue::String(s) => Some(s.as_str()),
                _ => None,
            })
            .unwrap_or("");
        let secret = options
            .iter()
            .any(|o| o.name == "secret" && matches!(o.value, CommandDataOptionValue::Boolean(true)));
        let content = match roll_dice(expression, &mut thread_rng()) {
            Ok(message) => message,
            Err(e) => e.to_string(),
        };
        (content, secret)
    }

    pub fn roll_dice<R: Rng>(expression: &str, rng: &mut R) -> Result<String> {
        let pattern = Regex::new(r"^(\d+)d(\d+)$").unwrap();

        if expression.split('+').count() > MAX_GROUPS {
            return Err(anyhow!("That's too many dice groups for one roll."));
        }

        let mut total: i64 = 0;
        let mut groups = Vec::new();
        for part in expression.split('+') {
            let Some(caps) = pattern.captures(part.trim()) else {
                return Err(anyhow!("Invalid format. Use NdM, for example 2d6."));
            };
            let count: i64 = caps[1].parse()?;
            let sides: i64 = caps[2].parse()?;
            if count < 1 || sides < 1 {
                return Err(anyhow!("Dice count and sides must both be at least 1."));
            }
            if count > MAX_DICE_PER_GROUP {
                return Err(anyhow!("That's too many dice for one roll."));
            }
            if sides > MAX_DICE_SIDES {
                return Err(anyhow!("That's too many sides for one die."));
            }

            let rolls: Vec<i64> = (0..count).map(|_| rng.gen_range(1..=sides)).collect();
            total += rolls.iter().sum::<i64>();
            groups.push(format!(
                "({})",
                rolls
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join(" + ")
            ));
        }

        Ok(format!("{} → {} = {}", expression.trim(), groups.join(" + "), total))
    }

}
