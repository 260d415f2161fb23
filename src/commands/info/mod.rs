use serenity::builder::CreateEmbed;

use crate::{
    common::{args::Args, reply::CommandContextReply},
    models::{
        command::{Command, CommandContext},
        handler::Handler,
        response::{Response, ResponseResult},
    },
};

pub struct HelpCommand;

#[async_trait::async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    async fn run(
        &self,
        _handler: &Handler,
        ctx: &CommandContext,
        _args: &mut Args,
    ) -> ResponseResult {
        let prefix = &ctx.config.prefix;

        let moderation = [
            format!("`{prefix}ban <user> [duration] [reason]` - Ban a user"),
            format!("`{prefix}unban <user_id>` - Unban a user"),
            format!("`{prefix}kick <user> [reason]` - Kick a user"),
            format!("`{prefix}mute <user> [duration] [reason]` - Mute a user"),
            format!("`{prefix}unmute <user>` - Unmute a user"),
            format!("`{prefix}jail <user> [duration] [reason]` - Jail a user"),
            format!("`{prefix}unjail <user>` - Unjail a user"),
        ];
        let setup = [
            format!("`{prefix}setupjail` - Set up the jail system"),
            format!("`{prefix}setupmute` - Set up the mute system"),
            format!("`{prefix}setuplogs` - Set up logging channels"),
            format!("`{prefix}prefix <set|remove|list> [new_prefix]` - Manage the bot prefix"),
            format!("`{prefix}fp <grant|remove|list> [role] [permission]` - Manage fake permissions"),
        ];
        let aliases = [
            format!("`{prefix}alias add <name> <command>` - Add a command alias"),
            format!("`{prefix}alias remove <name>` - Remove an alias"),
            format!("`{prefix}alias list` - List all aliases"),
            format!("`{prefix}alias removeall` - Remove all aliases"),
        ];
        let voice = [
            format!("`{prefix}vm` - Create a temporary voice channel"),
            format!("`{prefix}vm name <name>` - Rename your voice channel"),
            format!("`{prefix}vm limit <number>` - Set a user limit for your channel"),
            format!("`{prefix}vm lock` - Lock your voice channel"),
            format!("`{prefix}vm unlock` - Unlock your voice channel"),
        ];

        let mut embed = CreateEmbed::new()
            .title("Bot Commands")
            .description(format!("Prefix: `{prefix}`"))
            .field("Moderation", moderation.join("\n"), false)
            .field("Setup", setup.join("\n"), false)
            .field("Aliases", aliases.join("\n"), false)
            .field("VoiceMaster", voice.join("\n"), false)
            .color(0x3498db);

        if !ctx.config.aliases.is_empty() {
            let mut lines: Vec<String> = ctx
                .config
                .aliases
                .iter()
                .map(|(alias, command)| format!("`{prefix}{alias}` → `{prefix}{command}`"))
                .collect();
            lines.sort();
            embed = embed.field("Server Aliases", lines.join("\n"), false);
        }

        ctx.reply(Response::new().embed(embed)).await
    }
}
