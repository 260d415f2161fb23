use serenity::builder::{CreateEmbed, CreateMessage};
use tracing::debug;

use crate::{
    commands::moderation::take_duration,
    common::{args::Args, reply::CommandContextReply},
    models::{
        command::{Command, CommandContext},
        handler::Handler,
        permissions::Permission,
        response::{Response, ResponseError, ResponseResult},
    },
};

pub struct JailCommand;

#[async_trait::async_trait]
impl Command for JailCommand {
    fn name(&self) -> &'static str {
        "jail"
    }

    fn required_permission(&self) -> Option<Permission> {
        Some(Permission::ManageMessages)
    }

    async fn run(
        &self,
        _handler: &Handler,
        ctx: &CommandContext,
        args: &mut Args,
    ) -> ResponseResult {
        let Some(user_id) = args.next_user_id() else {
            return Err(ResponseError::InvalidArgument(
                "Please provide a member to jail, as a mention or an id.".to_string(),
            ));
        };
        if user_id == ctx.message.author.id {
            return Err(ResponseError::Execution("You cannot jail yourself!", None));
        }

        let Some(target) = ctx.fetch_member(user_id).await else {
            return Err(ResponseError::InvalidArgument("Member not found.".to_string()));
        };

        let (duration, duration_warning) = take_duration(args);
        let reason = args
            .rest()
            .unwrap_or_else(|| "No reason provided".to_string());

        let hierarchy = ctx.hierarchy_for(&target).await?;
        let applied = ctx
            .engine
            .apply_jail(
                ctx.guild.id,
                user_id,
                hierarchy,
                &duration,
                &reason,
                ctx.message.author.id,
            )
            .await?;

        // Announce inside the jail channel so the jailed member, who can
        // no longer see anything else, knows what happened.
        if let Some(jail) = &ctx.config.jail {
            let mut embed = CreateEmbed::new()
                .title("🔒 Jailed")
                .description(format!("**Reason:** {reason}"))
                .field(
                    "Jailed By",
                    format!("<@{}>", ctx.message.author.id.get()),
                    true,
                )
                .color(0xe74c3c);
            if !duration.permanent {
                embed = embed.field("Duration", duration.human(), true);
            }

            if let Err(err) = jail
                .jail_channel_id
                .send_message(
                    &ctx.ctx.http,
                    CreateMessage::new()
                        .content(format!("<@{}> has been jailed.", user_id.get()))
                        .embed(embed),
                )
                .await
            {
                debug!("Failed to announce jail in guild {}: {err}", ctx.guild.id);
            }
        }

        let mut description = format!(
            "<@{}> has been jailed for {}.",
            user_id.get(),
            duration.human()
        );
        if let Some(warning) = duration_warning {
            description.push_str(&format!("\n*{warning}*"));
        }

        ctx.reply(
            Response::new().embed(
                CreateEmbed::new()
                    .title("User jailed")
                    .description(description)
                    .field("Reason", reason, true)
                    .field(
                        "Moderator",
                        format!("<@{}>", ctx.message.author.id.get()),
                        true,
                    )
                    .field(
                        "Expires",
                        match applied.expiry {
                            Some(expiry) => format!("<t:{}:F>", expiry.unix_timestamp()),
                            None => "Never".to_string(),
                        },
                        true,
                    )
                    .color(0xe74c3c),
            ),
        )
        .await
    }
}
