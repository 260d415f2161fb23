use serenity::builder::CreateEmbed;

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

pub struct MuteCommand;

#[async_trait::async_trait]
impl Command for MuteCommand {
    fn name(&self) -> &'static str {
        "mute"
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
                "Please provide a member to mute, as a mention or an id.".to_string(),
            ));
        };
        if user_id == ctx.message.author.id {
            return Err(ResponseError::Execution("You cannot mute yourself!", None));
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
            .apply_mute(
                ctx.guild.id,
                user_id,
                hierarchy,
                &duration,
                &reason,
                ctx.message.author.id,
            )
            .await?;

        let mut description = format!("<@{}> has been muted.", user_id.get());
        if let Some(warning) = duration_warning {
            description.push_str(&format!("\n*{warning}*"));
        }

        ctx.reply(
            Response::new().embed(
                CreateEmbed::new()
                    .title("User muted")
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
                    .color(0xf1c40f),
            ),
        )
        .await
    }
}
