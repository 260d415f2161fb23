use serenity::builder::CreateEmbed;

use crate::{
    common::{args::Args, reply::CommandContextReply},
    models::{
        command::{Command, CommandContext},
        handler::Handler,
        permissions::Permission,
        response::{Response, ResponseError, ResponseResult},
    },
};

pub struct KickCommand;

#[async_trait::async_trait]
impl Command for KickCommand {
    fn name(&self) -> &'static str {
        "kick"
    }

    fn required_permission(&self) -> Option<Permission> {
        Some(Permission::KickMembers)
    }

    async fn run(
        &self,
        _handler: &Handler,
        ctx: &CommandContext,
        args: &mut Args,
    ) -> ResponseResult {
        let Some(user_id) = args.next_user_id() else {
            return Err(ResponseError::InvalidArgument(
                "Please provide a member to kick, as a mention or an id.".to_string(),
            ));
        };
        if user_id == ctx.message.author.id {
            return Err(ResponseError::Execution("You cannot kick yourself!", None));
        }

        let Some(target) = ctx.fetch_member(user_id).await else {
            return Err(ResponseError::InvalidArgument("Member not found.".to_string()));
        };

        let reason = args
            .rest()
            .unwrap_or_else(|| "No reason provided".to_string());

        let hierarchy = ctx.hierarchy_for(&target).await?;
        ctx.engine
            .kick(
                ctx.guild.id,
                user_id,
                hierarchy,
                &reason,
                ctx.message.author.id,
            )
            .await?;

        ctx.reply(
            Response::new().embed(
                CreateEmbed::new()
                    .title("User kicked")
                    .description(format!("<@{}> has been kicked.", user_id.get()))
                    .field("Reason", reason, true)
                    .field(
                        "Moderator",
                        format!("<@{}>", ctx.message.author.id.get()),
                        true,
                    )
                    .color(0xe67e22),
            ),
        )
        .await
    }
}
