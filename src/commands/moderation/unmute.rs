use crate::{
    common::{args::Args, reply::CommandContextReply},
    models::{
        command::{Command, CommandContext},
        handler::Handler,
        permissions::Permission,
        response::{ResponseError, ResponseResult},
    },
    moderation::{engine::ReversalOutcome, ReversibleAction},
};

pub struct UnmuteCommand;

#[async_trait::async_trait]
impl Command for UnmuteCommand {
    fn name(&self) -> &'static str {
        "unmute"
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
                "Please provide a member to unmute, as a mention or an id.".to_string(),
            ));
        };

        let outcome = ctx
            .engine
            .reverse(
                ctx.guild.id,
                user_id,
                ReversibleAction::Mute,
                ctx.message.author.id,
                None,
            )
            .await?;

        match outcome {
            ReversalOutcome::Reversed => {
                ctx.say(format!("<@{}> has been unmuted.", user_id.get()))
                    .await
            }
            ReversalOutcome::NotCurrentlyApplied => {
                ctx.say(format!("<@{}> is not muted.", user_id.get())).await
            }
        }
    }
}
