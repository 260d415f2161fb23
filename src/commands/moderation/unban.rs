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

pub struct UnbanCommand;

#[async_trait::async_trait]
impl Command for UnbanCommand {
    fn name(&self) -> &'static str {
        "unban"
    }

    fn required_permission(&self) -> Option<Permission> {
        Some(Permission::BanMembers)
    }

    async fn run(
        &self,
        _handler: &Handler,
        ctx: &CommandContext,
        args: &mut Args,
    ) -> ResponseResult {
        let Some(user_id) = args.next_user_id() else {
            return Err(ResponseError::InvalidArgument(
                "Please provide the id of the user to unban.".to_string(),
            ));
        };

        let outcome = ctx
            .engine
            .reverse(
                ctx.guild.id,
                user_id,
                ReversibleAction::Ban,
                ctx.message.author.id,
                None,
            )
            .await?;

        match outcome {
            ReversalOutcome::Reversed => {
                ctx.say(format!("<@{}> has been unbanned.", user_id.get()))
                    .await
            }
            ReversalOutcome::NotCurrentlyApplied => {
                ctx.say(format!("<@{}> is not banned.", user_id.get())).await
            }
        }
    }
}
