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

pub struct UnjailCommand;

#[async_trait::async_trait]
impl Command for UnjailCommand {
    fn name(&self) -> &'static str {
        "unjail"
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
                "Please provide a member to unjail, as a mention or an id.".to_string(),
            ));
        };

        let outcome = ctx
            .engine
            .reverse(
                ctx.guild.id,
                user_id,
                ReversibleAction::Jail,
                ctx.message.author.id,
                None,
            )
            .await?;

        match outcome {
            ReversalOutcome::Reversed => {
                ctx.say(format!("<@{}> has been unjailed.", user_id.get()))
                    .await
            }
            ReversalOutcome::NotCurrentlyApplied => {
                ctx.say(format!("<@{}> is not jailed.", user_id.get())).await
            }
        }
    }
}
