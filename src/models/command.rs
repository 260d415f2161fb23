use std::sync::Arc;

use serenity::{
    all::{Member, Message, PartialGuild, Permissions},
    prelude::Context as IncomingContext,
};

use crate::{
    common::args::Args,
    models::{
        config::GuildConfig,
        handler::Handler,
        permissions::{self, Permission},
        response::{ResponseError, ResponseResult},
    },
    moderation::engine::{HierarchyContext, ModerationEngine},
};

use crate::common::hierarchy;

/// Everything a command handler needs for one invocation: the gateway
/// context, the invoking message and member, and a snapshot of the
/// guild's configuration taken at dispatch time.
pub struct CommandContext {
    pub ctx: IncomingContext,
    pub guild: PartialGuild,
    pub message: Message,
    pub member: Member,
    pub config: GuildConfig,
    pub engine: Arc<ModerationEngine>,
}

impl CommandContext {
    pub fn author_permissions(&self) -> Permissions {
        permissions::native_permissions(&self.guild, &self.member)
    }

    /// Gathers the three top-role positions the hierarchy check needs.
    pub async fn hierarchy_for(
        &self,
        target: &Member,
    ) -> Result<HierarchyContext, ResponseError> {
        let bot_id = self.ctx.cache.current_user().id;
        let bot_member = self
            .guild
            .id
            .member(&self.ctx.http, bot_id)
            .await
            .map_err(ResponseError::Serenity)?;

        Ok(HierarchyContext {
            actor_top: hierarchy::top_role_position(&self.guild, &self.member),
            bot_top: hierarchy::top_role_position(&self.guild, &bot_member),
            target_top: hierarchy::top_role_position(&self.guild, target),
        })
    }

    pub async fn fetch_member(&self, user_id: serenity::all::UserId) -> Option<Member> {
        self.guild.id.member(&self.ctx.http, user_id).await.ok()
    }
}

/// A prefix command. `required_permission` is the explicit metadata the
/// dispatcher consults before running the handler; commands without one
/// either pass `admin_only`/`owner_only` or run unguarded.
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    fn required_permission(&self) -> Option<Permission> {
        None
    }

    fn admin_only(&self) -> bool {
        false
    }

    fn owner_only(&self) -> bool {
        false
    }

    async fn run(&self, handler: &Handler, ctx: &CommandContext, args: &mut Args)
        -> ResponseResult;
}
