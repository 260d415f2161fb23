use strum::IntoEnumIterator;

use crate::{
    common::{args::Args, reply::CommandContextReply},
    models::{
        command::{Command, CommandContext},
        handler::Handler,
        permissions::Permission,
        response::{ResponseError, ResponseResult},
    },
};

fn valid_permission_names() -> String {
    Permission::iter()
        .map(|permission| format!("`{permission}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct FakePermissionsCommand;

#[async_trait::async_trait]
impl Command for FakePermissionsCommand {
    fn name(&self) -> &'static str {
        "fp"
    }

    fn admin_only(&self) -> bool {
        true
    }

    async fn run(
        &self,
        handler: &Handler,
        ctx: &CommandContext,
        args: &mut Args,
    ) -> ResponseResult {
        let action = args.next();

        match action.as_deref() {
            Some("list") => {
                let config = handler.store.get_guild(ctx.guild.id).await?;
                if config.fake_permissions.is_empty() {
                    return ctx.say("No fake permissions set.").await;
                }

                let mut lines = vec!["Current Fake Permissions:".to_string()];
                for (role_id, granted) in &config.fake_permissions {
                    let role_name = role_id
                        .parse::<u64>()
                        .ok()
                        .and_then(|id| ctx.guild.roles.get(&serenity::all::RoleId::new(id)))
                        .map_or_else(
                            || format!("Role ID: {role_id}"),
                            |role| role.name.clone(),
                        );
                    lines.push(format!("{role_name}: {}", granted.join(", ")));
                }
                ctx.say(lines.join("\n")).await
            }
            Some("grant") => {
                let Some(role_id) = args.next_role_id() else {
                    return Err(ResponseError::InvalidArgument(
                        "Please mention a valid role.".to_string(),
                    ));
                };
                if !ctx.guild.roles.contains_key(&role_id) {
                    return Err(ResponseError::InvalidArgument(
                        "Please mention a valid role.".to_string(),
                    ));
                }

                let permission = match args.next().as_deref().map(str::parse::<Permission>) {
                    Some(Ok(permission)) => permission,
                    _ => {
                        return Err(ResponseError::InvalidArgument(format!(
                            "Invalid permission. Valid permissions are:\n{}",
                            valid_permission_names()
                        )));
                    }
                };

                handler
                    .store
                    .update_guild(ctx.guild.id, |config| {
                        let granted = config
                            .fake_permissions
                            .entry(role_id.to_string())
                            .or_default();
                        let name = permission.as_str().to_string();
                        if !granted.contains(&name) {
                            granted.push(name);
                        }
                    })
                    .await?;

                let role_name = ctx
                    .guild
                    .roles
                    .get(&role_id)
                    .map_or_else(|| role_id.to_string(), |role| role.name.clone());
                ctx.say(format!("Granted `{permission}` to {role_name}"))
                    .await
            }
            Some("remove") => {
                let Some(role_id) = args.next_role_id() else {
                    return Err(ResponseError::InvalidArgument(
                        "Please mention a valid role.".to_string(),
                    ));
                };

                let role_name = ctx
                    .guild
                    .roles
                    .get(&role_id)
                    .map_or_else(|| role_id.to_string(), |role| role.name.clone());

                match args.next() {
                    Some(permission_name) => {
                        let removed = handler
                            .store
                            .update_guild(ctx.guild.id, |config| {
                                let key = role_id.to_string();
                                let mut removed = false;
                                if let Some(granted) = config.fake_permissions.get_mut(&key) {
                                    let before = granted.len();
                                    granted.retain(|name| *name != permission_name);
                                    removed = granted.len() != before;
                                    if granted.is_empty() {
                                        config.fake_permissions.remove(&key);
                                    }
                                }
                                removed
                            })
                            .await?;

                        if removed {
                            ctx.say(format!("Removed `{permission_name}` from {role_name}"))
                                .await
                        } else {
                            ctx.say(format!(
                                "Permission `{permission_name}` not found for this role."
                            ))
                            .await
                        }
                    }
                    None => {
                        let removed = handler
                            .store
                            .update_guild(ctx.guild.id, |config| {
                                config.fake_permissions.remove(&role_id.to_string()).is_some()
                            })
                            .await?;

                        if removed {
                            ctx.say(format!("Removed all fake permissions for {role_name}"))
                                .await
                        } else {
                            ctx.say("No fake permissions found for this role.").await
                        }
                    }
                }
            }
            _ => {
                let prefix = &ctx.config.prefix;
                ctx.say(format!(
                    "Usage:\n`{prefix}fp grant <role> <permission>`\n`{prefix}fp remove <role> [permission]`\n`{prefix}fp list`"
                ))
                .await
            }
        }
    }
}
