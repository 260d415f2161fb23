use serenity::builder::CreateMessage;
use tracing::debug;

use crate::models::{
    command::CommandContext,
    response::{Response, ResponseError, ResponseResult},
};

#[async_trait::async_trait]
pub trait CommandContextReply {
    async fn reply(&self, response: Response) -> ResponseResult;
    async fn say(&self, content: impl Into<String> + Send) -> ResponseResult;
}

#[async_trait::async_trait]
impl CommandContextReply for CommandContext {
    async fn reply(&self, response: Response) -> ResponseResult {
        let start = std::time::Instant::now();

        let mut message = CreateMessage::new();
        if let Some(content) = response.content {
            message = message.content(content);
        }
        if let Some(embeds) = response.embeds {
            message = message.embeds(embeds);
        }

        if let Err(err) = self
            .message
            .channel_id
            .send_message(&self.ctx.http, message)
            .await
        {
            return Err(ResponseError::Serenity(err));
        }

        debug!("Took {:?} to reply to a command", start.elapsed());
        Ok(())
    }

    async fn say(&self, content: impl Into<String> + Send) -> ResponseResult {
        self.reply(Response::new().content(content.into())).await
    }
}
