use serenity::builder::CreateEmbed;

use crate::{
    common::hierarchy::HierarchyDenial, moderation::platform::PlatformError,
    storage::store::StorageError,
};

pub struct Response {
    pub content: Option<String>,
    pub embeds: Option<Vec<CreateEmbed>>,
}

impl Response {
    pub fn new() -> Self {
        Response {
            content: None,
            embeds: None,
        }
    }

    pub fn content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }

    pub fn embed(mut self, embed: CreateEmbed) -> Self {
        self.embeds = Some(vec![embed]);
        self
    }
}

/// Everything a command can fail with. The dispatcher renders exactly one
/// user-facing message per error; only storage and unclassified errors
/// are additionally logged at the process level.
#[derive(Debug)]
pub enum ResponseError {
    Storage(StorageError),
    PermissionDenied(String),
    Platform(PlatformError),
    InvalidArgument(String),
    Execution(&'static str, Option<String>),
    Serenity(serenity::Error),
}

pub type ResponseResult = Result<(), ResponseError>;

impl ResponseError {
    /// The single message shown to the invoker. Stack traces and internal
    /// detail never leave the process log.
    pub fn user_message(&self) -> String {
        match self {
            ResponseError::Storage(_) => {
                "An unexpected error occurred while saving the server configuration.".to_string()
            }
            ResponseError::PermissionDenied(reason) => reason.clone(),
            ResponseError::Platform(PlatformError::Forbidden) => {
                "I don't have permission to do that. Move the bot's role higher or check its permissions."
                    .to_string()
            }
            ResponseError::Platform(PlatformError::NotFound) => {
                "The requested user, role, or channel could not be found.".to_string()
            }
            ResponseError::Platform(PlatformError::Other(_)) | ResponseError::Serenity(_) => {
                "An unexpected error occurred.".to_string()
            }
            ResponseError::InvalidArgument(detail) => detail.clone(),
            ResponseError::Execution(title, detail) => match detail {
                Some(detail) => format!("{title} {detail}"),
                None => (*title).to_string(),
            },
        }
    }
}

impl From<StorageError> for ResponseError {
    fn from(value: StorageError) -> Self {
        ResponseError::Storage(value)
    }
}

impl From<PlatformError> for ResponseError {
    fn from(value: PlatformError) -> Self {
        ResponseError::Platform(value)
    }
}

impl From<serenity::Error> for ResponseError {
    fn from(value: serenity::Error) -> Self {
        ResponseError::Serenity(value)
    }
}

impl From<HierarchyDenial> for ResponseError {
    fn from(value: HierarchyDenial) -> Self {
        ResponseError::PermissionDenied(value.to_string())
    }
}
