pub mod guild_join;
pub mod message;
pub mod ready;
pub mod router;
pub mod voice;
