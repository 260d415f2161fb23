pub mod alias;
pub mod fake_permissions;
pub mod prefix;
pub mod setup;
