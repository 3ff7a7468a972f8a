pub mod helpers;
pub mod moderation;
