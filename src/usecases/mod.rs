pub mod channels;
pub mod messages;
pub mod notifications;
pub mod sessions;
