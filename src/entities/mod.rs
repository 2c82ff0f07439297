pub mod channels;
pub mod endpoints;
pub mod jobs;
pub mod messages;
pub mod notifications;
pub mod sessions;
pub mod users;
