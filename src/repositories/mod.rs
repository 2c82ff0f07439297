pub mod attachments;
pub mod blocks;
pub mod channels;
pub mod endpoints;
pub mod jobs;
pub mod messages;
pub mod notifications;
pub mod rate_limits;
pub mod sessions;
pub mod unfurl;
pub mod users;
