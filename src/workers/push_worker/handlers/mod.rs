pub mod push;
pub mod unfurl;
