pub mod web_push;
