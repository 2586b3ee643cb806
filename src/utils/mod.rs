pub mod config;
pub mod news_client;
pub mod state;
