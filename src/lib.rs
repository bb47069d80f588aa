pub mod activity;
pub mod almanax;
pub mod commands;
pub mod config;
pub mod events;
pub mod utils;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub struct Data {
    pub activity: activity::SharedActivity,
    pub almanax_path: String,
    pub stats_top_n: usize,
}
