use std::str::FromStr;

use crate::activity::{Policy, ReactionFloor, RejoinPolicy};

/// Largest leaderboard that fits in one embed field with 18-digit ids.
pub const MAX_STATS_TOP_N: usize = 25;

pub struct Config {
    pub discord_token: String,
    pub activity_data_path: String,
    pub almanax_data_path: String,
    pub stats_top_n: usize,
    pub activity_policy: Policy,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            discord_token: std::env::var("DISCORD_TOKEN")
                .expect("DISCORD_TOKEN environment variable is required"),
            activity_data_path: std::env::var("ACTIVITY_DATA_PATH")
                .unwrap_or_else(|_| "activity_data.json".to_string()),
            almanax_data_path: std::env::var("ALMANAX_DATA_PATH")
                .unwrap_or_else(|_| "resources/year.json".to_string()),
            stats_top_n: clamp_top_n(parse_or_default("STATS_TOP_N", 10)),
            activity_policy: Policy {
                reaction_floor: parse_or_default("REACTION_FLOOR", ReactionFloor::default()),
                rejoin: parse_or_default("VOICE_REJOIN_POLICY", RejoinPolicy::default()),
            },
        }
    }
}

fn clamp_top_n(n: usize) -> usize {
    if n > MAX_STATS_TOP_N {
        tracing::warn!("STATS_TOP_N={n} is above {MAX_STATS_TOP_N}, clamping");
        MAX_STATS_TOP_N
    } else {
        n
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!("invalid {key}, using default: {e}");
            default
        }),
        Err(_) => default,
    }
}
