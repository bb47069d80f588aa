use std::sync::Arc;

use activity_bot::activity::{self, ActivityLog, SnapshotStore};
use activity_bot::{commands, config, events, Data};
use poise::serenity_prelude as serenity;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // A snapshot that exists but does not parse stops startup instead of
    // being overwritten by the first save.
    let store = SnapshotStore::new(&config.activity_data_path);
    let activity = match ActivityLog::load(store, config.activity_policy) {
        Ok(log) => activity::new_shared(log),
        Err(e) => {
            tracing::error!("failed to load activity data: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(
        reaction_floor = ?config.activity_policy.reaction_floor,
        rejoin = %config.activity_policy.rejoin,
        "activity log ready"
    );

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let data_activity = Arc::clone(&activity);
    let almanax_path = config.almanax_data_path.clone();
    let stats_top_n = config.stats_top_n;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                tracing::info!("bot is ready");
                Ok(Data {
                    activity: data_activity,
                    almanax_path,
                    stats_top_n,
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .expect("failed to create client");

    let shard_manager = client.shard_manager.clone();
    let shutdown_activity = Arc::clone(&activity);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for shutdown signal: {e}");
            return;
        }
        tracing::info!("shutting down, saving activity");
        shutdown_activity.lock().await.save();
        shard_manager.shutdown_all().await;
    });

    if let Err(e) = client.start().await {
        tracing::error!("client error: {e}");
    }

    activity.lock().await.save();
}
