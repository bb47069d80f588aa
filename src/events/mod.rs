pub mod message;
pub mod reaction;
pub mod voice_state;

use poise::serenity_prelude as serenity;
use tracing::info;

use crate::activity::ReactionDelta;
use crate::{Data, Error};

pub async fn handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            let activity = data.activity.lock().await;
            info!(
                "{} is connected, tracking activity for {} users",
                data_about_bot.user.name,
                activity.counters().user_count()
            );
        }
        serenity::FullEvent::Message { new_message } => {
            message::handle(new_message, data).await;
        }
        serenity::FullEvent::ReactionAdd { add_reaction } => {
            reaction::handle(ctx, add_reaction, ReactionDelta::Added, data).await?;
        }
        serenity::FullEvent::ReactionRemove { removed_reaction } => {
            reaction::handle(ctx, removed_reaction, ReactionDelta::Removed, data)
                .await?;
        }
        serenity::FullEvent::VoiceStateUpdate { old, new } => {
            voice_state::handle(ctx, old, new, data).await?;
        }
        serenity::FullEvent::ShardStageUpdate { event } => {
            if on_shard_stage(event.new, data).await {
                info!("shard {} disconnected, activity saved", event.shard_id.0);
            }
        }
        _ => {}
    }
    Ok(())
}

fn flushes_on(stage: serenity::ConnectionStage) -> bool {
    stage == serenity::ConnectionStage::Disconnected
}

/// Force a save when the shard drops, whether or not anything changed since
/// the last write. Returns whether a save was made.
async fn on_shard_stage(stage: serenity::ConnectionStage, data: &Data) -> bool {
    if !flushes_on(stage) {
        return false;
    }
    data.activity.lock().await.save();
    true
}

/// Bot flag for a user, preferring data already on the event or in the cache
/// over an HTTP lookup.
async fn is_bot(
    ctx: &serenity::Context,
    user_id: serenity::UserId,
    member: Option<&serenity::Member>,
) -> Result<bool, Error> {
    if let Some(member) = member {
        return Ok(member.user.bot);
    }

    let cached = ctx.cache.user(user_id).map(|user| user.bot);
    match cached {
        Some(bot) => Ok(bot),
        None => Ok(user_id.to_user(ctx).await?.bot),
    }
}
