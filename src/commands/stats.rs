use poise::CreateReply;

use crate::utils::embed;
use crate::{Context, Error};

async fn stats_impl(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let top = {
        let activity = data.activity.lock().await;
        activity.top_by_messages(data.stats_top_n)
    };

    ctx.send(CreateReply::default().embed(embed::server_stats(&top)))
        .await?;
    Ok(())
}

/// Display overall server statistics
#[poise::command(slash_command, guild_only)]
pub async fn stats(ctx: Context<'_>) -> Result<(), Error> {
    stats_impl(ctx).await
}
