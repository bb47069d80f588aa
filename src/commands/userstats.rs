use poise::serenity_prelude as serenity;
use poise::CreateReply;

use crate::utils::embed;
use crate::{Context, Error};

async fn userstats_impl(ctx: Context<'_>, user: serenity::User) -> Result<(), Error> {
    let stats = {
        let activity = ctx.data().activity.lock().await;
        activity.snapshot_for(&user.id.to_string())
    };

    ctx.send(
        CreateReply::default()
            .embed(embed::user_stats(user.display_name(), &stats))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Display statistics for a specific user
#[poise::command(slash_command, guild_only)]
pub async fn userstats(
    ctx: Context<'_>,
    #[description = "The user to display statistics for"] user: serenity::User,
) -> Result<(), Error> {
    userstats_impl(ctx, user).await
}
