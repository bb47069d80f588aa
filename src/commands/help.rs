use poise::CreateReply;
use serenity::builder::CreateEmbed;

use crate::{Context, Error};

async fn help_impl(ctx: Context<'_>) -> Result<(), Error> {
    let activity_cmds = "\
`/stats` — top users by messages sent
`/userstats` — messages, reactions and voice time for one user";

    let almanax_cmds = "\
`/almanax` — almanax bonus and offering for a date (YYYY-MM-DD, default today)";

    let embed = CreateEmbed::new()
        .title("Help")
        .field("Activity", activity_cmds, false)
        .field("Almanax", almanax_cmds, false)
        .color(0x5865F2);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show the available commands
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    help_impl(ctx).await
}
