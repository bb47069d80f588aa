use poise::serenity_prelude as serenity;

use crate::activity::ReactionDelta;
use crate::{Data, Error};

pub async fn handle(
    ctx: &serenity::Context,
    reaction: &serenity::Reaction,
    delta: ReactionDelta,
    data: &Data,
) -> Result<(), Error> {
    // Reactions from webhooks carry no user.
    let Some(user_id) = reaction.user_id else {
        return Ok(());
    };

    let is_bot = super::is_bot(ctx, user_id, reaction.member.as_ref()).await?;

    let mut activity = data.activity.lock().await;
    activity.record_reaction(&user_id.to_string(), is_bot, delta);
    Ok(())
}
