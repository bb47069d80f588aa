use poise::serenity_prelude as serenity;

use crate::Data;

pub async fn handle(msg: &serenity::Message, data: &Data) {
    let mut activity = data.activity.lock().await;
    activity.record_message(&msg.author.id.to_string(), msg.author.bot);
}
