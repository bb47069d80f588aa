use chrono::Utc;
use poise::serenity_prelude as serenity;

use crate::{Data, Error};

/// Movement between "in no voice channel" and "in some voice channel".
/// Channel switches and mute/deafen updates are not transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceTransition {
    Joined,
    Left,
}

impl VoiceTransition {
    pub fn classify(
        before: Option<serenity::ChannelId>,
        after: Option<serenity::ChannelId>,
    ) -> Option<Self> {
        match (before, after) {
            (None, Some(_)) => Some(Self::Joined),
            (Some(_), None) => Some(Self::Left),
            _ => None,
        }
    }
}

pub async fn handle(
    ctx: &serenity::Context,
    old: &Option<serenity::VoiceState>,
    new: &serenity::VoiceState,
    data: &Data,
) -> Result<(), Error> {
    let before = old.as_ref().and_then(|vs| vs.channel_id);
    let Some(transition) = VoiceTransition::classify(before, new.channel_id) else {
        return Ok(());
    };

    let is_bot = super::is_bot(ctx, new.user_id, new.member.as_ref()).await?;
    let user_id = new.user_id.to_string();
    let now = Utc::now();

    // Each event runs in its own task, so a join and a leave arriving close
    // together take the lock in either order. A leave applied first is
    // ignored and the join then leaves an open session; this gap is accepted.
    let mut activity = data.activity.lock().await;
    match transition {
        VoiceTransition::Joined => {
            activity.record_voice_join(&user_id, is_bot, now);
        }
        VoiceTransition::Left => {
            activity.record_voice_leave(&user_id, is_bot, now);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_transitions() {
        let a = Some(serenity::ChannelId::new(1));
        let b = Some(serenity::ChannelId::new(2));

        assert_eq!(VoiceTransition::classify(None, a), Some(VoiceTransition::Joined));
        assert_eq!(VoiceTransition::classify(a, None), Some(VoiceTransition::Left));
        assert_eq!(VoiceTransition::classify(a, b), None);
        assert_eq!(VoiceTransition::classify(a, a), None);
        assert_eq!(VoiceTransition::classify(None, None), None);
    }
}
