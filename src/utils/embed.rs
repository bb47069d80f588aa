use chrono::NaiveDate;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};

use crate::activity::{UserId, UserStats};
use crate::almanax::AlmanaxDay;

/// Discord's limit for an embed field value.
const FIELD_VALUE_LIMIT: usize = 1024;

pub fn server_stats(top: &[(UserId, u64)]) -> CreateEmbed {
    CreateEmbed::new()
        .title("Server Statistics")
        .field("Top Users by Messages", leaderboard(top), false)
        .color(0x3498DB)
}

pub fn user_stats(display_name: &str, stats: &UserStats) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("Statistics for {display_name}"))
        .field("Messages Sent", stats.messages.to_string(), false)
        .field("Reactions Added", stats.reactions.to_string(), false)
        .field("Time in Voice", voice_time(stats.voice_seconds), false)
        .color(0x2ECC71)
}

/// `requested` is the date the user asked for; when the calendar answered
/// from another year, the reply says which cached date it used.
pub fn almanax_day(day: &AlmanaxDay, requested: NaiveDate) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("Almanax {}", day.date))
        .field("Meryde", or_dash(&day.meryde_name), true)
        .field("Zodiac", or_dash(&day.zodiac_name), true)
        .field(
            format!("Bonus: {}", or_dash(&day.bonus_type)),
            or_dash(&day.bonus_description),
            false,
        )
        .field("Offering", offering(day), false)
        .color(0xC8AA6E);

    let description = match fallback_note(day, requested) {
        Some(note) if day.meryde_description.is_empty() => note,
        Some(note) => format!("{note}\n\n{}", day.meryde_description),
        None => day.meryde_description.clone(),
    };
    if !description.is_empty() {
        embed = embed.description(description);
    }
    if let Some(ref image) = day.meryde_image {
        embed = embed.thumbnail(image);
    }
    if let Some(ref event) = day.event_name {
        let description = day.event_description.as_deref().unwrap_or("-");
        embed = embed.field(format!("Event: {event}"), description, false);
    }
    if let Some(ref image) = day.event_image {
        embed = embed.image(image);
    }

    embed.footer(CreateEmbedFooter::new("Source: krosmoz.com almanax"))
}

pub fn error(message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Error")
        .description(message)
        .color(0xED4245)
}

fn leaderboard(top: &[(UserId, u64)]) -> String {
    if top.is_empty() {
        return "No messages recorded yet.".to_string();
    }

    let mut lines = String::new();
    for (user_id, count) in top {
        let line = format!("<@{user_id}>: {count} messages");
        let needed = if lines.is_empty() { line.len() } else { line.len() + 1 };
        if lines.len() + needed > FIELD_VALUE_LIMIT {
            break;
        }
        if !lines.is_empty() {
            lines.push('\n');
        }
        lines.push_str(&line);
    }
    lines
}

fn fallback_note(day: &AlmanaxDay, requested: NaiveDate) -> Option<String> {
    let requested = requested.format("%Y-%m-%d").to_string();
    if day.date == requested {
        None
    } else {
        Some(format!(
            "*No entry for {requested}, showing the cached {}.*",
            day.date
        ))
    }
}

// Discord rejects embed fields with empty values.
fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn offering(day: &AlmanaxDay) -> String {
    let name = match day.offering_url {
        Some(ref url) => format!("[{}]({url})", day.offering_name),
        None => day.offering_name.clone(),
    };
    format!("{}x {name}", day.offering_quantity)
}

fn voice_time(seconds: f64) -> String {
    format!("{} ({seconds:.0} seconds)", format_duration(seconds))
}

/// `3723.4` → `1h 2m 3s`. Fractions of a second are dropped.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
