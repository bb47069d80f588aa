use chrono::Utc;
use poise::CreateReply;

use crate::almanax::{parse_date, Calendar};
use crate::utils::embed;
use crate::{Context, Error};

async fn almanax_impl(ctx: Context<'_>, date: Option<String>) -> Result<(), Error> {
    let date = match date {
        Some(raw) => match parse_date(&raw) {
            Ok(date) => date,
            Err(e) => {
                ctx.send(
                    CreateReply::default()
                        .embed(embed::error(&e.to_string()))
                        .ephemeral(true),
                )
                .await?;
                return Ok(());
            }
        },
        None => Utc::now().date_naive(),
    };

    let calendar = match Calendar::load(&ctx.data().almanax_path).await {
        Ok(calendar) => calendar,
        Err(e) => {
            tracing::error!("failed to read almanax cache: {e}");
            ctx.send(CreateReply::default().embed(embed::error(
                "The almanax cache could not be read. Please try again later.",
            )))
            .await?;
            return Ok(());
        }
    };

    if calendar.is_empty() {
        ctx.send(CreateReply::default().embed(embed::error(
            "The almanax cache is empty. Fetch the calendar first.",
        )))
        .await?;
        return Ok(());
    }
    tracing::debug!(days = calendar.len(), %date, "almanax lookup");

    let reply = match calendar.lookup(date) {
        Some(day) => CreateReply::default().embed(embed::almanax_day(day, date)),
        None => CreateReply::default().embed(embed::error(&format!("No data found for {date}"))),
    };
    ctx.send(reply).await?;

    Ok(())
}

/// Show the almanax offering and bonus for a date
#[poise::command(slash_command)]
pub async fn almanax(
    ctx: Context<'_>,
    #[description = "Date as YYYY-MM-DD (defaults to today)"] date: Option<String>,
) -> Result<(), Error> {
    almanax_impl(ctx, date).await
}
