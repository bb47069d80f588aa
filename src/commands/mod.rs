mod almanax;
mod help;
mod stats;
mod userstats;

use crate::{Data, Error};

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        help::help(),
        stats::stats(),
        userstats::userstats(),
        almanax::almanax(),
    ]
}
