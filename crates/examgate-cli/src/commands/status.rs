use chrono::{Local, Utc};
use clap::Args;
use examgate_core::{classify, CoreError};

use super::{parse_instant, SourceArgs};
use crate::render::{status_line, StatusReport};

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Evaluate at this instant instead of now (HH:MM today, or RFC 3339)
    #[arg(long)]
    now: Option<String>,
    /// Print the status as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let now = match args.now.as_deref() {
        Some(raw) => parse_instant(raw)?,
        None => Local::now(),
    };
    let settings = args.source.load(&now)?;
    let now = now.with_timezone(&Utc);
    let status = classify(&settings.policy, now);

    if args.json {
        let report = StatusReport::new(now, &settings, &status);
        println!("{}", serde_json::to_string_pretty(&report).map_err(CoreError::from)?);
    } else {
        println!("{}", status_line(&settings, &status));
    }
    Ok(())
}
