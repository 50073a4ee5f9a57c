use chrono::Local;
use clap::Args;
use examgate_core::params::parse_flag;
use examgate_core::{CoreError, ExamSettings, SettingsForm};
use url::Url;

const DEFAULT_BASE: &str = "http://localhost/";

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Link to start from; its parameters are the prior settings
    #[arg(long, default_value = DEFAULT_BASE)]
    base: String,
    /// Exam start, HH:MM (24-hour)
    #[arg(long, allow_hyphen_values = true)]
    start: Option<String>,
    /// Minutes per submit-then-wait cycle
    #[arg(long, allow_hyphen_values = true)]
    interval: Option<String>,
    /// Minutes the submission window stays open each cycle
    #[arg(long, allow_hyphen_values = true)]
    duration: Option<String>,
    /// Show the status indicator (1/true or 0/false)
    #[arg(long)]
    show: Option<String>,
}

pub fn run(args: LinkArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut url = Url::parse(&args.base).map_err(CoreError::from)?;
    let now = Local::now();
    let prior = ExamSettings::from_url(&url, &now);

    let mut form = SettingsForm::from_settings(&prior, &Local);
    if let Some(start) = args.start {
        form.start = start;
    }
    if let Some(interval) = args.interval {
        form.interval = interval;
    }
    if let Some(duration) = args.duration {
        form.duration = duration;
    }
    if let Some(show) = args.show {
        form.show = parse_flag(&show);
    }

    let next = form.apply(&prior, &now);
    next.write_to_url(&mut url, &Local);
    println!("{url}");
    Ok(())
}
