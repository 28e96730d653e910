use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Utc};
use clap::Args;
use learnplan_core::{
    ActivityCatalog, AgendaItem, AgendaStatus, Config, Database, Planner, ProposalRequest,
    ProposedItem,
};

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Args)]
pub struct ProposeArgs {
    #[arg(long)]
    pub user: i64,
    #[arg(long)]
    pub course: i64,
    /// Activity instance holding the schedule and configuration
    #[arg(long)]
    pub instance: i64,
    #[arg(long)]
    pub age: u32,
    /// Course catalogue JSON (activities, completions, progress)
    #[arg(long)]
    pub catalog: PathBuf,
    /// Learner-local time (RFC 3339); defaults to now in UTC
    #[arg(long, value_parser = parse_at)]
    pub at: Option<DateTime<FixedOffset>>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_at(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| format!("expected RFC 3339 time: {e}"))
}

pub fn run(args: ProposeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let catalog = ActivityCatalog::load(&args.catalog)?;
    let planner = Planner::new(&config, &db, &catalog);

    let at = args.at.unwrap_or_else(|| Utc::now().fixed_offset());
    let clock = planner
        .clock_for(args.user, args.instance, *at.offset())
        .pinned_at(at.with_timezone(&Utc));
    let request = ProposalRequest::new(args.user, args.course, args.instance, args.age, &clock);
    tracing::debug!(reading = ?request.reading, %at, "learner clock");
    let agenda = planner.agenda(&request);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&agenda)?);
        return Ok(());
    }

    let day = planner.day(&request);
    println!(
        "User-day from {} {} (week {})",
        day_name(day.begin.day),
        clock_time(day.begin.period as f64),
        day.week
    );
    if agenda.is_empty() {
        println!("  nothing to propose");
    }
    for item in &agenda {
        println!("  {}", format_item(item));
    }
    Ok(())
}

fn day_name(day: u8) -> &'static str {
    DAY_NAMES
        .get(usize::from(day.saturating_sub(1)))
        .copied()
        .unwrap_or("???")
}

/// Fractional hour as HH:MM, wrapping past midnight.
fn clock_time(hours: f64) -> String {
    let minutes = (hours * 60.0).round() as i64;
    let minutes = minutes.rem_euclid(24 * 60);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn format_item(item: &AgendaItem) -> String {
    let object = &item.object;
    let status = match item.status {
        AgendaStatus::Upcoming => "upcoming",
        AgendaStatus::Missed => "missed",
        AgendaStatus::Touched => "touched",
    };
    let what = match &object.item {
        ProposedItem::Activity(proposed) => {
            format!("{} [{}]", proposed.activity.name, proposed.activity.modname)
        }
        ProposedItem::Relax(relax) => format!("relax ({} min)", relax.minutes),
    };
    format!(
        "{} {}-{}  {:<8}  {}",
        day_name(object.day),
        clock_time(object.period_idx_begin),
        clock_time(object.period_idx_end),
        status,
        what
    )
}
