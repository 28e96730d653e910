use clap::Subcommand;
use learnplan_core::schedule::{DAY_INDEX_MAX, DAY_INDEX_MIN, PERIOD_INDEX_MAX, PERIOD_INDEX_MIN};
use learnplan_core::{
    ActivityCatalog, Config, Database, Planner, PlannerStore, Slot, SlotStatus, WeeklySchedule,
};

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Submit a weekly schedule, replacing the stored one
    Set {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        instance: i64,
        /// Sleep hours, applied to every day (e.g. "0-7,23")
        #[arg(long, default_value = "")]
        sleep: String,
        /// Free hours (e.g. "8-12,14-22"); everything else is busy
        #[arg(long)]
        free: String,
        /// Days the free hours apply to (Mon = 1)
        #[arg(long, default_value = "1-7")]
        days: String,
        /// Readiness for every free hour, 0..=1
        #[arg(long, default_value_t = 0.5)]
        readiness: f64,
    },
    /// Print the stored schedule
    Show {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        instance: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ScheduleAction::Set {
            user,
            instance,
            sleep,
            free,
            days,
            readiness,
        } => {
            let schedule = build_schedule(&sleep, &free, &days, readiness)?;
            let db = Database::open()?;
            let config = Config::load_or_default();
            let catalog = ActivityCatalog::default();
            Planner::new(&config, &db, &catalog).submit_schedule(user, instance, schedule)?;
            println!("schedule saved");
        }
        ScheduleAction::Show {
            user,
            instance,
            json,
        } => {
            let db = Database::open()?;
            let schedule = db
                .load_schedule(user, instance)?
                .ok_or("no schedule stored for this learner")?;
            if json {
                let view = serde_json::json!({
                    "created_at": schedule.created_at(),
                    "statuses": schedule
                        .statuses()
                        .into_iter()
                        .map(|(slot, status)| [slot.day as i64, slot.period as i64, status.code()])
                        .collect::<Vec<_>>(),
                    "readiness": schedule.readinesses().into_values().collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", render(&schedule));
            }
        }
    }
    Ok(())
}

/// Parse "a-b,c" style ranges into sorted values within `min..=max`.
pub fn parse_ranges(ranges: &str, min: u8, max: u8) -> Result<Vec<u8>, String> {
    let mut values = Vec::new();
    for part in ranges.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (lo, hi) = match part.split_once('-') {
            Some((lo, hi)) => (parse_bound(lo, min, max)?, parse_bound(hi, min, max)?),
            None => {
                let v = parse_bound(part, min, max)?;
                (v, v)
            }
        };
        if lo > hi {
            return Err(format!("empty range: {part}"));
        }
        values.extend(lo..=hi);
    }
    values.sort_unstable();
    values.dedup();
    Ok(values)
}

fn parse_bound(raw: &str, min: u8, max: u8) -> Result<u8, String> {
    let value: u8 = raw
        .trim()
        .parse()
        .map_err(|_| format!("not a number: {raw}"))?;
    if value < min || value > max {
        return Err(format!("{value} is outside {min}..={max}"));
    }
    Ok(value)
}

fn build_schedule(
    sleep: &str,
    free: &str,
    days: &str,
    readiness: f64,
) -> Result<WeeklySchedule, Box<dyn std::error::Error>> {
    let sleep = parse_ranges(sleep, PERIOD_INDEX_MIN, PERIOD_INDEX_MAX)?;
    let free = parse_ranges(free, PERIOD_INDEX_MIN, PERIOD_INDEX_MAX)?;
    let days = parse_ranges(days, DAY_INDEX_MIN, DAY_INDEX_MAX)?;
    if let Some(period) = sleep.iter().find(|p| free.contains(*p)) {
        return Err(format!("hour {period} is both sleep and free").into());
    }

    let mut schedule = WeeklySchedule::new();
    for slot in Slot::all() {
        if sleep.contains(&slot.period) {
            schedule.set_slot_status(slot, SlotStatus::Sleep);
        } else if free.contains(&slot.period) && days.contains(&slot.day) {
            schedule.set_slot_status(slot, SlotStatus::Free);
        }
    }
    for period in &free {
        schedule.set_readiness(*period, readiness)?;
    }
    Ok(schedule)
}

/// One line per day: `z` sleep, `.` busy, `#` free.
fn render(schedule: &WeeklySchedule) -> String {
    let mut out = String::from("     0         1         2   \n     012345678901234567890123\n");
    for (i, name) in DAY_NAMES.iter().enumerate() {
        out.push_str(name);
        out.push_str("  ");
        for period in PERIOD_INDEX_MIN..=PERIOD_INDEX_MAX {
            let slot = Slot {
                day: DAY_INDEX_MIN + i as u8,
                period,
            };
            out.push(match schedule.status(slot) {
                SlotStatus::Sleep => 'z',
                SlotStatus::Busy => '.',
                SlotStatus::Free => '#',
            });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_parse_and_merge() {
        assert_eq!(parse_ranges("0-3, 2 ,7", 0, 23).unwrap(), vec![0, 1, 2, 3, 7]);
        assert!(parse_ranges("", 0, 23).unwrap().is_empty());
        assert!(parse_ranges("5-2", 0, 23).is_err());
        assert!(parse_ranges("24", 0, 23).is_err());
        assert!(parse_ranges("0", 1, 7).is_err());
    }

    #[test]
    fn schedule_from_ranges() {
        let schedule = build_schedule("0-6", "9-11", "1-5", 0.8).unwrap();
        assert_eq!(schedule.status(Slot { day: 6, period: 3 }), SlotStatus::Sleep);
        assert_eq!(schedule.status(Slot { day: 2, period: 10 }), SlotStatus::Free);
        assert_eq!(schedule.status(Slot { day: 6, period: 10 }), SlotStatus::Busy);
        assert_eq!(schedule.readiness(10), 0.8);
    }

    #[test]
    fn overlapping_sleep_and_free_is_rejected() {
        assert!(build_schedule("0-8", "8-12", "1-7", 0.5).is_err());
    }

    #[test]
    fn rendering_marks_each_status() {
        let schedule = build_schedule("0", "1", "1", 0.5).unwrap();
        let text = render(&schedule);
        let monday = text.lines().nth(2).unwrap();
        assert!(monday.starts_with("Mon  z#."));
        assert_eq!(text.lines().count(), 9);
    }
}
