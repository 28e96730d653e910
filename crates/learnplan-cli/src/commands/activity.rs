use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use clap::Subcommand;
use learnplan_core::{ActivityConfig, Database, PlannerStore};

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Load activity configuration for an instance from a JSON file
    ///
    /// The file maps activity ids to
    /// {"duration_sec", "category", "weight", "is_ignored"}.
    Config {
        #[arg(long)]
        instance: i64,
        #[arg(long)]
        file: PathBuf,
    },
    /// Print the stored activity configuration
    Show {
        #[arg(long)]
        instance: i64,
    },
}

pub fn run(action: ActivityAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ActivityAction::Config { instance, file } => {
            let content = std::fs::read_to_string(&file)?;
            let config = parse_config(&content)?;
            let db = Database::open()?;
            db.save_activity_config(instance, &config)?;
            println!("{} activities configured", config.len());
        }
        ActivityAction::Show { instance } => {
            let db = Database::open()?;
            let sorted: BTreeMap<_, _> = db.activity_config(instance)?.into_iter().collect();
            println!("{}", serde_json::to_string_pretty(&sorted)?);
        }
    }
    Ok(())
}

fn parse_config(json: &str) -> Result<HashMap<i64, ActivityConfig>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_file() {
        let config = parse_config(
            r#"{
                "11": { "duration_sec": 1800, "category": "algebra", "weight": 1 },
                "12": { "duration_sec": 600, "category": "algebra", "weight": 2, "is_ignored": true }
            }"#,
        )
        .unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(config[&11].category, "algebra");
        assert!(!config[&11].is_ignored);
        assert!(config[&12].is_ignored);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(parse_config(r#"{ "quiz": { "duration_sec": 1, "category": "a", "weight": 0 } }"#)
            .is_err());
    }
}
