//! Seeds the festival lineup from a JSON file. Wipes existing bands (and
//! with them all attendance marks) before inserting, so this is meant to
//! run once per lineup revision, not on every boot.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use encore_types::models::Stage;

/// Day 1 of the festival; day 2 is the following night.
const FESTIVAL_START: (i32, u32, u32) = (2026, 2, 14);

#[derive(Debug, Deserialize)]
struct LineupEntry {
    name: String,
    day: u8,
    stage: String,
    /// Published set time, "HH:MM".
    time: String,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let lineup_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/lineup.json".into());
    let db_path = std::env::var("ENCORE_DB_PATH").unwrap_or_else(|_| "encore.db".into());

    let raw = std::fs::read_to_string(&lineup_path)
        .with_context(|| format!("Reading lineup file {}", lineup_path))?;
    let entries: Vec<LineupEntry> =
        serde_json::from_str(&raw).context("Parsing lineup JSON")?;

    let db = encore_db::Database::open(&PathBuf::from(&db_path))?;

    info!("Clearing existing lineup");
    db.clear_lineup()?;

    let mut by_day_stage: BTreeMap<String, usize> = BTreeMap::new();

    for entry in &entries {
        let stage = Stage::from_code(&entry.stage)
            .with_context(|| format!("Unknown stage '{}' for '{}'", entry.stage, entry.name))?;
        let start = parse_start_time(entry.day, &entry.time)
            .with_context(|| format!("Bad set time '{}' for '{}'", entry.time, entry.name))?;

        // The published lineup has no end times.
        let start_str = start.to_rfc3339();
        db.insert_band(
            &Uuid::new_v4().to_string(),
            &entry.name,
            entry.day,
            stage.as_code(),
            &start_str,
            &start_str,
        )?;

        *by_day_stage
            .entry(format!("day {} / {}", entry.day, stage.as_code()))
            .or_default() += 1;
    }

    info!("Inserted {} bands", entries.len());
    for (key, count) in by_day_stage {
        info!("  {}: {}", key, count);
    }

    Ok(())
}

/// Resolve a published "HH:MM" against the festival date for that day.
/// Sets before noon are the closing acts of the previous evening and
/// belong to the next calendar day.
fn parse_start_time(day: u8, time: &str) -> Result<DateTime<Utc>> {
    if day != 1 && day != 2 {
        bail!("Day must be 1 or 2, got {}", day);
    }

    let (hours, minutes) = time
        .split_once(':')
        .with_context(|| format!("Expected HH:MM, got '{}'", time))?;
    let hours: u32 = hours.parse()?;
    let minutes: u32 = minutes.parse()?;

    let (year, month, dom) = FESTIVAL_START;
    let date = NaiveDate::from_ymd_opt(year, month, dom + u32::from(day) - 1)
        .context("Invalid festival date")?;

    let mut start = date
        .and_hms_opt(hours, minutes, 0)
        .with_context(|| format!("Invalid time '{}'", time))?;

    if hours < 12 {
        start += Duration::days(1);
    }

    Ok(start.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evening_sets_stay_on_their_festival_day() {
        let start = parse_start_time(1, "23:20").unwrap();
        assert_eq!(start.to_rfc3339(), "2026-02-14T23:20:00+00:00");

        let day2 = parse_start_time(2, "14:30").unwrap();
        assert_eq!(day2.to_rfc3339(), "2026-02-15T14:30:00+00:00");
    }

    #[test]
    fn early_morning_sets_roll_to_the_next_date() {
        let closing = parse_start_time(1, "02:00").unwrap();
        assert_eq!(closing.to_rfc3339(), "2026-02-15T02:00:00+00:00");

        let day2_closing = parse_start_time(2, "00:50").unwrap();
        assert_eq!(day2_closing.to_rfc3339(), "2026-02-16T00:50:00+00:00");
    }

    #[test]
    fn garbage_times_are_rejected() {
        assert!(parse_start_time(1, "25:00").is_err());
        assert!(parse_start_time(1, "2300").is_err());
        assert!(parse_start_time(3, "21:00").is_err());
    }

    #[test]
    fn lineup_entries_deserialize() {
        let json = r#"[{"name": "Lali", "day": 1, "stage": "NORTE", "time": "23:20"}]"#;
        let entries: Vec<LineupEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].name, "Lali");
        assert!(Stage::from_code(&entries[0].stage).is_some());
    }
}
