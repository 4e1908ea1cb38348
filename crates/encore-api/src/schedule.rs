use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use encore_types::api::{ScheduleGrid, ScheduleSlot};
use encore_types::models::{Band, Stage};

use crate::auth::AppState;
use crate::bands::validate_day;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub day: Option<u8>,
}

/// The day's time×stage grid, public like the lineup itself.
pub async fn get_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let day = query.day.unwrap_or(1);
    validate_day(day)?;

    let bands: Vec<Band> = state
        .db
        .list_bands(Some(day))?
        .into_iter()
        .map(|row| row.into_band())
        .collect();

    Ok(Json(build_grid(day, bands)))
}

/// Group a day's bands into a grid of time slots × stages. Slots are
/// ordered chronologically, so an 02:00 closing set lands after 23:00,
/// not before it.
pub fn build_grid(day: u8, bands: Vec<Band>) -> ScheduleGrid {
    let stages: Vec<Stage> = Stage::ALL
        .iter()
        .copied()
        .filter(|stage| bands.iter().any(|b| b.stage == *stage))
        .collect();

    let mut slots: BTreeMap<DateTime<Utc>, Vec<Vec<Band>>> = BTreeMap::new();
    for band in bands {
        let Some(column) = stages.iter().position(|s| *s == band.stage) else {
            continue;
        };
        let cells = slots
            .entry(band.start_time)
            .or_insert_with(|| vec![Vec::new(); stages.len()]);
        cells[column].push(band);
    }

    let slots = slots
        .into_iter()
        .map(|(start, cells)| ScheduleSlot {
            time: start.format("%H:%M").to_string(),
            cells,
        })
        .collect();

    ScheduleGrid { day, stages, slots }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn band(name: &str, stage: Stage, day: u8, hour: u32, min: u32) -> Band {
        // Early-morning sets belong to the following calendar day.
        let dom = if hour < 12 { 15 } else { 14 };
        let start = Utc.with_ymd_and_hms(2026, 2, dom, hour, min, 0).unwrap();
        Band {
            id: Uuid::new_v4(),
            name: name.to_string(),
            day,
            stage,
            start_time: start,
            end_time: start,
        }
    }

    #[test]
    fn grid_places_bands_in_stage_columns() {
        let bands = vec![
            band("Lali", Stage::Norte, 1, 23, 20),
            band("Las Pelotas", Stage::Sur, 1, 23, 20),
            band("Dillom", Stage::Norte, 1, 19, 30),
        ];
        let grid = build_grid(1, bands);

        assert_eq!(grid.stages, vec![Stage::Norte, Stage::Sur]);
        assert_eq!(grid.slots.len(), 2);

        assert_eq!(grid.slots[0].time, "19:30");
        assert_eq!(grid.slots[0].cells[0][0].name, "Dillom");
        assert!(grid.slots[0].cells[1].is_empty());

        let closing = &grid.slots[1];
        assert_eq!(closing.time, "23:20");
        assert_eq!(closing.cells[0][0].name, "Lali");
        assert_eq!(closing.cells[1][0].name, "Las Pelotas");
    }

    #[test]
    fn after_midnight_sets_sort_last() {
        let bands = vec![
            band("Victoria Whynot", Stage::Montana, 1, 2, 0),
            band("Franz Ferdinand", Stage::Montana, 1, 22, 40),
        ];
        let grid = build_grid(1, bands);

        assert_eq!(grid.slots[0].time, "22:40");
        assert_eq!(grid.slots[1].time, "02:00");
    }

    #[test]
    fn empty_day_yields_empty_grid() {
        let grid = build_grid(2, vec![]);
        assert!(grid.stages.is_empty());
        assert!(grid.slots.is_empty());
        assert_eq!(grid.day, 2);
    }
}
