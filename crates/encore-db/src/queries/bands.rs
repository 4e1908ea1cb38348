use crate::Database;
use crate::models::BandRow;
use crate::queries::OptionalExt;
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    pub fn insert_band(
        &self,
        id: &str,
        name: &str,
        day: u8,
        stage: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO bands (id, name, day, stage, start_time, end_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, name, day, stage, start_time, end_time),
            )?;
            Ok(())
        })
    }

    pub fn list_bands(&self, day: Option<u8>) -> Result<Vec<BandRow>> {
        self.with_conn(|conn| match day {
            Some(day) => query_bands(
                conn,
                "SELECT id, name, day, stage, start_time, end_time
                 FROM bands WHERE day = ?1 ORDER BY start_time ASC",
                [day],
            ),
            None => query_bands(
                conn,
                "SELECT id, name, day, stage, start_time, end_time
                 FROM bands ORDER BY start_time ASC",
                [],
            ),
        })
    }

    pub fn get_band(&self, id: &str) -> Result<Option<BandRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, day, stage, start_time, end_time FROM bands WHERE id = ?1",
            )?;

            let row = stmt.query_row([id], band_from_row).optional()?;

            Ok(row)
        })
    }

    /// Reseeding wipes attendance first; the old band ids are meaningless
    /// once the lineup is replaced.
    pub fn clear_lineup(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM attendance", [])?;
            conn.execute("DELETE FROM bands", [])?;
            Ok(())
        })
    }
}

pub(crate) fn band_from_row(
    row: &rusqlite::Row<'_>,
) -> std::result::Result<BandRow, rusqlite::Error> {
    Ok(BandRow {
        id: row.get(0)?,
        name: row.get(1)?,
        day: row.get(2)?,
        stage: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
    })
}

fn query_bands<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<BandRow>> {
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt
        .query_map(params, band_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn seed_band(db: &Database, id: &str, name: &str, day: u8, start: &str) {
        db.insert_band(id, name, day, "NORTE", start, start).unwrap();
    }

    #[test]
    fn lists_bands_by_day_in_start_order() {
        let db = Database::open_in_memory().unwrap();
        seed_band(&db, "b1", "Lali", 1, "2026-02-14T23:20:00+00:00");
        seed_band(&db, "b2", "Turf", 1, "2026-02-14T17:50:00+00:00");
        seed_band(&db, "b3", "Trueno", 2, "2026-02-15T21:30:00+00:00");

        let day1 = db.list_bands(Some(1)).unwrap();
        let names: Vec<_> = day1.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Turf", "Lali"]);

        assert_eq!(db.list_bands(None).unwrap().len(), 3);
        assert!(db.get_band("b3").unwrap().is_some());
        assert!(db.get_band("nope").unwrap().is_none());
    }

    #[test]
    fn clear_lineup_removes_bands_and_attendance() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "ana", "h", "#111111").unwrap();
        seed_band(&db, "b1", "Lali", 1, "2026-02-14T23:20:00+00:00");
        assert!(db.mark_attendance("a1", "u1", "b1").unwrap());

        db.clear_lineup().unwrap();
        assert!(db.list_bands(None).unwrap().is_empty());
        assert!(db.agenda_for_user("u1").unwrap().is_empty());
    }
}
