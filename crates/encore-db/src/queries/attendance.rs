use crate::Database;
use crate::models::{AgendaRow, BandAttendeeRow};
use anyhow::Result;

impl Database {
    /// Mark a user as going to a band. Returns false when the (user, band)
    /// row already exists — the UNIQUE constraint is the race guard.
    pub fn mark_attendance(&self, id: &str, user_id: &str, band_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO attendance (id, user_id, band_id) VALUES (?1, ?2, ?3)",
                (id, user_id, band_id),
            )?;
            Ok(inserted > 0)
        })
    }

    /// Unmark is idempotent: removing a mark that is not there succeeds.
    pub fn unmark_attendance(&self, user_id: &str, band_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "DELETE FROM attendance WHERE user_id = ?1 AND band_id = ?2",
                (user_id, band_id),
            )?;
            Ok(())
        })
    }

    /// The user's agenda: every marked band, earliest set first.
    pub fn agenda_for_user(&self, user_id: &str) -> Result<Vec<AgendaRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.id, b.id, b.name, b.day, b.stage, b.start_time, b.end_time
                 FROM attendance a
                 JOIN bands b ON b.id = a.band_id
                 WHERE a.user_id = ?1
                 ORDER BY b.start_time ASC",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(AgendaRow {
                        attendance_id: row.get(0)?,
                        band: crate::models::BandRow {
                            id: row.get(1)?,
                            name: row.get(2)?,
                            day: row.get(3)?,
                            stage: row.get(4)?,
                            start_time: row.get(5)?,
                            end_time: row.get(6)?,
                        },
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// The user's agenda filtered to one day (share tokens record a day
    /// filter; `None` means both days).
    pub fn agenda_bands_for_user(
        &self,
        user_id: &str,
        day: Option<u8>,
    ) -> Result<Vec<crate::models::BandRow>> {
        Ok(self
            .agenda_for_user(user_id)?
            .into_iter()
            .map(|row| row.band)
            .filter(|band| day.is_none_or(|d| band.day == d))
            .collect())
    }

    /// Who out of `user_ids` is going to this band. Batch lookup with a
    /// generated IN clause, same as the reaction fan-out query.
    pub fn attendees_for_band(
        &self,
        band_id: &str,
        user_ids: &[String],
    ) -> Result<Vec<BandAttendeeRow>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (2..=user_ids.len() + 1).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT u.id, u.username, u.avatar
                 FROM attendance a
                 JOIN users u ON u.id = a.user_id
                 WHERE a.band_id = ?1 AND a.user_id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&band_id];
            params.extend(
                user_ids
                    .iter()
                    .map(|id| id as &dyn rusqlite::types::ToSql),
            );

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok(BandAttendeeRow {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        avatar: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "ana", "h", "#111111").unwrap();
        db.create_user("u2", "bruno", "h", "#222222").unwrap();
        db.insert_band("b1", "Lali", 1, "NORTE", "2026-02-14T23:20:00+00:00", "2026-02-14T23:20:00+00:00")
            .unwrap();
        db.insert_band("b2", "Divididos", 2, "SUR", "2026-02-15T19:40:00+00:00", "2026-02-15T19:40:00+00:00")
            .unwrap();
        db
    }

    #[test]
    fn duplicate_mark_is_rejected_by_unique_constraint() {
        let db = setup();
        assert!(db.mark_attendance("a1", "u1", "b1").unwrap());
        assert!(!db.mark_attendance("a2", "u1", "b1").unwrap());
        assert_eq!(db.agenda_for_user("u1").unwrap().len(), 1);
    }

    #[test]
    fn toggle_is_idempotent() {
        let db = setup();
        db.mark_attendance("a1", "u1", "b1").unwrap();
        db.unmark_attendance("u1", "b1").unwrap();
        db.unmark_attendance("u1", "b1").unwrap();
        assert!(db.agenda_for_user("u1").unwrap().is_empty());

        // Re-marking after an unmark works again.
        assert!(db.mark_attendance("a3", "u1", "b1").unwrap());
    }

    #[test]
    fn agenda_is_ordered_and_day_filterable() {
        let db = setup();
        db.mark_attendance("a1", "u1", "b2").unwrap();
        db.mark_attendance("a2", "u1", "b1").unwrap();

        let agenda = db.agenda_for_user("u1").unwrap();
        assert_eq!(agenda[0].band.name, "Lali");
        assert_eq!(agenda[1].band.name, "Divididos");

        let day2 = db.agenda_bands_for_user("u1", Some(2)).unwrap();
        assert_eq!(day2.len(), 1);
        assert_eq!(day2[0].name, "Divididos");
        assert_eq!(db.agenda_bands_for_user("u1", None).unwrap().len(), 2);
    }

    #[test]
    fn attendee_lookup_is_scoped_to_given_users() {
        let db = setup();
        db.mark_attendance("a1", "u1", "b1").unwrap();
        db.mark_attendance("a2", "u2", "b1").unwrap();

        let attendees = db
            .attendees_for_band("b1", &["u2".to_string()])
            .unwrap();
        assert_eq!(attendees.len(), 1);
        assert_eq!(attendees[0].username, "bruno");

        assert!(db.attendees_for_band("b1", &[]).unwrap().is_empty());
    }
}
