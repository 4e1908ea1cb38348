use crate::Database;
use crate::models::ShareTokenRow;
use crate::queries::OptionalExt;
use anyhow::Result;

impl Database {
    /// A user keeps one token per type; creating again returns the
    /// existing one (handled by the caller via this lookup).
    pub fn find_share_token(&self, user_id: &str, share_type: &str) -> Result<Option<ShareTokenRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, token, user_id, type FROM share_tokens
                 WHERE user_id = ?1 AND type = ?2",
            )?;

            let row = stmt
                .query_row((user_id, share_type), share_token_from_row)
                .optional()?;

            Ok(row)
        })
    }

    pub fn create_share_token(
        &self,
        id: &str,
        token: &str,
        user_id: &str,
        share_type: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO share_tokens (id, token, user_id, type) VALUES (?1, ?2, ?3, ?4)",
                (id, token, user_id, share_type),
            )?;
            Ok(())
        })
    }

    pub fn get_share_token(&self, token: &str) -> Result<Option<ShareTokenRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, token, user_id, type FROM share_tokens WHERE token = ?1",
            )?;

            let row = stmt.query_row([token], share_token_from_row).optional()?;

            Ok(row)
        })
    }
}

fn share_token_from_row(
    row: &rusqlite::Row<'_>,
) -> std::result::Result<ShareTokenRow, rusqlite::Error> {
    Ok(ShareTokenRow {
        id: row.get(0)?,
        token: row.get(1)?,
        user_id: row.get(2)?,
        share_type: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn token_resolves_to_recorded_type() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "ana", "h", "#111111").unwrap();
        db.create_share_token("s1", "tok-day1", "u1", "day1").unwrap();

        let found = db.get_share_token("tok-day1").unwrap().unwrap();
        assert_eq!(found.user_id, "u1");
        assert_eq!(found.share_type, "day1");

        assert!(db.get_share_token("tok-nope").unwrap().is_none());
        assert!(db.find_share_token("u1", "day1").unwrap().is_some());
        assert!(db.find_share_token("u1", "both").unwrap().is_none());
    }

    #[test]
    fn share_filters_agenda_by_day() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "ana", "h", "#111111").unwrap();
        db.insert_band("b1", "Lali", 1, "NORTE", "2026-02-14T23:20:00+00:00", "2026-02-14T23:20:00+00:00")
            .unwrap();
        db.insert_band("b2", "Trueno", 2, "SUR", "2026-02-15T21:30:00+00:00", "2026-02-15T21:30:00+00:00")
            .unwrap();
        db.mark_attendance("a1", "u1", "b1").unwrap();
        db.mark_attendance("a2", "u1", "b2").unwrap();

        let day1 = db.agenda_bands_for_user("u1", Some(1)).unwrap();
        assert_eq!(day1.len(), 1);
        assert_eq!(day1[0].name, "Lali");

        let both = db.agenda_bands_for_user("u1", None).unwrap();
        assert_eq!(both.len(), 2);
    }
}
