use crate::Database;
use crate::models::UserRow;
use crate::queries::OptionalExt;
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        pin_hash: &str,
        avatar: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, pin, avatar) VALUES (?1, ?2, ?3, ?4)",
                (id, username, pin_hash, avatar),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Legacy users registered before PINs existed; this backfills one.
    pub fn set_user_pin(&self, id: &str, pin_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("UPDATE users SET pin = ?1 WHERE id = ?2", (pin_hash, id))?;
            Ok(())
        })
    }

    pub fn update_profile(
        &self,
        id: &str,
        instagram: Option<&str>,
        is_public: Option<bool>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE users SET instagram = ?1 WHERE id = ?2",
                (instagram, id),
            )?;
            if let Some(is_public) = is_public {
                conn.execute(
                    "UPDATE users SET is_public = ?1 WHERE id = ?2",
                    (is_public, id),
                )?;
            }
            Ok(())
        })
    }

    /// The user directory: everyone who opted in, plus the caller.
    pub fn list_visible_users(&self, self_id: &str) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, pin, avatar, instagram, is_public, created_at
                 FROM users
                 WHERE is_public = 1 OR id = ?1
                 ORDER BY username ASC",
            )?;

            let rows = stmt
                .query_map([self_id], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        pin: row.get(2)?,
        avatar: row.get(3)?,
        instagram: row.get(4)?,
        is_public: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, pin, avatar, instagram, is_public, created_at
         FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row([value], user_from_row).optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn create_and_fetch_user() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "rocio", "$argon2$hash", "#ff0066").unwrap();

        let user = db.get_user_by_username("rocio").unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.avatar, "#ff0066");
        assert!(!user.is_public);
        assert!(user.instagram.is_none());

        assert!(db.get_user_by_username("nadie").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "rocio", "h", "#111111").unwrap();
        assert!(db.create_user("u2", "rocio", "h", "#222222").is_err());
    }

    #[test]
    fn directory_hides_private_users() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "ana", "h", "#111111").unwrap();
        db.create_user("u2", "bruno", "h", "#222222").unwrap();
        db.create_user("u3", "carla", "h", "#333333").unwrap();
        db.update_profile("u2", Some("bruno.ok"), Some(true)).unwrap();

        // Caller sees themselves and public users only, ordered by name.
        let visible = db.list_visible_users("u3").unwrap();
        let names: Vec<_> = visible.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["bruno", "carla"]);
        assert_eq!(visible[0].instagram.as_deref(), Some("bruno.ok"));
    }

    #[test]
    fn profile_update_preserves_visibility_when_flag_absent() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "ana", "h", "#111111").unwrap();
        db.update_profile("u1", Some("ana_insta"), Some(true)).unwrap();
        db.update_profile("u1", None, None).unwrap();

        let user = db.get_user_by_id("u1").unwrap().unwrap();
        assert!(user.instagram.is_none());
        assert!(user.is_public);
    }
}
