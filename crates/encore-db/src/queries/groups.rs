use crate::Database;
use crate::models::{GroupMemberRow, GroupRow, MemberWithUser};
use crate::queries::OptionalExt;
use anyhow::Result;

impl Database {
    pub fn create_group(
        &self,
        id: &str,
        name: &str,
        invite_code: &str,
        created_by: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO groups (id, name, invite_code, created_by)
                 VALUES (?1, ?2, ?3, ?4)",
                (id, name, invite_code, created_by),
            )?;
            Ok(())
        })
    }

    pub fn get_group(&self, id: &str) -> Result<Option<GroupRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, invite_code, created_by, created_at
                 FROM groups WHERE id = ?1",
            )?;

            let row = stmt.query_row([id], group_from_row).optional()?;

            Ok(row)
        })
    }

    pub fn get_group_by_code(&self, invite_code: &str) -> Result<Option<GroupRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, invite_code, created_by, created_at
                 FROM groups WHERE invite_code = ?1",
            )?;

            let row = stmt.query_row([invite_code], group_from_row).optional()?;

            Ok(row)
        })
    }

    pub fn invite_code_exists(&self, invite_code: &str) -> Result<bool> {
        Ok(self.get_group_by_code(invite_code)?.is_some())
    }

    pub fn rename_group(&self, id: &str, name: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("UPDATE groups SET name = ?1 WHERE id = ?2", (name, id))?;
            Ok(())
        })
    }

    /// Membership rows cascade via the foreign key.
    pub fn delete_group(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM groups WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    /// Returns false when the user is already a member.
    pub fn add_group_member(&self, id: &str, group_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO group_members (id, group_id, user_id) VALUES (?1, ?2, ?3)",
                (id, group_id, user_id),
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn get_group_member(&self, member_id: &str) -> Result<Option<GroupMemberRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, group_id, user_id FROM group_members WHERE id = ?1",
            )?;

            let row = stmt
                .query_row([member_id], |row| {
                    Ok(GroupMemberRow {
                        id: row.get(0)?,
                        group_id: row.get(1)?,
                        user_id: row.get(2)?,
                    })
                })
                .optional()?;

            Ok(row)
        })
    }

    pub fn is_group_member(&self, group_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM group_members WHERE group_id = ?1 AND user_id = ?2",
                    (group_id, user_id),
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn remove_group_member(&self, member_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM group_members WHERE id = ?1", [member_id])?;
            Ok(())
        })
    }

    /// "Leave": drop the caller's own membership row.
    pub fn remove_membership(&self, group_id: &str, user_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "DELETE FROM group_members WHERE group_id = ?1 AND user_id = ?2",
                (group_id, user_id),
            )?;
            Ok(())
        })
    }

    pub fn groups_for_user(&self, user_id: &str) -> Result<Vec<GroupRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT g.id, g.name, g.invite_code, g.created_by, g.created_at
                 FROM groups g
                 JOIN group_members gm ON gm.group_id = g.id
                 WHERE gm.user_id = ?1
                 ORDER BY g.created_at ASC",
            )?;

            let rows = stmt
                .query_map([user_id], group_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn members_of_group(&self, group_id: &str) -> Result<Vec<MemberWithUser>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT gm.id, u.id, u.username, u.avatar
                 FROM group_members gm
                 JOIN users u ON u.id = gm.user_id
                 WHERE gm.group_id = ?1
                 ORDER BY gm.created_at ASC",
            )?;

            let rows = stmt
                .query_map([group_id], |row| {
                    Ok(MemberWithUser {
                        member_id: row.get(0)?,
                        user_id: row.get(1)?,
                        username: row.get(2)?,
                        avatar: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Member ids of one group, excluding the given user (used when a
    /// joiner is auto-friended with everyone already in the group).
    pub fn member_ids_excluding(&self, group_id: &str, user_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM group_members
                 WHERE group_id = ?1 AND user_id <> ?2",
            )?;

            let rows = stmt
                .query_map((group_id, user_id), |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;

            Ok(rows)
        })
    }

    /// Everyone sharing at least one group with the user. Single
    /// self-join instead of a per-group fan-out.
    pub fn co_member_ids(&self, user_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT gm2.user_id
                 FROM group_members gm1
                 JOIN group_members gm2 ON gm2.group_id = gm1.group_id
                 WHERE gm1.user_id = ?1 AND gm2.user_id <> ?1",
            )?;

            let rows = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;

            Ok(rows)
        })
    }
}

fn group_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<GroupRow, rusqlite::Error> {
    Ok(GroupRow {
        id: row.get(0)?,
        name: row.get(1)?,
        invite_code: row.get(2)?,
        created_by: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        for (id, name) in [("u1", "ana"), ("u2", "bruno"), ("u3", "carla")] {
            db.create_user(id, name, "h", "#123456").unwrap();
        }
        db.create_group("g1", "Previa", "ABC123", "u1").unwrap();
        db.add_group_member("m1", "g1", "u1").unwrap();
        db
    }

    #[test]
    fn membership_is_unique_per_group_and_user() {
        let db = setup();
        assert!(db.add_group_member("m2", "g1", "u2").unwrap());
        assert!(!db.add_group_member("m3", "g1", "u2").unwrap());
        assert_eq!(db.members_of_group("g1").unwrap().len(), 2);
    }

    #[test]
    fn invite_code_lookup_and_rename() {
        let db = setup();
        assert!(db.invite_code_exists("ABC123").unwrap());
        assert!(!db.invite_code_exists("ZZZ999").unwrap());

        db.rename_group("g1", "Previa 2.0").unwrap();
        assert_eq!(db.get_group("g1").unwrap().unwrap().name, "Previa 2.0");
    }

    #[test]
    fn delete_group_cascades_memberships() {
        let db = setup();
        db.add_group_member("m2", "g1", "u2").unwrap();
        db.delete_group("g1").unwrap();

        assert!(db.get_group("g1").unwrap().is_none());
        assert!(db.groups_for_user("u2").unwrap().is_empty());
        assert!(db.get_group_member("m2").unwrap().is_none());
    }

    #[test]
    fn co_members_span_all_shared_groups() {
        let db = setup();
        db.add_group_member("m2", "g1", "u2").unwrap();
        db.create_group("g2", "Camping", "XYZ789", "u3").unwrap();
        db.add_group_member("m3", "g2", "u3").unwrap();
        db.add_group_member("m4", "g2", "u1").unwrap();

        let mut ids = db.co_member_ids("u1").unwrap();
        ids.sort();
        assert_eq!(ids, vec!["u2".to_string(), "u3".to_string()]);

        assert_eq!(db.member_ids_excluding("g1", "u1").unwrap(), vec!["u2".to_string()]);
    }

    #[test]
    fn leave_drops_only_that_membership() {
        let db = setup();
        db.add_group_member("m2", "g1", "u2").unwrap();
        db.remove_membership("g1", "u2").unwrap();

        assert!(!db.is_group_member("g1", "u2").unwrap());
        assert!(db.is_group_member("g1", "u1").unwrap());
    }
}
