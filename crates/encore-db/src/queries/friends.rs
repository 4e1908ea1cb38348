use crate::Database;
use crate::models::{FriendWithUser, FriendshipRow};
use crate::queries::OptionalExt;
use anyhow::Result;
use rusqlite::Connection;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";

impl Database {
    pub fn create_friendship(
        &self,
        id: &str,
        requester_id: &str,
        addressee_id: &str,
        status: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO friendships (id, requester_id, addressee_id, status)
                 VALUES (?1, ?2, ?3, ?4)",
                (id, requester_id, addressee_id, status),
            )?;
            Ok(())
        })
    }

    pub fn get_friendship(&self, id: &str) -> Result<Option<FriendshipRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, requester_id, addressee_id, status, created_at
                 FROM friendships WHERE id = ?1",
            )?;

            let row = stmt.query_row([id], friendship_from_row).optional()?;

            Ok(row)
        })
    }

    /// One friendship row per unordered pair: look in both directions.
    pub fn find_friendship_between(&self, a: &str, b: &str) -> Result<Option<FriendshipRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, requester_id, addressee_id, status, created_at
                 FROM friendships
                 WHERE (requester_id = ?1 AND addressee_id = ?2)
                    OR (requester_id = ?2 AND addressee_id = ?1)",
            )?;

            let row = stmt.query_row([a, b], friendship_from_row).optional()?;

            Ok(row)
        })
    }

    pub fn accept_friendship(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE friendships SET status = ?1 WHERE id = ?2",
                (STATUS_ACCEPTED, id),
            )?;
            Ok(())
        })
    }

    pub fn delete_friendship(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute("DELETE FROM friendships WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    /// Accepted friends regardless of who sent the original request.
    pub fn accepted_friends_of(&self, user_id: &str) -> Result<Vec<FriendWithUser>> {
        self.with_conn(|conn| {
            query_friends(
                conn,
                "SELECT f.id, u.id, u.username, u.avatar
                 FROM friendships f JOIN users u ON u.id = f.addressee_id
                 WHERE f.requester_id = ?1 AND f.status = 'accepted'
                 UNION ALL
                 SELECT f.id, u.id, u.username, u.avatar
                 FROM friendships f JOIN users u ON u.id = f.requester_id
                 WHERE f.addressee_id = ?1 AND f.status = 'accepted'",
                user_id,
            )
        })
    }

    pub fn pending_received_by(&self, user_id: &str) -> Result<Vec<FriendWithUser>> {
        self.with_conn(|conn| {
            query_friends(
                conn,
                "SELECT f.id, u.id, u.username, u.avatar
                 FROM friendships f JOIN users u ON u.id = f.requester_id
                 WHERE f.addressee_id = ?1 AND f.status = 'pending'",
                user_id,
            )
        })
    }

    pub fn pending_sent_by(&self, user_id: &str) -> Result<Vec<FriendWithUser>> {
        self.with_conn(|conn| {
            query_friends(
                conn,
                "SELECT f.id, u.id, u.username, u.avatar
                 FROM friendships f JOIN users u ON u.id = f.addressee_id
                 WHERE f.requester_id = ?1 AND f.status = 'pending'",
                user_id,
            )
        })
    }

    /// Ids of accepted friends, for the social attendance aggregation.
    pub fn accepted_friend_ids(&self, user_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT addressee_id FROM friendships
                 WHERE requester_id = ?1 AND status = 'accepted'
                 UNION
                 SELECT requester_id FROM friendships
                 WHERE addressee_id = ?1 AND status = 'accepted'",
            )?;

            let rows = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;

            Ok(rows)
        })
    }
}

fn friendship_from_row(
    row: &rusqlite::Row<'_>,
) -> std::result::Result<FriendshipRow, rusqlite::Error> {
    Ok(FriendshipRow {
        id: row.get(0)?,
        requester_id: row.get(1)?,
        addressee_id: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn query_friends(conn: &Connection, sql: &str, user_id: &str) -> Result<Vec<FriendWithUser>> {
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt
        .query_map([user_id], |row| {
            Ok(FriendWithUser {
                friendship_id: row.get(0)?,
                user_id: row.get(1)?,
                username: row.get(2)?,
                avatar: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::{STATUS_ACCEPTED, STATUS_PENDING};
    use crate::Database;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "ana", "h", "#111111").unwrap();
        db.create_user("u2", "bruno", "h", "#222222").unwrap();
        db.create_user("u3", "carla", "h", "#333333").unwrap();
        db
    }

    #[test]
    fn pair_lookup_sees_both_directions() {
        let db = setup();
        db.create_friendship("f1", "u1", "u2", STATUS_PENDING).unwrap();

        assert!(db.find_friendship_between("u1", "u2").unwrap().is_some());
        assert!(db.find_friendship_between("u2", "u1").unwrap().is_some());
        assert!(db.find_friendship_between("u1", "u3").unwrap().is_none());
    }

    #[test]
    fn accept_moves_request_to_friends_list() {
        let db = setup();
        db.create_friendship("f1", "u1", "u2", STATUS_PENDING).unwrap();

        assert_eq!(db.pending_received_by("u2").unwrap().len(), 1);
        assert_eq!(db.pending_sent_by("u1").unwrap().len(), 1);
        assert!(db.accepted_friends_of("u1").unwrap().is_empty());

        db.accept_friendship("f1").unwrap();

        assert!(db.pending_received_by("u2").unwrap().is_empty());
        let friends = db.accepted_friends_of("u2").unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].username, "ana");
    }

    #[test]
    fn friend_ids_cover_both_directions() {
        let db = setup();
        db.create_friendship("f1", "u1", "u2", STATUS_ACCEPTED).unwrap();
        db.create_friendship("f2", "u3", "u1", STATUS_ACCEPTED).unwrap();

        let mut ids = db.accepted_friend_ids("u1").unwrap();
        ids.sort();
        assert_eq!(ids, vec!["u2".to_string(), "u3".to_string()]);
    }

    #[test]
    fn delete_removes_friendship() {
        let db = setup();
        db.create_friendship("f1", "u1", "u2", STATUS_ACCEPTED).unwrap();
        db.delete_friendship("f1").unwrap();
        assert!(db.get_friendship("f1").unwrap().is_none());
        assert!(db.accepted_friends_of("u1").unwrap().is_empty());
    }
}
