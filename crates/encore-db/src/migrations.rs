use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            pin         TEXT,
            avatar      TEXT NOT NULL,
            instagram   TEXT,
            is_public   INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS bands (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            day         INTEGER NOT NULL,
            stage       TEXT NOT NULL,
            start_time  TEXT NOT NULL,
            end_time    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_bands_day
            ON bands(day, start_time);

        CREATE TABLE IF NOT EXISTS attendance (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            band_id     TEXT NOT NULL REFERENCES bands(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, band_id)
        );

        CREATE INDEX IF NOT EXISTS idx_attendance_band
            ON attendance(band_id);

        CREATE TABLE IF NOT EXISTS friendships (
            id            TEXT PRIMARY KEY,
            requester_id  TEXT NOT NULL REFERENCES users(id),
            addressee_id  TEXT NOT NULL REFERENCES users(id),
            status        TEXT NOT NULL DEFAULT 'pending',
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_friendships_requester
            ON friendships(requester_id, status);

        CREATE INDEX IF NOT EXISTS idx_friendships_addressee
            ON friendships(addressee_id, status);

        CREATE TABLE IF NOT EXISTS groups (
            id           TEXT PRIMARY KEY,
            name         TEXT NOT NULL,
            invite_code  TEXT NOT NULL UNIQUE,
            created_by   TEXT NOT NULL REFERENCES users(id),
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS group_members (
            id          TEXT PRIMARY KEY,
            group_id    TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(group_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_group_members_user
            ON group_members(user_id);

        CREATE TABLE IF NOT EXISTS share_tokens (
            id          TEXT PRIMARY KEY,
            token       TEXT NOT NULL UNIQUE,
            user_id     TEXT NOT NULL REFERENCES users(id),
            type        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_share_tokens_user
            ON share_tokens(user_id, type);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
