//! Database row types — these map directly to SQLite rows.
//! Distinct from the encore-types API models to keep the DB layer
//! independent; conversions live here so every handler shares the same
//! corrupt-data fallbacks.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use encore_types::models::{Band, Stage, UserSummary};

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub pin: Option<String>,
    pub avatar: String,
    pub instagram: Option<String>,
    pub is_public: bool,
    pub created_at: String,
}

pub struct BandRow {
    pub id: String,
    pub name: String,
    pub day: u8,
    pub stage: String,
    pub start_time: String,
    pub end_time: String,
}

/// An attendance row joined with its band.
pub struct AgendaRow {
    pub attendance_id: String,
    pub band: BandRow,
}

/// An attendance row joined with the attending user.
pub struct BandAttendeeRow {
    pub user_id: String,
    pub username: String,
    pub avatar: String,
}

pub struct FriendshipRow {
    pub id: String,
    pub requester_id: String,
    pub addressee_id: String,
    pub status: String,
    pub created_at: String,
}

/// A friendship joined with the user on the far side.
pub struct FriendWithUser {
    pub friendship_id: String,
    pub user_id: String,
    pub username: String,
    pub avatar: String,
}

pub struct GroupRow {
    pub id: String,
    pub name: String,
    pub invite_code: String,
    pub created_by: String,
    pub created_at: String,
}

pub struct GroupMemberRow {
    pub id: String,
    pub group_id: String,
    pub user_id: String,
}

/// A membership row joined with the member's user record.
pub struct MemberWithUser {
    pub member_id: String,
    pub user_id: String,
    pub username: String,
    pub avatar: String,
}

pub struct ShareTokenRow {
    pub id: String,
    pub token: String,
    pub user_id: String,
    pub share_type: String,
}

/// Parse a stored uuid, logging and falling back to nil on corruption.
pub fn parse_uuid(raw: &str, context: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", context, raw, e);
        Uuid::default()
    })
}

/// Parse a stored timestamp. SQLite's `datetime('now')` writes
/// "YYYY-MM-DD HH:MM:SS" without a timezone, so fall back to parsing as
/// naive UTC when the RFC 3339 parse fails.
pub fn parse_datetime(raw: &str, context: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt {} '{}': {}", context, raw, e);
            DateTime::default()
        })
}

impl BandRow {
    pub fn into_band(self) -> Band {
        let stage = Stage::from_code(&self.stage).unwrap_or_else(|| {
            warn!("Corrupt stage '{}' on band '{}'", self.stage, self.id);
            Stage::Sorpresa
        });
        Band {
            id: parse_uuid(&self.id, "band id"),
            name: self.name,
            day: self.day,
            stage,
            start_time: parse_datetime(&self.start_time, "band start_time"),
            end_time: parse_datetime(&self.end_time, "band end_time"),
        }
    }
}

impl UserRow {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: parse_uuid(&self.id, "user id"),
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_default_timestamps() {
        let dt = parse_datetime("2026-02-14 21:20:00", "test");
        assert_eq!(dt.to_rfc3339(), "2026-02-14T21:20:00+00:00");
    }

    #[test]
    fn parses_rfc3339_timestamps() {
        let dt = parse_datetime("2026-02-15T02:00:00+00:00", "test");
        assert_eq!(dt.timestamp(), 1771120800);
    }
}
