use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The festival's physical performance areas. Codes match the published
/// lineup and are stored verbatim in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Norte,
    Sur,
    Montana,
    BoomErang,
    CasitaBlues,
    Paraguay,
    PlazaElectronica,
    Sorpresa,
}

impl Stage {
    /// Canonical column order for the schedule grid.
    pub const ALL: [Stage; 8] = [
        Stage::Norte,
        Stage::Sur,
        Stage::Montana,
        Stage::BoomErang,
        Stage::CasitaBlues,
        Stage::Paraguay,
        Stage::PlazaElectronica,
        Stage::Sorpresa,
    ];

    pub fn as_code(&self) -> &'static str {
        match self {
            Stage::Norte => "NORTE",
            Stage::Sur => "SUR",
            Stage::Montana => "MONTANA",
            Stage::BoomErang => "BOOM_ERANG",
            Stage::CasitaBlues => "CASITA_BLUES",
            Stage::Paraguay => "PARAGUAY",
            Stage::PlazaElectronica => "PLAZA_ELECTRONICA",
            Stage::Sorpresa => "SORPRESA",
        }
    }

    pub fn from_code(code: &str) -> Option<Stage> {
        Stage::ALL.iter().copied().find(|s| s.as_code() == code)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Norte => "Norte",
            Stage::Sur => "Sur",
            Stage::Montana => "Montaña",
            Stage::BoomErang => "Boomerang",
            Stage::CasitaBlues => "La Casita del Blues",
            Stage::Paraguay => "Paraguay",
            Stage::PlazaElectronica => "Plaza Electrónica",
            Stage::Sorpresa => "Sorpresa",
        }
    }

    /// Accent color used by clients when rendering this stage.
    pub fn accent(&self) -> &'static str {
        match self {
            Stage::Norte => "#f43f5e",
            Stage::Sur => "#8b5cf6",
            Stage::Montana => "#10b981",
            Stage::BoomErang => "#f59e0b",
            Stage::CasitaBlues => "#0ea5e9",
            Stage::Paraguay => "#14b8a6",
            Stage::PlazaElectronica => "#d946ef",
            Stage::Sorpresa => "#eab308",
        }
    }
}

/// Which part of an agenda a share token exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareType {
    Day1,
    Day2,
    Both,
}

impl ShareType {
    pub fn as_code(&self) -> &'static str {
        match self {
            ShareType::Day1 => "day1",
            ShareType::Day2 => "day2",
            ShareType::Both => "both",
        }
    }

    pub fn from_code(code: &str) -> Option<ShareType> {
        match code {
            "day1" => Some(ShareType::Day1),
            "day2" => Some(ShareType::Day2),
            "both" => Some(ShareType::Both),
            _ => None,
        }
    }

    /// The day filter this token applies, `None` meaning both days.
    pub fn day_filter(&self) -> Option<u8> {
        match self {
            ShareType::Day1 => Some(1),
            ShareType::Day2 => Some(2),
            ShareType::Both => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    pub id: Uuid,
    pub name: String,
    pub day: u8,
    pub stage: Stage,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// The public slice of a user handed out in friend lists, group rosters
/// and attendee lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_codes_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_code(stage.as_code()), Some(stage));
        }
        assert_eq!(Stage::from_code("ESCENARIO_FANTASMA"), None);
    }

    #[test]
    fn stage_serializes_as_code() {
        let json = serde_json::to_string(&Stage::BoomErang).unwrap();
        assert_eq!(json, "\"BOOM_ERANG\"");
    }

    #[test]
    fn share_type_day_filters() {
        assert_eq!(ShareType::Day1.day_filter(), Some(1));
        assert_eq!(ShareType::Day2.day_filter(), Some(2));
        assert_eq!(ShareType::Both.day_filter(), None);
        assert_eq!(ShareType::from_code("both"), Some(ShareType::Both));
        assert_eq!(ShareType::from_code("day3"), None);
    }
}
