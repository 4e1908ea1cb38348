use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Band, ShareType, Stage, UserSummary};

// -- JWT Claims --

/// JWT claims shared by the REST middleware and the login handlers.
/// Canonical definition lives here in encore-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckUserRequest {
    pub username: String,
}

/// Where a username sits in the credential state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Unknown username — the client should offer registration.
    New,
    /// Known user that predates PINs — the client should run PIN setup.
    NeedsPin,
    /// Known user with a PIN — the client should prompt for it.
    HasPin,
}

#[derive(Debug, Serialize)]
pub struct CheckUserResponse {
    pub status: UserStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    #[serde(default)]
    pub pin: Option<String>,
    #[serde(default)]
    pub is_registering: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Attendance --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToggleAttendanceRequest {
    pub band_id: Uuid,
    pub attending: bool,
}

#[derive(Debug, Serialize)]
pub struct AgendaEntry {
    pub id: Uuid,
    pub band: Band,
}

/// How an attendee is connected to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendeeSource {
    Group,
    Friend,
}

#[derive(Debug, Serialize)]
pub struct BandAttendee {
    pub user: UserSummary,
    pub source: AttendeeSource,
}

// -- Friends --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendEntry {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
    pub friendship_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendsResponse {
    pub friends: Vec<FriendEntry>,
    pub pending_received: Vec<FriendEntry>,
    pub pending_sent: Vec<FriendEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddFriendRequest {
    pub username: String,
}

// -- Groups --

#[derive(Debug, Serialize)]
pub struct GroupMemberEntry {
    pub id: Uuid,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub invite_code: String,
    pub created_by: Uuid,
    pub members: Vec<GroupMemberEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateGroupRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameGroupRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JoinGroupRequest {
    pub invite_code: String,
}

// -- Share --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateShareRequest {
    #[serde(rename = "type")]
    pub share_type: ShareType,
}

#[derive(Debug, Serialize)]
pub struct CreateShareResponse {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SharedAgendaResponse {
    pub username: String,
    pub avatar: String,
    #[serde(rename = "type")]
    pub share_type: ShareType,
    pub bands: Vec<Band>,
}

// -- Profile / users --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub username: String,
    pub avatar: String,
    pub instagram: Option<String>,
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UserEntry {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
    pub instagram: Option<String>,
}

// -- Compare --

#[derive(Debug, Serialize)]
pub struct CompareFriend {
    pub username: String,
    pub avatar: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub friend: CompareFriend,
    pub both: Vec<Band>,
    pub only_me: Vec<Band>,
    pub only_friend: Vec<Band>,
}

// -- Schedule grid --

/// One row of the time×stage grid: the bands starting at `time`, one cell
/// per stage column (parallel to `ScheduleGrid::stages`).
#[derive(Debug, Serialize)]
pub struct ScheduleSlot {
    pub time: String,
    pub cells: Vec<Vec<Band>>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleGrid {
    pub day: u8,
    pub stages: Vec<Stage>,
    pub slots: Vec<ScheduleSlot>,
}
