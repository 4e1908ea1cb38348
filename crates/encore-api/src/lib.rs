pub mod attendance;
pub mod auth;
pub mod bands;
pub mod compare;
pub mod error;
pub mod friends;
pub mod groups;
pub mod middleware;
pub mod profile;
pub mod schedule;
pub mod share;
pub mod users;
