pub mod analytics;
pub mod auth;
pub mod checkin;
pub mod member;
pub mod workout;
