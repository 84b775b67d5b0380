pub mod analytics_service;
pub mod auth;
pub mod capacity_feed;
pub mod checkin_service;
pub mod member_service;
pub mod workout_service;
