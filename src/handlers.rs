pub mod analytics;
pub mod auth;
pub mod checkin;
pub mod members;
pub mod settings;
pub mod workouts;
