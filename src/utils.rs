pub mod app_state;
pub mod config;
pub mod edition_utils;
pub mod errors;
pub mod greetings;
