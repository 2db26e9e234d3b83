pub mod bot;
pub mod config;
pub mod datetime;
pub mod error;
pub mod messaging;
pub mod model;
pub mod router;
pub mod schedule;
pub mod store;
