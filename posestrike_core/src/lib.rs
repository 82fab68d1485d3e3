pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod gameplay;
pub mod pose;
pub mod store;
pub mod time;
