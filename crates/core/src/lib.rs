pub mod air;
pub mod config;
pub mod jobs;
pub mod line;
pub mod opendata;
pub mod store;
pub mod types;
