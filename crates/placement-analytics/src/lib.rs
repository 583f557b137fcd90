pub mod config;
pub mod error;
pub mod import;
pub mod placements;
pub mod telemetry;
