pub mod board;
pub mod config;
pub mod errors;
pub mod remote;
pub mod telemetry;

pub use dealboard_common as models;
