pub mod config;
pub mod database;
pub mod errors;
pub mod services;
pub mod transfer;
pub mod utils;

pub use config::LorekeeperConfig;
