pub mod db;
pub mod fixtures;
pub mod temp;

pub use db::TestDb;
pub use fixtures::{write_bytes, write_json};
pub use temp::TempDir;
