pub mod handler;
pub mod types;

pub use handler::transfer_websocket_handler;
pub use types::*;
