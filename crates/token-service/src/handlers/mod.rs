//! HTTP request handlers for the token service.

pub mod health;
pub mod metrics;
pub mod rooms;
pub mod tokens;

pub use health::health_check;
pub use metrics::metrics_handler;
pub use rooms::{check_room, end_room, set_room_metadata};
pub use tokens::get_token;
