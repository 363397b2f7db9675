//! Business logic behind the HTTP handlers.

pub mod creator_registry;
pub mod livekit_backend;
pub mod memory_backend;
pub mod room_backend;
pub mod token_issuer;

pub use creator_registry::CreatorRegistry;
pub use livekit_backend::LiveKitRoomBackend;
pub use memory_backend::InMemoryRoomBackend;
pub use room_backend::RoomBackend;
