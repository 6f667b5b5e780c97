pub mod events;
pub mod ingestor;
pub mod sessions;
pub mod verify;

pub use events::Event;
pub use ingestor::{AckReply, IngestError, Ingestor};
pub use sessions::RoomSessionTable;
