pub mod metrics_recompute;
pub mod migrations;
pub mod models;
pub mod store;

pub use migrations::{migrate_to_latest, Migration};
pub use models::{
    CallRow, ConversationMetricsRow, ConversationRow, EventSeverity, MessageMeta, MessageRow,
    SystemEventRow,
};
pub use store::Journal;
