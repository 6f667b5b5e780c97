use serde::{Deserialize, Serialize};

/// Durable conversation-journal settings (spec §4.7, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalConfig {
    /// Read from `JOURNAL_DATABASE_URL` at startup; this field holds the
    /// already-resolved value (or the literal config value, for tests).
    #[serde(default)]
    pub database_url: String,
    #[serde(default = "d_max_connections")]
    pub max_connections: u32,
    #[serde(default = "d_retention_days")]
    pub retention_days: u32,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: d_max_connections(),
            retention_days: d_retention_days(),
        }
    }
}

fn d_max_connections() -> u32 {
    10
}
fn d_retention_days() -> u32 {
    90
}
