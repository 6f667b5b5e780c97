use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reachability state for a single SIP trunk (spec §3, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrunkState {
    Connected,
    Connecting,
    Disconnected,
    Failed,
    Unknown,
}

impl TrunkState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnected => "disconnected",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrunkHealth {
    pub trunk_name: String,
    pub state: TrunkState,
    pub last_check: Option<DateTime<Utc>>,
    pub response_time_ms: Option<u64>,
    pub failure_count: u32,
    pub last_error: Option<String>,
}

impl TrunkHealth {
    pub fn new(trunk_name: String) -> Self {
        Self {
            trunk_name,
            state: TrunkState::Unknown,
            last_check: None,
            response_time_ms: None,
            failure_count: 0,
            last_error: None,
        }
    }

    pub fn record_success(&mut self, response_time_ms: u64) {
        self.state = TrunkState::Connected;
        self.last_check = Some(Utc::now());
        self.response_time_ms = Some(response_time_ms);
        self.failure_count = 0;
        self.last_error = None;
    }

    pub fn record_failure(&mut self, error: String) {
        self.last_check = Some(Utc::now());
        self.failure_count += 1;
        self.last_error = Some(error);
        if self.state == TrunkState::Connected {
            self.state = TrunkState::Disconnected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_increments_and_success_resets() {
        let mut h = TrunkHealth::new("novofon".into());
        h.record_failure("timeout".into());
        h.record_failure("timeout".into());
        assert_eq!(h.failure_count, 2);

        h.record_success(42);
        assert_eq!(h.failure_count, 0);
        assert_eq!(h.state, TrunkState::Connected);
        assert!(h.last_error.is_none());
    }
}
