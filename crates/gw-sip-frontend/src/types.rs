use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inbound INVITE as the SIP front-end sees it (spec §4.6:
/// `handle_incoming_call(caller, called, trunk, headers)`).
#[derive(Debug, Clone)]
pub struct IncomingCall {
    pub caller: String,
    pub called: String,
    pub trunk: String,
    pub headers: HashMap<String, String>,
}

/// SF's own tracking record for a call it has dispatched to `voice_ai`
/// (spec §4.6 step 5: "Call is tracked in SF's map until end").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipCallInfo {
    pub call_id: String,
    pub caller: String,
    pub called: String,
    pub trunk: String,
    pub room_name: String,
    pub agent_identity: String,
    pub started_at: DateTime<Utc>,
}

/// The outcome `handle_incoming_call` reports back to the SIP stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Room created, agent joined; `call_id` is now live in CO.
    Accepted { call_id: String },
    /// No rule matched, or the matched rule's action was `reject`, or the
    /// agent failed to join after retries.
    Rejected { reason: String },
    /// The matched rule's action was `forward`; this gateway does not
    /// originate outbound calls (spec §1 Non-goals), so forwarding is
    /// reported back to the SIP stack rather than executed here.
    Forward,
}
