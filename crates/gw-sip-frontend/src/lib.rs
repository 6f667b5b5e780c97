//! Inbound call acceptance, routing-rule evaluation, and room+agent setup
//! (spec §4.6).

pub mod agent_joiner;
pub mod frontend;
pub mod patterns;
pub mod router;
pub mod types;

pub use agent_joiner::AgentJoiner;
pub use frontend::SipFrontend;
pub use types::{Disposition, IncomingCall, SipCallInfo};
