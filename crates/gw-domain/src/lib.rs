pub mod backoff;
pub mod call_control;
pub mod config;
pub mod env_subst;
pub mod error;
pub mod model;
pub mod trace;

pub use backoff::BackoffPolicy;
pub use call_control::CallControl;
pub use error::{Error, Result};
pub use trace::TraceEvent;
