pub mod prober;
pub mod supervisor;

pub use prober::{TcpProber, TrunkProber};
pub use supervisor::TrunkSupervisor;
