mod call;
mod grant;
mod room;
mod trunk;
mod turn;

pub use call::*;
pub use grant::*;
pub use room::*;
pub use trunk::*;
pub use turn::*;
