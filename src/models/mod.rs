pub mod health;
pub mod messages;
pub mod session;
pub mod shared_state;

pub use health::*;
pub use messages::*;
pub use session::*;
pub use shared_state::*;
