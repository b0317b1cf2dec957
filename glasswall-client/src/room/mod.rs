mod error;
mod room_command;
mod room_session;
mod room_state;
mod session_config;

pub use error::*;
pub use room_command::*;
pub use room_session::*;
pub use room_state::*;
pub use session_config::*;
