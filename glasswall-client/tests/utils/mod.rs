pub mod mock_signaling;
pub mod signal_helpers;

pub use memory_relay::*;
pub use mock_signaling::*;
pub use mock_transport::*;
pub use signal_helpers::*;
pub use ws_relay::*;
