mod signaling_channel;
mod signaling_output;

pub use signaling_channel::*;
pub use signaling_output::*;
