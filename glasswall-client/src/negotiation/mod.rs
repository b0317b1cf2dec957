mod coordinator;
mod negotiation_event;

pub use coordinator::*;
pub use negotiation_event::*;
