mod media;
mod media_transport;
mod rtc_connection;
mod transport_config;
mod transport_event;

pub use media::*;
pub use media_transport::*;
pub use rtc_connection::*;
pub use transport_config::*;
pub use transport_event::*;
