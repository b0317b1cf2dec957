mod privacy_broadcaster;

pub use privacy_broadcaster::*;
