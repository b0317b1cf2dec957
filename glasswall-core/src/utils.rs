pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_3: &str = "stun:stun2.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_4: &str = "stun:stun3.l.google.com:19302";

/// Base URL of the signaling endpoint used when nothing else is configured.
pub const DEFAULT_SIGNALING_URL: &str = "ws://localhost:3000";

/// Room joined when the user leaves the room code empty.
pub const DEFAULT_ROOM: &str = "demo-room";
