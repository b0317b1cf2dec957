/// Commands the [`RoomSession`](crate::room::RoomSession) handle sends to its actor.
#[derive(Debug)]
pub enum RoomCommand {
    /// Close every peer transport and the signaling channel, then stop.
    Leave,
}
