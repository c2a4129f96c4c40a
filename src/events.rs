pub const PERCUSSION_CHANNEL: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ProgramChange { channel: u8, program: u8 },
    NoteStart { channel: u8, pitch: u8, velocity: u8 },
    NoteStop { channel: u8, pitch: u8 },
    Other,
}

pub fn is_percussion(channel: u8) -> bool {
    channel == PERCUSSION_CHANNEL
}
