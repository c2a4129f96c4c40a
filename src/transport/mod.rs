mod file;
mod live;

pub use file::{MidiFileSource, TimedEvent};
pub use live::{LiveInput, list_ports};

use crate::error::Result;
use crate::events::Event;
use crate::queue::EventSender;

pub trait EventSource: Send {
    /// Begins producing. Errors here are fatal; nothing is retried.
    fn start(&mut self, events: EventSender) -> Result<()>;

    fn is_active(&self) -> bool;

    fn close(&mut self);
}

pub fn decode(msg: &[u8]) -> Event {
    let Some(&status) = msg.first() else {
        return Event::Other;
    };
    let channel = status & 0x0F;
    // a byte with the high bit set is a status byte, not data
    let data = |i: usize| msg.get(i).copied().filter(|b| b & 0x80 == 0);

    match (status & 0xF0, data(1), data(2)) {
        (0x90, Some(pitch), Some(velocity)) if velocity > 0 => Event::NoteStart {
            channel,
            pitch,
            velocity,
        },
        (0x80, Some(pitch), Some(_)) | (0x90, Some(pitch), Some(_)) => {
            Event::NoteStop { channel, pitch }
        }
        (0xC0, Some(program), _) => Event::ProgramChange { channel, program },
        _ => Event::Other,
    }
}
