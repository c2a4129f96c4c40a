use crate::events::{self, Event};

const MAX_DATA: u8 = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub program: u8,
    pub channel: u8,
    pub pitch: u8,
    pub velocity: u8,
}

impl Note {
    pub fn is_percussion(&self) -> bool {
        events::is_percussion(self.channel)
    }

    fn matches(&self, program: u8, channel: u8, pitch: u8) -> bool {
        self.program == program && self.channel == channel && self.pitch == pitch
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActiveNoteSet {
    notes: Vec<Note>,
}

impl ActiveNoteSet {
    pub fn new() -> Self {
        Self { notes: Vec::new() }
    }

    pub fn start(&mut self, note: Note) {
        self.notes.push(note);
    }

    /// Removes the first note matching `(program, channel, pitch)`, ignoring
    /// velocity. Other notes with the same identity stay active.
    pub fn stop(&mut self, program: u8, channel: u8, pitch: u8) -> Option<Note> {
        let idx = self
            .notes
            .iter()
            .position(|n| n.matches(program, channel, pitch))?;
        Some(self.notes.remove(idx))
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl<'a> IntoIterator for &'a ActiveNoteSet {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    ProgramChanged(u8),
    Started(Note),
    Stopped(Note),
    Unmatched,
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    current_program: u8,
    notes: ActiveNoteSet,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_program(&self) -> u8 {
        self.current_program
    }

    pub fn notes(&self) -> &ActiveNoteSet {
        &self.notes
    }

    pub fn apply(&mut self, event: &Event) -> Applied {
        match *event {
            Event::ProgramChange { program, .. } => {
                if program > MAX_DATA {
                    return Applied::Ignored;
                }
                self.current_program = program;
                Applied::ProgramChanged(program)
            }
            Event::NoteStart {
                channel,
                pitch,
                velocity,
            } => {
                if pitch > MAX_DATA || velocity > MAX_DATA {
                    tracing::trace!("Dropping out-of-range note start: {:?}", event);
                    return Applied::Ignored;
                }
                let note = Note {
                    program: self.current_program,
                    channel,
                    pitch,
                    velocity,
                };
                self.notes.start(note);
                Applied::Started(note)
            }
            Event::NoteStop { channel, pitch } => {
                match self.notes.stop(self.current_program, channel, pitch) {
                    Some(note) => Applied::Stopped(note),
                    None => Applied::Unmatched,
                }
            }
            Event::Other => Applied::Ignored,
        }
    }

    pub fn release_all(&mut self) {
        self.notes.clear();
    }
}
