use thiserror::Error;

use crate::visuals::ColorName;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] ron::Error),

    #[error("MIDI file parse error: {0}")]
    MidiFileParse(String),

    #[error("Unsupported MIDI timing format")]
    MidiUnsupportedTiming,

    #[error("No MIDI input device found")]
    NoInputDevice,

    #[error("MIDI device error: {0}")]
    MidiDevice(String),

    #[error("MIDI port error: {0}")]
    MidiPort(String),

    #[error("Invalid mapping: {0}")]
    Mapping(String),

    #[error("Window error: {0}")]
    Window(String),
}

impl From<midly::Error> for Error {
    fn from(e: midly::Error) -> Self {
        Error::MidiFileParse(e.to_string())
    }
}

impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::MidiDevice(e.to_string())
    }
}

impl From<midir::ConnectError<midir::MidiInput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no descriptor for program {program} (percussion: {percussion})")]
    MissingDescriptor { program: u8, percussion: bool },

    #[error("no color for {color:?} at pitch {pitch}")]
    MissingColor { color: ColorName, pitch: u8 },

    #[error("mapping store unavailable: {0}")]
    Unavailable(String),
}
