mod config;
mod engine;
mod error;
mod events;
mod notes;
mod queue;
pub mod render;
pub mod transport;
mod ui;
pub mod visuals;

pub use config::Config;
pub use engine::{Consumer, EngineCommand, EngineHandle, EngineUpdate, spawn_engine};
pub use error::{Error, LookupError, Result};
pub use events::{Event, PERCUSSION_CHANNEL, is_percussion};
pub use notes::{ActiveNoteSet, Applied, Note, Session};
pub use queue::{EventQueue, EventSender};
pub use render::{DrawSink, Frame, FrameBuffer, FrameRenderer, FrameStats};
pub use ui::VisualizerApp;
