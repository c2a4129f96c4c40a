use midir::{MidiInput, MidiInputConnection, MidiInputPort};
use parking_lot::Mutex;

use super::{EventSource, decode};
use crate::error::{Error, Result};
use crate::queue::EventSender;

const CLIENT_NAME: &str = "eyetunes";

pub fn list_ports() -> Result<Vec<String>> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;
    Ok(midi_in
        .ports()
        .iter()
        .map(|p| midi_in.port_name(p).unwrap_or_default())
        .collect())
}

pub struct LiveInput {
    input: Option<MidiInput>,
    port: MidiInputPort,
    port_name: String,
    connection: Mutex<Option<MidiInputConnection<()>>>,
}

impl LiveInput {
    /// Opens the first port whose name contains `hint`, or the first port.
    pub fn open(hint: Option<&str>) -> Result<Self> {
        let midi_in = MidiInput::new(CLIENT_NAME)?;
        let ports = midi_in.ports();

        let port = hint
            .and_then(|hint| {
                ports.iter().find(|p| {
                    midi_in
                        .port_name(p)
                        .map(|name| name.contains(hint))
                        .unwrap_or(false)
                })
            })
            .or_else(|| ports.first())
            .cloned()
            .ok_or(Error::NoInputDevice)?;

        let port_name = midi_in
            .port_name(&port)
            .map_err(|e| Error::MidiPort(e.to_string()))?;
        if let Some(hint) = hint {
            if !port_name.contains(hint) {
                tracing::warn!("No input port matches {:?}, using {}", hint, port_name);
            }
        }

        Ok(Self {
            input: Some(midi_in),
            port,
            port_name,
            connection: Mutex::new(None),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl EventSource for LiveInput {
    fn start(&mut self, events: EventSender) -> Result<()> {
        let midi_in = self
            .input
            .take()
            .ok_or_else(|| Error::MidiPort(format!("{} already started", self.port_name)))?;

        let connection = midi_in.connect(
            &self.port,
            "eyetunes-input",
            move |_timestamp, message, _| {
                let event = decode(message);
                tracing::trace!("MIDI in {:02X?} -> {:?}", message, event);
                events.push(event);
            },
            (),
        )?;

        tracing::info!("Listening on {}", self.port_name);
        *self.connection.lock() = Some(connection);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.connection.lock().is_some()
    }

    fn close(&mut self) {
        if let Some(connection) = self.connection.lock().take() {
            connection.close();
            tracing::info!("Closed {}", self.port_name);
        }
    }
}
