use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::EventSource;
use crate::error::{Error, Result};
use crate::events::Event;
use crate::queue::EventSender;

// 120 BPM
const DEFAULT_TEMPO_US: u32 = 500_000;
const MAX_SLEEP: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent {
    pub at: Duration,
    pub event: Event,
}

pub struct MidiFileSource {
    events: Arc<Vec<TimedEvent>>,
    end: Duration,
    running: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    player: Option<JoinHandle<()>>,
}

impl MidiFileSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        tracing::info!("Loaded {}", path.as_ref().display());
        Self::parse(&data)
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)?;

        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => tpb.as_int() as u64,
            Timing::Timecode(_, _) => return Err(Error::MidiUnsupportedTiming),
        };

        let (events, end) = timeline(&smf, ticks_per_beat);
        tracing::debug!(
            "Parsed {} tracks into {} events over {:.2}s",
            smf.tracks.len(),
            events.len(),
            end.as_secs_f64()
        );

        Ok(Self {
            events: Arc::new(events),
            end,
            running: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            player: None,
        })
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn duration(&self) -> Duration {
        self.end
    }
}

enum Step {
    Tempo(u32),
    Event(Event),
    EndOfTrack,
}

/// Merges all tracks and converts ticks to wall-clock offsets through the
/// tempo map. Events on the same tick keep track order.
fn timeline(smf: &Smf, ticks_per_beat: u64) -> (Vec<TimedEvent>, Duration) {
    let mut steps: Vec<(u64, Step)> = Vec::new();
    for track in &smf.tracks {
        let mut tick = 0u64;
        for ev in track {
            tick += ev.delta.as_int() as u64;
            let step = match ev.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => Step::Tempo(tempo.as_int()),
                TrackEventKind::Meta(MetaMessage::EndOfTrack) => Step::EndOfTrack,
                TrackEventKind::Midi { channel, message } => {
                    match convert(channel.as_int(), message) {
                        Event::Other => continue,
                        event => Step::Event(event),
                    }
                }
                _ => continue,
            };
            steps.push((tick, step));
        }
    }
    steps.sort_by_key(|(tick, _)| *tick);

    let mut tempo = DEFAULT_TEMPO_US as u64;
    let mut last_tick = 0u64;
    let mut elapsed_us = 0u64;
    let mut end_us = 0u64;
    let mut events = Vec::with_capacity(steps.len());
    for (tick, step) in steps {
        elapsed_us += (tick - last_tick) * tempo / ticks_per_beat;
        last_tick = tick;
        match step {
            Step::Tempo(us) => tempo = us as u64,
            Step::Event(event) => events.push(TimedEvent {
                at: Duration::from_micros(elapsed_us),
                event,
            }),
            Step::EndOfTrack => {}
        }
        end_us = elapsed_us;
    }
    (events, Duration::from_micros(end_us))
}

fn convert(channel: u8, message: MidiMessage) -> Event {
    match message {
        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => Event::NoteStart {
            channel,
            pitch: key.as_int(),
            velocity: vel.as_int(),
        },
        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => Event::NoteStop {
            channel,
            pitch: key.as_int(),
        },
        MidiMessage::ProgramChange { program } => Event::ProgramChange {
            channel,
            program: program.as_int(),
        },
        _ => Event::Other,
    }
}

fn wait_until(start: Instant, at: Duration, stop: &AtomicBool) -> bool {
    loop {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        let now = start.elapsed();
        if now >= at {
            return true;
        }
        thread::sleep((at - now).min(MAX_SLEEP));
    }
}

fn play(
    events: Arc<Vec<TimedEvent>>,
    end: Duration,
    sender: EventSender,
    running: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
) {
    let start = Instant::now();
    let mut delivered = true;
    for timed in events.iter() {
        if !wait_until(start, timed.at, &stop) {
            delivered = false;
            break;
        }
        if !sender.push(timed.event) {
            tracing::debug!("Event queue dropped, stopping playback");
            delivered = false;
            break;
        }
    }
    if delivered {
        wait_until(start, end, &stop);
    }
    running.store(false, Ordering::Release);
    tracing::info!("Playback finished");
}

impl EventSource for MidiFileSource {
    fn start(&mut self, events: EventSender) -> Result<()> {
        if self.player.is_some() {
            return Err(Error::MidiPort("playback already started".into()));
        }
        self.stop.store(false, Ordering::Release);
        self.running.store(true, Ordering::Release);

        let timeline = self.events.clone();
        let end = self.end;
        let running = self.running.clone();
        let stop = self.stop.clone();
        let handle = thread::Builder::new()
            .name("midi-file-player".into())
            .spawn(move || play(timeline, end, events, running, stop))?;
        self.player = Some(handle);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn close(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.player.take() {
            let _ = handle.join();
        }
        self.running.store(false, Ordering::Release);
    }
}

impl Drop for MidiFileSource {
    fn drop(&mut self) {
        self.close();
    }
}
