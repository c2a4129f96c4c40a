use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::Result;
use crate::notes::{Applied, Session};
use crate::queue::EventQueue;
use crate::render::{DrawSink, Frame, FrameBuffer, FrameRenderer, FrameStats, SharedFrame};
use crate::transport::EventSource;
use crate::visuals::{Resolver, VisualStore};

#[derive(Debug, Clone)]
pub enum EngineCommand {
    ReloadMappings(PathBuf),
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum EngineUpdate {
    MappingsReloaded { path: PathBuf },
    SourceFinished,
    Error { message: String },
}

pub struct EngineHandle {
    pub command_tx: Sender<EngineCommand>,
    pub update_rx: Receiver<EngineUpdate>,
    frame: SharedFrame,
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn frame(&self) -> Arc<Frame> {
        self.frame.load_full()
    }

    pub fn shared_frame(&self) -> SharedFrame {
        self.frame.clone()
    }

    pub fn shutdown(&mut self) {
        let _ = self.command_tx.send(EngineCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Engine thread panicked");
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub struct Consumer {
    session: Session,
    renderer: FrameRenderer,
    store: Box<dyn VisualStore + Send>,
}

impl Consumer {
    pub fn new(renderer: FrameRenderer, store: Box<dyn VisualStore + Send>) -> Self {
        Self {
            session: Session::new(),
            renderer,
            store,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn set_store(&mut self, store: Box<dyn VisualStore + Send>) {
        self.store = store;
    }

    pub fn drain(&mut self, queue: &EventQueue, sink: &mut dyn DrawSink) -> usize {
        let mut consumed = 0;
        while let Some(event) = queue.pop() {
            match self.session.apply(&event) {
                Applied::ProgramChanged(program) => tracing::debug!("Program {}", program),
                Applied::Started(note) => tracing::debug!("Start {:?}", note),
                Applied::Stopped(note) => tracing::debug!("Stop {:?}", note),
                Applied::Unmatched => tracing::debug!("No active note for {:?}", event),
                Applied::Ignored => tracing::trace!("Ignored {:?}", event),
            }
            self.renderer
                .render(self.session.notes(), self.store.as_ref(), sink);
            consumed += 1;
        }
        consumed
    }

    pub fn tick(&mut self, sink: &mut dyn DrawSink) -> FrameStats {
        self.renderer
            .render(self.session.notes(), self.store.as_ref(), sink)
    }

    pub fn finish(&mut self, sink: &mut dyn DrawSink) {
        let held = self.session.notes().len();
        if held > 0 {
            tracing::info!("Releasing {} held notes", held);
        }
        self.session.release_all();
        self.tick(sink);
    }
}

/// Starts the source, then the engine thread. A source that fails to start
/// is returned as an error and no thread is spawned.
pub fn spawn_engine(
    config: &Config,
    resolver: Resolver,
    mut source: Box<dyn EventSource>,
) -> Result<EngineHandle> {
    let queue = EventQueue::new();
    source.start(queue.sender())?;

    let (command_tx, command_rx) = crossbeam::channel::unbounded();
    let (update_tx, update_rx) = crossbeam::channel::unbounded();

    let sink = FrameBuffer::new();
    let frame = sink.shared();
    let consumer = Consumer::new(FrameRenderer::new(config.background), Box::new(resolver));
    let pacing = Pacing {
        poll: config.poll_interval(),
        tick: config.tick_interval(),
    };

    let thread = std::thread::Builder::new()
        .name("engine".into())
        .spawn(move || {
            engine_thread(
                EngineState {
                    consumer,
                    queue,
                    source,
                    sink,
                    finished: false,
                },
                pacing,
                command_rx,
                update_tx,
            );
        })?;

    Ok(EngineHandle {
        command_tx,
        update_rx,
        frame,
        thread: Some(thread),
    })
}

struct Pacing {
    poll: Duration,
    tick: Duration,
}

struct EngineState {
    consumer: Consumer,
    queue: EventQueue,
    source: Box<dyn EventSource>,
    sink: FrameBuffer,
    finished: bool,
}

fn engine_thread(
    mut state: EngineState,
    pacing: Pacing,
    command_rx: Receiver<EngineCommand>,
    update_tx: Sender<EngineUpdate>,
) {
    tracing::info!("Engine started");
    let mut next_tick = Instant::now();

    loop {
        match command_rx.recv_timeout(pacing.poll) {
            Ok(EngineCommand::ReloadMappings(path)) => match Resolver::load(Some(&path)) {
                Ok(resolver) => {
                    tracing::info!("Mappings reloaded from {}", path.display());
                    state.consumer.set_store(Box::new(resolver));
                    let _ = update_tx.send(EngineUpdate::MappingsReloaded { path });
                }
                Err(e) => {
                    tracing::error!("Failed to reload mappings: {}", e);
                    let _ = update_tx.send(EngineUpdate::Error {
                        message: format!("Failed to reload mappings: {}", e),
                    });
                }
            },
            Ok(EngineCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        state.consumer.drain(&state.queue, &mut state.sink);

        let now = Instant::now();
        if now >= next_tick {
            state.consumer.tick(&mut state.sink);
            next_tick = now + pacing.tick;
        }

        if !state.finished && !state.source.is_active() && state.queue.is_empty() {
            state.finished = true;
            state.consumer.finish(&mut state.sink);
            tracing::info!("Source finished");
            let _ = update_tx.send(EngineUpdate::SourceFinished);
        }
    }

    state.source.close();
    tracing::info!("Engine stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::queue::EventSender;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Scripted {
        events: Vec<Event>,
        active: Arc<AtomicBool>,
    }

    impl Scripted {
        fn new(events: Vec<Event>) -> Self {
            Self {
                events,
                active: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl EventSource for Scripted {
        fn start(&mut self, events: EventSender) -> Result<()> {
            for event in self.events.drain(..) {
                events.push(event);
            }
            Ok(())
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::Acquire)
        }

        fn close(&mut self) {
            self.active.store(false, Ordering::Release);
        }
    }

    struct Broken;

    impl EventSource for Broken {
        fn start(&mut self, _events: EventSender) -> Result<()> {
            Err(crate::Error::NoInputDevice)
        }

        fn is_active(&self) -> bool {
            false
        }

        fn close(&mut self) {}
    }

    fn note_on(pitch: u8) -> Event {
        Event::NoteStart {
            channel: 0,
            pitch,
            velocity: 100,
        }
    }

    fn wait_for(handle: &EngineHandle, want: impl Fn(&EngineUpdate) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Ok(update) = handle.update_rx.recv_timeout(Duration::from_millis(50)) {
                if want(&update) {
                    return true;
                }
            }
        }
        false
    }

    #[test]
    fn test_drain_renders_once_per_event() {
        let queue = EventQueue::new();
        let mut sink = FrameBuffer::new();
        let mut consumer = Consumer::new(FrameRenderer::default(), Box::new(Resolver::default()));

        queue.push(note_on(60));
        queue.push(note_on(64));
        queue.push(Event::Other);

        assert_eq!(consumer.drain(&queue, &mut sink), 3);
        assert_eq!(sink.presented(), 3);
        assert_eq!(sink.latest().primitive_count(), 2);
        assert_eq!(consumer.session().notes().len(), 2);

        consumer.tick(&mut sink);
        assert_eq!(sink.presented(), 4);
    }

    #[test]
    fn test_finish_clears_held_notes() {
        let queue = EventQueue::new();
        let mut sink = FrameBuffer::new();
        let mut consumer = Consumer::new(FrameRenderer::default(), Box::new(Resolver::default()));
        queue.push(note_on(60));
        consumer.drain(&queue, &mut sink);

        consumer.finish(&mut sink);
        assert!(consumer.session().notes().is_empty());
        assert_eq!(sink.latest().primitive_count(), 0);
    }

    #[test]
    fn test_failed_source_is_fatal_at_spawn() {
        let result = spawn_engine(&Config::default(), Resolver::default(), Box::new(Broken));
        assert!(matches!(result, Err(crate::Error::NoInputDevice)));
    }

    #[test]
    fn test_engine_reports_finished_source() {
        let source = Scripted::new(vec![note_on(60)]);
        let handle = spawn_engine(&Config::default(), Resolver::default(), Box::new(source))
            .unwrap();

        assert!(wait_for(&handle, |u| matches!(u, EngineUpdate::SourceFinished)));
        assert!(handle.frame().sequence >= 1);
        assert_eq!(handle.frame().primitive_count(), 0);
    }

    #[test]
    fn test_bad_mapping_reload_reports_error() {
        let source = Scripted::new(Vec::new());
        let handle = spawn_engine(&Config::default(), Resolver::default(), Box::new(source))
            .unwrap();

        handle
            .command_tx
            .send(EngineCommand::ReloadMappings(PathBuf::from(
                "/definitely/not/here/mappings.ron",
            )))
            .unwrap();
        assert!(wait_for(&handle, |u| matches!(u, EngineUpdate::Error { .. })));
    }

    #[test]
    fn test_drop_stops_engine() {
        let source = Scripted::new(Vec::new());
        let handle = spawn_engine(&Config::default(), Resolver::default(), Box::new(source))
            .unwrap();
        let frame = handle.shared_frame();
        drop(handle);

        let sequence = frame.load().sequence;
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(frame.load().sequence, sequence);
    }
}
