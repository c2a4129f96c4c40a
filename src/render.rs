use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::error::LookupError;
use crate::notes::{ActiveNoteSet, Note};
use crate::visuals::{self, Outline, Point, Rgb, VisualStore};

/// Rasterizer surface. Coordinates are normalized, origin bottom-left.
pub trait DrawSink {
    fn clear(&mut self, background: Rgb);
    fn set_color(&mut self, color: Rgb);
    fn fill_polygon(&mut self, xs: &[f64], ys: &[f64]);
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64);
    fn draw_line_segment(&mut self, x0: f64, y0: f64, x1: f64, y1: f64);
    fn present_frame(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb),
    SetColor(Rgb),
    FillPolygon { xs: Vec<f64>, ys: Vec<f64> },
    FillCircle { cx: f64, cy: f64, radius: f64 },
    LineSegment { x0: f64, y0: f64, x1: f64, y1: f64 },
}

impl DrawCommand {
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            DrawCommand::FillPolygon { .. }
                | DrawCommand::FillCircle { .. }
                | DrawCommand::LineSegment { .. }
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub sequence: u64,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn primitive_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_primitive()).count()
    }
}

pub type SharedFrame = Arc<ArcSwap<Frame>>;

pub struct FrameBuffer {
    back: Vec<DrawCommand>,
    front: SharedFrame,
    presented: u64,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            back: Vec::new(),
            front: Arc::new(ArcSwap::from_pointee(Frame::default())),
            presented: 0,
        }
    }

    pub fn shared(&self) -> SharedFrame {
        self.front.clone()
    }

    pub fn latest(&self) -> Arc<Frame> {
        self.front.load_full()
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawSink for FrameBuffer {
    fn clear(&mut self, background: Rgb) {
        self.back.clear();
        self.back.push(DrawCommand::Clear(background));
    }

    fn set_color(&mut self, color: Rgb) {
        self.back.push(DrawCommand::SetColor(color));
    }

    fn fill_polygon(&mut self, xs: &[f64], ys: &[f64]) {
        self.back.push(DrawCommand::FillPolygon {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        });
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.back.push(DrawCommand::FillCircle { cx, cy, radius });
    }

    fn draw_line_segment(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        self.back.push(DrawCommand::LineSegment { x0, y0, x1, y1 });
    }

    fn present_frame(&mut self) {
        self.presented += 1;
        let frame = Frame {
            sequence: self.presented,
            commands: std::mem::take(&mut self.back),
        };
        self.front.store(Arc::new(frame));
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub skipped: usize,
}

pub struct FrameRenderer {
    background: Rgb,
}

impl FrameRenderer {
    pub fn new(background: Rgb) -> Self {
        Self { background }
    }

    /// Draws every active note in start order and presents once. Notes that
    /// fail to resolve are left out of this frame only.
    pub fn render(
        &self,
        notes: &ActiveNoteSet,
        store: &dyn VisualStore,
        sink: &mut dyn DrawSink,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        sink.clear(self.background);

        for note in notes {
            match Self::resolve(note, store) {
                Ok((color, outline)) => {
                    sink.set_color(color);
                    emit(&outline, sink);
                    stats.drawn += 1;
                }
                Err(e @ LookupError::Unavailable(_)) => {
                    tracing::warn!("Skipping note {:?}: {}", note, e);
                    stats.skipped += 1;
                }
                Err(e) => {
                    tracing::debug!("Skipping note {:?}: {}", note, e);
                    stats.skipped += 1;
                }
            }
        }

        sink.present_frame();
        stats
    }

    fn resolve(note: &Note, store: &dyn VisualStore) -> Result<(Rgb, Outline), LookupError> {
        let descriptor = store.lookup_descriptor(note.program, note.is_percussion())?;
        let color = store.lookup_color(descriptor.color, note.pitch)?;
        let size = visuals::compute_size(note.velocity);
        let (x, y) = visuals::place(note.pitch, descriptor.region);
        let outline = visuals::vertices_for(descriptor.shape, Point::new(x, y), size);
        Ok((color, outline))
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(Rgb::BLACK)
    }
}

fn emit(outline: &Outline, sink: &mut dyn DrawSink) {
    match outline {
        Outline::Polygon(points) => {
            let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
            let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
            sink.fill_polygon(&xs, &ys);
        }
        Outline::Circle { center, radius } => sink.fill_circle(center.x, center.y, *radius),
        Outline::Polyline(points) => {
            for pair in points.windows(2) {
                sink.draw_line_segment(pair[0].x, pair[0].y, pair[1].x, pair[1].y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::notes::Session;
    use crate::visuals::{ColorName, Resolver, VisualDescriptor};

    fn play(session: &mut Session, events: &[Event]) {
        for event in events {
            session.apply(event);
        }
    }

    #[test]
    fn test_single_note_frame() {
        let resolver = Resolver::default();
        let renderer = FrameRenderer::default();
        let mut sink = FrameBuffer::new();
        let mut session = Session::new();

        play(
            &mut session,
            &[
                Event::ProgramChange {
                    channel: 0,
                    program: 0,
                },
                Event::NoteStart {
                    channel: 0,
                    pitch: 60,
                    velocity: 127,
                },
            ],
        );
        let stats = renderer.render(session.notes(), &resolver, &mut sink);
        assert_eq!(stats, FrameStats { drawn: 1, skipped: 0 });

        let frame = sink.latest();
        assert_eq!(frame.sequence, 1);
        assert_eq!(frame.primitive_count(), 1);
        assert_eq!(frame.commands[0], DrawCommand::Clear(Rgb::BLACK));

        let desc = resolver.resolve_descriptor(0, false).unwrap();
        let expected = resolver.resolve_color(desc.color, 60).unwrap();
        assert_eq!(frame.commands[1], DrawCommand::SetColor(expected));
        assert!(matches!(
            &frame.commands[2],
            DrawCommand::FillPolygon { xs, .. } if xs.len() == 4
        ));

        session.apply(&Event::NoteStop {
            channel: 0,
            pitch: 60,
        });
        renderer.render(session.notes(), &resolver, &mut sink);
        let frame = sink.latest();
        assert_eq!(frame.sequence, 2);
        assert_eq!(frame.primitive_count(), 0);
        assert_eq!(frame.commands, vec![DrawCommand::Clear(Rgb::BLACK)]);
    }

    #[test]
    fn test_draw_order_follows_note_start_order() {
        let resolver = Resolver::default();
        let renderer = FrameRenderer::default();
        let mut sink = FrameBuffer::new();
        let mut session = Session::new();

        for pitch in [90, 20, 55] {
            session.apply(&Event::NoteStart {
                channel: 0,
                pitch,
                velocity: 100,
            });
        }
        renderer.render(session.notes(), &resolver, &mut sink);

        let colors: Vec<Rgb> = sink
            .latest()
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::SetColor(rgb) => Some(*rgb),
                _ => None,
            })
            .collect();
        let expected: Vec<Rgb> = [90, 20, 55]
            .iter()
            .map(|&p| resolver.resolve_color(ColorName::Red, p).unwrap())
            .collect();
        assert_eq!(colors, expected);
    }

    #[test]
    fn test_wave_is_stroked_as_segments() {
        let resolver = Resolver::default();
        let mut sink = FrameBuffer::new();
        let mut session = Session::new();
        play(
            &mut session,
            &[
                Event::ProgramChange {
                    channel: 1,
                    program: 33,
                },
                Event::NoteStart {
                    channel: 1,
                    pitch: 40,
                    velocity: 90,
                },
            ],
        );
        FrameRenderer::default().render(session.notes(), &resolver, &mut sink);

        let frame = sink.latest();
        assert_eq!(frame.primitive_count(), 50);
        assert!(
            frame
                .commands
                .iter()
                .filter(|c| c.is_primitive())
                .all(|c| matches!(c, DrawCommand::LineSegment { .. }))
        );
    }

    struct FlakyStore {
        inner: Resolver,
        broken_program: u8,
    }

    impl VisualStore for FlakyStore {
        fn lookup_descriptor(
            &self,
            program: u8,
            percussion: bool,
        ) -> Result<VisualDescriptor, LookupError> {
            if program == self.broken_program {
                return Err(LookupError::Unavailable("connection reset".into()));
            }
            self.inner.lookup_descriptor(program, percussion)
        }

        fn lookup_color(&self, color: ColorName, pitch: u8) -> Result<Rgb, LookupError> {
            self.inner.lookup_color(color, pitch)
        }
    }

    #[test]
    fn test_failed_lookup_skips_only_that_note() {
        let store = FlakyStore {
            inner: Resolver::default(),
            broken_program: 5,
        };
        let mut sink = FrameBuffer::new();
        let mut session = Session::new();
        play(
            &mut session,
            &[
                Event::NoteStart {
                    channel: 0,
                    pitch: 60,
                    velocity: 80,
                },
                Event::ProgramChange {
                    channel: 0,
                    program: 5,
                },
                Event::NoteStart {
                    channel: 0,
                    pitch: 62,
                    velocity: 80,
                },
                Event::ProgramChange {
                    channel: 0,
                    program: 8,
                },
                Event::NoteStart {
                    channel: 0,
                    pitch: 64,
                    velocity: 80,
                },
            ],
        );

        let stats = FrameRenderer::default().render(session.notes(), &store, &mut sink);
        assert_eq!(stats, FrameStats { drawn: 2, skipped: 1 });
        assert_eq!(sink.latest().primitive_count(), 2);
        assert_eq!(sink.presented(), 1);
    }

    #[test]
    fn test_empty_mapping_still_presents() {
        let resolver = Resolver::new(crate::visuals::DescriptorTable::empty());
        let mut sink = FrameBuffer::new();
        let mut session = Session::new();
        session.apply(&Event::NoteStart {
            channel: 9,
            pitch: 38,
            velocity: 100,
        });

        let stats = FrameRenderer::new(Rgb::WHITE).render(session.notes(), &resolver, &mut sink);
        assert_eq!(stats.skipped, 1);
        assert_eq!(
            sink.latest().commands,
            vec![DrawCommand::Clear(Rgb::WHITE)]
        );
    }
}
