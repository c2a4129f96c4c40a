use eframe::egui;

use crate::render::{DrawCommand, Frame};
use crate::visuals::Rgb;

const LINE_WIDTH: f32 = 2.0;

pub struct Canvas<'a> {
    frame: &'a Frame,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let rect = response.rect;

        // normalized coordinates, origin bottom-left
        let to_screen = |x: f64, y: f64| {
            egui::Pos2::new(
                rect.left() + x as f32 * rect.width(),
                rect.bottom() - y as f32 * rect.height(),
            )
        };

        let mut color = egui::Color32::WHITE;
        for command in &self.frame.commands {
            match command {
                DrawCommand::Clear(background) => {
                    painter.rect_filled(rect, 0.0, color32(*background));
                }
                DrawCommand::SetColor(rgb) => color = color32(*rgb),
                DrawCommand::FillPolygon { xs, ys } => {
                    let points = xs.iter().zip(ys).map(|(&x, &y)| to_screen(x, y)).collect();
                    painter.add(egui::Shape::convex_polygon(
                        points,
                        color,
                        egui::Stroke::NONE,
                    ));
                }
                DrawCommand::FillCircle { cx, cy, radius } => {
                    painter.circle_filled(
                        to_screen(*cx, *cy),
                        *radius as f32 * rect.width(),
                        color,
                    );
                }
                DrawCommand::LineSegment { x0, y0, x1, y1 } => {
                    painter.line_segment(
                        [to_screen(*x0, *y0), to_screen(*x1, *y1)],
                        egui::Stroke::new(LINE_WIDTH, color),
                    );
                }
            }
        }

        response
    }
}

fn color32(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}
