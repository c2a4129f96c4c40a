use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const WAVE_POINTS: usize = 51;
const ZIGZAG_TEETH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Square,
    HorizontalRect,
    /// A horizontal rectangle rotated counter-clockwise by `angle` degrees.
    DiagonalRect { angle: f64 },
    Circle,
    Zigzag,
    Wave,
}

impl ShapeKind {
    pub const RIGHT_DIAGONAL: ShapeKind = ShapeKind::DiagonalRect { angle: 45.0 };
    pub const LEFT_DIAGONAL: ShapeKind = ShapeKind::DiagonalRect { angle: 135.0 };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Polygon(Vec<Point>),
    Circle { center: Point, radius: f64 },
    Polyline(Vec<Point>),
}

pub fn vertices_for(shape: ShapeKind, center: Point, size: f64) -> Outline {
    match shape {
        ShapeKind::Square => rectangle(center, size / 2.0, size / 2.0, 0.0),
        ShapeKind::HorizontalRect => rectangle(center, size / 2.0, size / 4.0, 0.0),
        ShapeKind::DiagonalRect { angle } => {
            rectangle(center, size / 2.0, size / 4.0, angle.to_radians())
        }
        ShapeKind::Circle => Outline::Circle {
            center,
            radius: size / 2.0,
        },
        ShapeKind::Zigzag => zigzag(center, size),
        ShapeKind::Wave => wave(center, size),
    }
}

fn rectangle(center: Point, half_width: f64, half_height: f64, angle: f64) -> Outline {
    let (s, c) = angle.sin_cos();
    let corners = [
        (-half_width, -half_height),
        (-half_width, half_height),
        (half_width, half_height),
        (half_width, -half_height),
    ];
    Outline::Polygon(
        corners
            .iter()
            .map(|&(dx, dy)| Point::new(center.x + dx * c - dy * s, center.y + dx * s + dy * c))
            .collect(),
    )
}

fn zigzag(center: Point, size: f64) -> Outline {
    let tooth = size / ZIGZAG_TEETH as f64;
    let height = 3f64.sqrt() / 2.0 * tooth;
    let left = center.x - size / 2.0;

    let mut points = Vec::with_capacity(ZIGZAG_TEETH * 2 + 1);
    points.push(Point::new(left, center.y));
    for i in 0..ZIGZAG_TEETH {
        let start = left + i as f64 * tooth;
        points.push(Point::new(start + tooth / 2.0, center.y + height));
        points.push(Point::new(start + tooth, center.y));
    }
    Outline::Polyline(points)
}

fn wave(center: Point, size: f64) -> Outline {
    let amplitude = size / 4.0;
    let steps = (WAVE_POINTS - 1) as f64;
    let points = (0..WAVE_POINTS)
        .map(|i| {
            let t = i as f64 / steps;
            Point::new(
                center.x + (2.0 * t - 1.0) * size,
                center.y + amplitude * (2.0 * PI * t).sin(),
            )
        })
        .collect();
    Outline::Polyline(points)
}
