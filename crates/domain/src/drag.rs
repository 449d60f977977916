use std::time::Duration;

/// Mouse drags start once the pointer has travelled this far (px).
pub const POINTER_ACTIVATION_DISTANCE: f64 = 5.0;
/// Touch drags start after the finger has been held this long.
pub const TOUCH_ACTIVATION_DELAY: Duration = Duration::from_millis(250);
/// Movement allowed during the touch hold before the drag is abandoned (px).
pub const TOUCH_TOLERANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Index of the droppable whose center is nearest to the center of the
/// dragged rectangle. Ties resolve to the lowest index.
pub fn closest_center(active: &Rect, droppables: &[Rect]) -> Option<usize> {
    let origin = active.center();
    droppables
        .iter()
        .enumerate()
        .map(|(index, rect)| (index, origin.distance_to(rect.center())))
        .fold(None, |best: Option<(usize, f64)>, (index, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((index, distance)),
        })
        .map(|(index, _)| index)
}

/// Lays out `count` square cells left-to-right, top-to-bottom.
pub fn grid_rects(count: usize, columns: usize, cell: f64, gap: f64) -> Vec<Rect> {
    let columns = columns.max(1);
    (0..count)
        .map(|index| {
            let column = (index % columns) as f64;
            let row = (index / columns) as f64;
            Rect::new(column * (cell + gap), row * (cell + gap), cell, cell)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Pending,
    Active,
    Aborted,
}

/// Decides whether a pressed pointer has turned into a drag.
pub fn check_activation(
    kind: PointerKind,
    origin: Point,
    current: Point,
    held_for: Duration,
) -> Activation {
    let travelled = origin.distance_to(current);
    match kind {
        PointerKind::Mouse if travelled >= POINTER_ACTIVATION_DISTANCE => Activation::Active,
        PointerKind::Mouse => Activation::Pending,
        PointerKind::Touch if travelled > TOUCH_TOLERANCE => Activation::Aborted,
        PointerKind::Touch if held_for >= TOUCH_ACTIVATION_DELAY => Activation::Active,
        PointerKind::Touch => Activation::Pending,
    }
}
