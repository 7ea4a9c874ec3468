//! Occupancy queries the simulation core drives against.
//!
//! The core never owns the world geometry; it only asks whether a pixel is
//! blocked. Fields must be `Sync` because agents are sensed in parallel.

use std::collections::HashSet;

/// Answers whether an integer position is blocked.
///
/// Positions outside the field must report `false`.
pub trait ObstacleField: Sync {
    /// Returns `true` if `(x, y)` is an obstacle.
    fn is_obstacle(&self, x: i32, y: i32) -> bool;
}

impl<F: ObstacleField + ?Sized> ObstacleField for &F {
    fn is_obstacle(&self, x: i32, y: i32) -> bool {
        (**self).is_obstacle(x, y)
    }
}

/// A field with nothing in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenField;

impl ObstacleField for OpenField {
    fn is_obstacle(&self, _x: i32, _y: i32) -> bool {
        false
    }
}

/// A sparse set of blocked pixels.
#[derive(Debug, Clone, Default)]
pub struct PointField {
    cells: HashSet<(i32, i32)>,
}

impl PointField {
    /// Creates an empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a single pixel as blocked.
    pub fn insert(&mut self, x: i32, y: i32) {
        self.cells.insert((x, y));
    }

    /// Unblocks a single pixel.
    pub fn remove(&mut self, x: i32, y: i32) {
        self.cells.remove(&(x, y));
    }

    /// Number of blocked pixels.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no pixel is blocked.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(i32, i32)> for PointField {
    fn from_iter<I: IntoIterator<Item = (i32, i32)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl ObstacleField for PointField {
    fn is_obstacle(&self, x: i32, y: i32) -> bool {
        self.cells.contains(&(x, y))
    }
}

/// A dense occupancy bitmap, row-major, with the origin at `(0, 0)`.
#[derive(Debug, Clone)]
pub struct GridField {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl GridField {
    /// Creates an empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Grid width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Marks or clears a pixel. Out-of-range positions are ignored.
    pub fn set(&mut self, x: i32, y: i32, blocked: bool) {
        if let Some(index) = self.index(x, y) {
            self.cells[index] = blocked;
        }
    }

    /// Blocks every pixel of an axis-aligned rectangle (inclusive bounds).
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.set(x, y, true);
            }
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}

impl ObstacleField for GridField {
    fn is_obstacle(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|index| self.cells[index])
    }
}
