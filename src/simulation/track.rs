//! Scrolling three-lane road with barriers and potholes.
//!
//! The track is an [`ObstacleField`] in world coordinates. Only the stretch
//! under the viewport exists: queries outside it report no obstacle. Potholes
//! are spawned just beyond the right edge of the viewport in a random lane and
//! dropped once the viewport has passed them. Advance the track strictly
//! between ticks.

use std::fmt;

use kdtree::distance::squared_euclidean;
use kdtree::{ErrorKind as KdTreeError, KdTree};
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use tracing::trace;

use super::obstacle::ObstacleField;
use super::rng::create_rng;

type Tree2D = KdTree<f32, usize, Vec<f32>>;

/// Shape and pacing of the road.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackParams {
    /// Visible length of road, matching the controller's viewport width.
    pub visible_length: f32,
    /// Height of the road surface in pixels.
    pub height: f32,
    /// Width of one lane.
    pub lane_width: f32,
    /// Number of lanes potholes can appear in.
    pub lanes: u32,
    /// Centre line of the top barrier.
    pub top_barrier_y: f32,
    /// Centre line of the bottom barrier.
    pub bottom_barrier_y: f32,
    /// Half thickness of each barrier line.
    pub barrier_half_width: f32,
    /// Nominal pothole footprint, used for spacing.
    pub pothole_width: f32,
    /// Horizontal semi-axis of a pothole.
    pub pothole_radius_x: f32,
    /// Vertical semi-axis of a pothole.
    pub pothole_radius_y: f32,
    /// Pothole centres sit this far left of their spawn anchor.
    pub pothole_offset_x: f32,
    /// No more potholes are added while more than this many are live.
    pub max_potholes: usize,
    /// Seed for lane choice and spacing jitter.
    pub seed: u64,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            visible_length: 788.0,
            height: 103.0,
            lane_width: 29.0,
            lanes: 3,
            top_barrier_y: 1.0,
            bottom_barrier_y: 89.0,
            barrier_half_width: 1.0,
            pothole_width: 44.0,
            pothole_radius_x: 18.0,
            pothole_radius_y: 8.0,
            pothole_offset_x: 8.0,
            max_potholes: 60,
            seed: 111,
        }
    }
}

/// An elliptical hole in the road.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pothole {
    /// Spawn anchor x; the ellipse centre sits `pothole_offset_x` to its left.
    pub x: f32,
    /// Lane centre y.
    pub y: f32,
}

/// The road agents are trained on.
pub struct Track {
    params: TrackParams,
    potholes: Vec<Pothole>,
    index: Tree2D,
    viewport_left: f32,
    next_pothole_x: f32,
    rng: ChaCha12Rng,
}

impl Track {
    /// Creates an empty road with its viewport at `viewport_left`.
    pub fn new(params: TrackParams, viewport_left: f32) -> Self {
        let rng = create_rng(params.seed);
        Self {
            params,
            potholes: Vec::new(),
            index: KdTree::new(2),
            viewport_left,
            next_pothole_x: 0.0,
            rng,
        }
    }

    /// Track layout.
    pub fn params(&self) -> &TrackParams {
        &self.params
    }

    /// Live potholes, oldest first.
    pub fn potholes(&self) -> &[Pothole] {
        &self.potholes
    }

    /// Current viewport leading edge.
    pub fn viewport_left(&self) -> f32 {
        self.viewport_left
    }

    /// Y of the centre of lane `lane` (0-based).
    pub fn lane_center(&self, lane: u32) -> f32 {
        (1.0 + lane as f32) * self.params.lane_width - self.params.lane_width / 2.0
    }

    /// Places a pothole explicitly.
    pub fn add_pothole(&mut self, pothole: Pothole) {
        self.potholes.push(pothole);
        self.rebuild_index();
    }

    /// Scrolls to `viewport_left`: maybe spawns a pothole ahead and drops passed ones.
    pub fn advance(&mut self, viewport_left: f32) {
        self.viewport_left = viewport_left;

        if self.potholes.len() <= self.params.max_potholes {
            self.spawn_pothole();
        }

        let before = self.potholes.len();
        self.potholes.retain(|pothole| pothole.x >= viewport_left);
        if self.potholes.len() != before {
            trace!(
                removed = before - self.potholes.len(),
                "potholes scrolled off"
            );
        }

        self.rebuild_index();
    }

    /// Clears the road and rewinds the viewport for a new generation.
    ///
    /// The lane generator keeps its state, so each generation sees a new road.
    pub fn reset(&mut self, viewport_left: f32) {
        self.potholes.clear();
        self.next_pothole_x = 0.0;
        self.viewport_left = viewport_left;
        self.rebuild_index();
    }

    fn spawn_pothole(&mut self) {
        if self.next_pothole_x > self.viewport_left + self.params.visible_length {
            return;
        }

        let x = self.params.pothole_width + self.params.visible_length + self.viewport_left;
        let lane = self.rng.random_range(0..self.params.lanes.max(1));
        let y = self.lane_center(lane);
        self.potholes.push(Pothole { x, y });

        // keep consecutive potholes from overlapping
        let jitter = self.rng.random_range(0..5) as f32 - 3.0;
        self.next_pothole_x = x + self.params.pothole_width + jitter;
    }

    fn rebuild_index(&mut self) {
        match build_index(&self.potholes, self.params.pothole_offset_x) {
            Ok(index) => self.index = index,
            Err(err) => {
                tracing::error!(?err, "failed to index potholes");
                self.index = KdTree::new(2);
            }
        }
    }

    fn in_view(&self, x: f32, y: f32) -> bool {
        x >= self.viewport_left
            && x < self.viewport_left + self.params.visible_length
            && y >= 0.0
            && y < self.params.height
    }

    fn on_barrier(&self, y: f32) -> bool {
        y <= self.params.top_barrier_y + self.params.barrier_half_width
            || y >= self.params.bottom_barrier_y - self.params.barrier_half_width
    }

    fn in_pothole(&self, x: f32, y: f32) -> bool {
        let rx = self.params.pothole_radius_x;
        let ry = self.params.pothole_radius_y;
        let reach = rx.max(ry);
        let nearby = self
            .index
            .within(&[x, y], reach * reach, &squared_euclidean)
            .unwrap_or_default();

        nearby.into_iter().any(|(_, &i)| {
            let centre_x = self.potholes[i].x - self.params.pothole_offset_x;
            let dx = (x - centre_x) / rx;
            let dy = (y - self.potholes[i].y) / ry;
            dx * dx + dy * dy <= 1.0
        })
    }
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("viewport_left", &self.viewport_left)
            .field("potholes", &self.potholes.len())
            .field("next_pothole_x", &self.next_pothole_x)
            .finish_non_exhaustive()
    }
}

impl ObstacleField for Track {
    fn is_obstacle(&self, x: i32, y: i32) -> bool {
        let (x, y) = (x as f32, y as f32);
        self.in_view(x, y) && (self.on_barrier(y) || self.in_pothole(x, y))
    }
}

fn build_index(potholes: &[Pothole], offset_x: f32) -> Result<Tree2D, KdTreeError> {
    let mut tree = KdTree::new(2);
    for (i, pothole) in potholes.iter().enumerate() {
        tree.add(vec![pothole.x - offset_x, pothole.y], i)?;
    }
    Ok(tree)
}
