#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use dodge::simulation::obstacle::ObstacleField;
use dodge::simulation::track::{Pothole, Track, TrackParams};

fn create_test_track() -> Track {
    Track::new(TrackParams::default(), 30.0)
}

#[test]
fn test_barriers_block_inside_view() {
    let track = create_test_track();

    assert!(track.is_obstacle(100, 1));
    assert!(track.is_obstacle(100, 2));
    assert!(track.is_obstacle(100, 88));
    assert!(track.is_obstacle(100, 95));
    assert!(!track.is_obstacle(100, 44));
    assert!(!track.is_obstacle(100, 3));
}

#[test]
fn test_nothing_outside_view() {
    let track = create_test_track();

    assert!(!track.is_obstacle(10, 1));
    assert!(!track.is_obstacle(818, 1));
    assert!(!track.is_obstacle(100, -1));
    assert!(!track.is_obstacle(100, 103));
}

#[test]
fn test_pothole_is_a_solid_ellipse() {
    let mut track = create_test_track();
    track.add_pothole(Pothole { x: 300.0, y: 44.0 });

    assert!(track.is_obstacle(292, 44));
    assert!(track.is_obstacle(309, 44));
    assert!(track.is_obstacle(292, 51));
    assert!(!track.is_obstacle(312, 44));
    assert!(!track.is_obstacle(292, 53));
    assert!(!track.is_obstacle(300, 30));
}

#[test]
fn test_lane_centres() {
    let track = create_test_track();

    assert_eq!(track.lane_center(0), 14.5);
    assert_eq!(track.lane_center(1), 43.5);
    assert_eq!(track.lane_center(2), 72.5);
}

#[test]
fn test_advance_spawns_ahead_of_view() {
    let mut track = Track::new(TrackParams::default(), 0.0);

    track.advance(0.0);
    assert_eq!(track.potholes().len(), 1);
    let first = track.potholes()[0];
    assert_eq!(first.x, 44.0 + 788.0);
    assert!([14.5, 43.5, 72.5].contains(&first.y));
    // spawned outside the visible stretch
    assert!(!track.is_obstacle(824, first.y as i32));

    // spacing holds back the next pothole until the view catches up
    track.advance(0.0);
    assert_eq!(track.potholes().len(), 1);
}

#[test]
fn test_advance_drops_passed_potholes() {
    let mut track = Track::new(TrackParams::default(), 0.0);
    track.advance(0.0);

    track.advance(900.0);

    assert_eq!(track.viewport_left(), 900.0);
    assert_eq!(track.potholes().len(), 1);
    assert_eq!(track.potholes()[0].x, 44.0 + 788.0 + 900.0);
}

#[test]
fn test_pothole_comes_into_view() {
    let mut track = Track::new(TrackParams::default(), 0.0);
    track.advance(0.0);
    let pothole = track.potholes()[0];

    track.advance(100.0);

    let centre_x = (pothole.x - track.params().pothole_offset_x) as i32;
    assert!(track.is_obstacle(centre_x, pothole.y as i32));
}

#[test]
fn test_reset_clears_the_road() {
    let mut track = Track::new(TrackParams::default(), 0.0);
    track.advance(0.0);
    track.add_pothole(Pothole { x: 100.0, y: 43.5 });

    track.reset(30.0);

    assert!(track.potholes().is_empty());
    assert_eq!(track.viewport_left(), 30.0);
    assert!(!track.is_obstacle(92, 43));
}

#[test]
fn test_same_seed_same_road() {
    let mut a = Track::new(TrackParams::default(), 0.0);
    let mut b = Track::new(TrackParams::default(), 0.0);

    for step in 0..200 {
        let viewport = step as f32 * 5.0;
        a.advance(viewport);
        b.advance(viewport);
    }

    assert!(!a.potholes().is_empty());
    assert_eq!(a.potholes(), b.potholes());
}
