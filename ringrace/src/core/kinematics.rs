//! Heading and position integration shared by the player car and the AI car.
//!
//! Headings are in degrees, wrapped to [0, 360). A heading of 0 points up the screen and positive
//! rotations turn counter-clockwise, so the forward unit vector is
//! `(cos(heading + 90°), -sin(heading + 90°))` in screen coordinates.

use crate::core::geom::Point;
use helpers::general::wrap_deg;
use serde::{Deserialize, Serialize};

/// * `pos` - Position of the car's center
/// * `heading` - (deg) Orientation in [0, 360)
/// * `speed` - Signed scalar speed, distance units per tick
/// * `max_speed` - Current speed cap (reduced by collision penalties)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub pos: Point,
    pub heading: f64,
    pub speed: f64,
    pub max_speed: f64,
}

impl Pose {
    pub fn new(pos: Point, heading: f64, max_speed: f64) -> Pose {
        Pose {
            pos,
            heading: wrap_deg(heading),
            speed: 0.0,
            max_speed,
        }
    }
}

/// forward_vector returns the unit vector a car with the given heading drives along.
pub fn forward_vector(heading: f64) -> (f64, f64) {
    let rad = (heading + 90.0).to_radians();
    (rad.cos(), -rad.sin())
}

/// advance moves the pose by `distance` along its heading. Negative distances move backwards.
pub fn advance(pose: &mut Pose, distance: f64) {
    let (fx, fy) = forward_vector(pose.heading);
    pose.pos.x += fx * distance;
    pose.pos.y += fy * distance;
}

/// rotate turns the pose by `delta` degrees (positive = counter-clockwise on screen).
pub fn rotate(pose: &mut Pose, delta: f64) {
    pose.heading = wrap_deg(pose.heading + delta);
}

/// heading_towards returns the heading whose forward vector points from `from` to `to`.
pub fn heading_towards(from: &Point, to: &Point) -> f64 {
    wrap_deg((from.y - to.y).atan2(to.x - from.x).to_degrees() - 90.0)
}
