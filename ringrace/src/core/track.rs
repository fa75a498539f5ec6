use crate::core::error::{check_finite, ConfigError};
use crate::core::geom::{Ellipse, Point, Rect};
use helpers::general::argmin;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tolerance used when checking that the two track ellipses share their center.
const CENTER_TOLERANCE: f64 = 1e-9;

/// * `outer` - Bounding rectangle of the outer track boundary
/// * `inner` - Bounding rectangle of the inner boundary (the infield hole)
/// * `no_waypoints` - Number of waypoints sampled along the midline for the AI racing line
/// * `start_line` - Optional start/finish rectangle; derived from the track if not set
/// * `anchor_offset` - Distance of the race start anchor above the bottom edge of `outer`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TrackPars {
    pub outer: Rect,
    pub inner: Rect,
    pub no_waypoints: usize,
    pub start_line: Option<Rect>,
    pub anchor_offset: f64,
}

impl Default for TrackPars {
    fn default() -> Self {
        TrackPars {
            outer: Rect::new(100.0, 50.0, 600.0, 500.0),
            inner: Rect::new(200.0, 150.0, 400.0, 300.0),
            no_waypoints: 100,
            start_line: None,
            anchor_offset: 50.0,
        }
    }
}

/// Ring-shaped track between two concentric ellipses.
#[derive(Debug, Clone)]
pub struct Track {
    pub outer_rect: Rect,
    pub inner_rect: Rect,
    pub start_line: Rect,
    pub race_start: Point,
    outer: Ellipse,
    inner: Ellipse,
    midline: Ellipse,
}

impl Track {
    /// new validates the track parameters and derives the ellipses, the start/finish line and the
    /// race start anchor. The waypoint count is validated by `generate_waypoints`.
    pub fn new(track_pars: &TrackPars) -> Result<Track, ConfigError> {
        check_rect("outer track", &track_pars.outer)?;
        check_rect("inner track", &track_pars.inner)?;
        check_finite("anchor offset", track_pars.anchor_offset)?;
        if let Some(start_line) = &track_pars.start_line {
            check_rect("start line", start_line)?;
        }

        let outer = Ellipse::inscribed(&track_pars.outer);
        let inner = Ellipse::inscribed(&track_pars.inner);

        if (outer.cx - inner.cx).abs() > CENTER_TOLERANCE
            || (outer.cy - inner.cy).abs() > CENTER_TOLERANCE
        {
            return Err(ConfigError::NotConcentric);
        }

        if inner.rx >= outer.rx || inner.ry >= outer.ry {
            return Err(ConfigError::InnerNotInsideOuter {
                inner_rx: inner.rx,
                inner_ry: inner.ry,
                outer_rx: outer.rx,
                outer_ry: outer.ry,
            });
        }

        let midline = Ellipse {
            cx: outer.cx,
            cy: outer.cy,
            rx: (outer.rx + inner.rx) / 2.0,
            ry: (outer.ry + inner.ry) / 2.0,
        };

        // default start/finish line: a thin strip on the horizontal center of the track that
        // reaches from the infield down across the straight at the race start
        let start_line = track_pars.start_line.unwrap_or_else(|| {
            Rect::new(
                track_pars.outer.center().x - 5.0,
                track_pars.inner.top(),
                10.0,
                track_pars.outer.bottom() - track_pars.inner.top(),
            )
        });

        let race_start = Point::new(
            outer.cx,
            track_pars.outer.bottom() - track_pars.anchor_offset,
        );

        Ok(Track {
            outer_rect: track_pars.outer,
            inner_rect: track_pars.inner,
            start_line,
            race_start,
            outer,
            inner,
            midline,
        })
    }

    pub fn outer_ellipse(&self) -> &Ellipse {
        &self.outer
    }

    pub fn inner_ellipse(&self) -> &Ellipse {
        &self.inner
    }

    pub fn midline(&self) -> &Ellipse {
        &self.midline
    }

    /// generate_waypoints samples `count` points on the midline ellipse in racing direction
    /// (decreasing parametric angle) and rotates the list so that the point nearest the race start
    /// anchor is at index 0. Ties go to the earlier sample.
    pub fn generate_waypoints(&self, count: usize) -> Result<Vec<Point>, ConfigError> {
        if count < 2 {
            return Err(ConfigError::WaypointCount(count));
        }

        let mut waypoints: Vec<Point> = (0..count)
            .map(|i| {
                let theta = 2.0 * PI * (1.0 - i as f64 / count as f64);
                self.midline.point_at(theta)
            })
            .collect();

        let dists: Vec<f64> = waypoints
            .iter()
            .map(|wp| wp.dist_sq(&self.race_start))
            .collect();
        let idx_start = argmin(&dists).unwrap_or(0);

        waypoints.rotate_left(idx_start);
        Ok(waypoints)
    }

    /// is_on_track returns true if the point lies inside (or on) the outer ellipse and strictly
    /// outside the inner ellipse.
    pub fn is_on_track(&self, p: &Point) -> bool {
        self.outer.contains(p) && !self.inner.contains(p)
    }
}

fn check_rect(name: &'static str, rect: &Rect) -> Result<(), ConfigError> {
    check_finite(name, rect.x)?;
    check_finite(name, rect.y)?;

    if !rect.is_finite() || rect.w <= 0.0 || rect.h <= 0.0 {
        return Err(ConfigError::DegenerateRect {
            name,
            w: rect.w,
            h: rect.h,
        });
    }
    Ok(())
}
