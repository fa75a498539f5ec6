use serde::{Deserialize, Serialize};

/// Point in screen coordinates (x to the right, y downwards).
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    pub fn dist_sq(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn dist(&self, other: &Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
/// * `x` - Left edge
/// * `y` - Top edge
/// * `w` - Width
/// * `h` - Height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect { x, y, w, h }
    }

    /// from_center creates a rectangle of the given size centered on `center`.
    pub fn from_center(center: Point, w: f64, h: f64) -> Rect {
        Rect {
            x: center.x - w / 2.0,
            y: center.y - h / 2.0,
            w,
            h,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// The method returns true if both rectangles share a region of non-zero area. Rectangles that
    /// only touch along an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

/// Axis-aligned ellipse given by its center and radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
}

impl Ellipse {
    /// inscribed returns the ellipse that touches all four edges of `rect`.
    pub fn inscribed(rect: &Rect) -> Ellipse {
        let center = rect.center();
        Ellipse {
            cx: center.x,
            cy: center.y,
            rx: rect.w / 2.0,
            ry: rect.h / 2.0,
        }
    }

    /// norm_dist returns ((px - cx) / rx)^2 + ((py - cy) / ry)^2, which is <= 1 for points inside
    /// or on the ellipse. The radii must be non-zero.
    pub fn norm_dist(&self, p: &Point) -> f64 {
        let nx = (p.x - self.cx) / self.rx;
        let ny = (p.y - self.cy) / self.ry;
        nx * nx + ny * ny
    }

    pub fn contains(&self, p: &Point) -> bool {
        self.norm_dist(p) <= 1.0
    }

    /// point_at returns the point at parametric angle `theta` (radians).
    pub fn point_at(&self, theta: f64) -> Point {
        Point::new(
            self.cx + self.rx * theta.cos(),
            self.cy + self.ry * theta.sin(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(9.5, 9.5, 10.0, 10.0);

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn ellipse_boundary_is_inside() {
        let e = Ellipse::inscribed(&Rect::new(100.0, 50.0, 600.0, 500.0));

        assert!(e.contains(&Point::new(700.0, 300.0)));
        assert!(e.contains(&Point::new(400.0, 50.0)));
        assert!(!e.contains(&Point::new(700.5, 300.0)));
    }
}
